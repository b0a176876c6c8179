use super::engine::{
    group_by_category_with_percentage, partition_by_status, percentage, sum_field,
    top_engaged_posts,
};
use super::repository::AnalyticsRepository;
use crate::auth::AdminContext;
use crate::lifetime::TeardownToken;
use crate::metrics;
use chrono::Utc;
use shared::dto::analytics::*;
use shared::models::comment::{APPROVED, COMMENT_STATUSES, PENDING};
use shared::models::post::{DRAFT, POST_STATUSES, PUBLISHED};
use shared::{Event, Result, StatusRow};

pub const DEFAULT_TOP_POSTS_LIMIT: usize = 5;

/// Use case behind the analytics dashboard
#[derive(Clone)]
pub struct AnalyticsUseCase {
    repo: AnalyticsRepository,
    top_posts_limit: usize,
}

impl AnalyticsUseCase {
    pub fn new(repo: AnalyticsRepository) -> Self {
        Self::with_top_posts_limit(repo, DEFAULT_TOP_POSTS_LIMIT)
    }

    pub fn with_top_posts_limit(repo: AnalyticsRepository, top_posts_limit: usize) -> Self {
        Self {
            repo,
            top_posts_limit,
        }
    }

    pub fn top_posts_limit(&self) -> usize {
        self.top_posts_limit
    }

    /// Computes every dashboard section in one pass.
    ///
    /// The sections are fetched concurrently. A section that fails is logged,
    /// reported with its zero value and listed in `degraded`; it never fails
    /// the whole summary. Only teardown of the view does, with `Cancelled`.
    pub async fn get_summary(
        &self,
        admin: &AdminContext,
        token: &TeardownToken,
    ) -> Result<AnalyticsSummaryDto> {
        log::debug!("Building analytics summary for {}", admin.email());

        let (blog, comments, events, top_posts, categories) = token
            .run(async {
                tokio::join!(
                    self.blog_stats(),
                    self.comment_stats(),
                    self.event_stats(),
                    self.top_posts(),
                    self.category_shares(),
                )
            })
            .await?;

        let mut degraded = Vec::new();
        let blog = settle(SummarySection::Blog, blog, &mut degraded);
        let comments = settle(SummarySection::Comments, comments, &mut degraded);
        let events = settle(SummarySection::Events, events, &mut degraded);
        let top_posts = settle(SummarySection::TopPosts, top_posts, &mut degraded);
        let categories = settle(SummarySection::Categories, categories, &mut degraded);

        if degraded.is_empty() {
            log::info!("Analytics summary ready");
        } else {
            log::warn!(
                "Analytics summary ready with {} degraded section(s)",
                degraded.len()
            );
        }

        Ok(AnalyticsSummaryDto {
            blog,
            comments,
            events,
            top_posts,
            categories,
            degraded,
            generated_at: Utc::now().into(),
        })
    }

    async fn blog_stats(&self) -> Result<BlogStatsDto> {
        let rows = self.repo.get_post_statuses().await?;
        let partition = partition_by_status(&rows, StatusRow::status, &POST_STATUSES);
        let published = partition.count(PUBLISHED);

        Ok(BlogStatsDto {
            total: partition.total,
            published,
            draft: partition.count(DRAFT),
            unrecognized: partition.unrecognized(),
            publish_rate: percentage(published, partition.total),
        })
    }

    async fn comment_stats(&self) -> Result<CommentStatsDto> {
        let rows = self.repo.get_comment_statuses().await?;
        let partition = partition_by_status(&rows, StatusRow::status, &COMMENT_STATUSES);
        let approved = partition.count(APPROVED);

        Ok(CommentStatsDto {
            total: partition.total,
            approved,
            pending: partition.count(PENDING),
            unrecognized: partition.unrecognized(),
            approval_rate: percentage(approved, partition.total),
        })
    }

    async fn event_stats(&self) -> Result<EventStatsDto> {
        let events = self.repo.get_event_registrations().await?;
        Ok(EventStatsDto {
            total_events: events.len() as u64,
            total_registrations: sum_field(&events, Event::registered),
        })
    }

    async fn top_posts(&self) -> Result<Vec<TopPostDto>> {
        let posts = self
            .repo
            .get_recent_published_posts(self.top_posts_limit)
            .await?;
        let repo = &self.repo;

        Ok(top_engaged_posts(&posts, self.top_posts_limit, |post_id: String| async move {
            repo.count_approved_comments(&post_id).await
        })
        .await)
    }

    async fn category_shares(&self) -> Result<Vec<CategoryShareDto>> {
        let posts = self.repo.get_published_posts().await?;
        Ok(group_by_category_with_percentage(&posts))
    }
}

/// Unwraps a section result, falling back to its zero value on failure.
fn settle<T: Default>(
    section: SummarySection,
    result: Result<T>,
    degraded: &mut Vec<SummarySection>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!(
                "Analytics section '{}' unavailable, showing zero values: {}",
                section.as_str(),
                e
            );
            metrics::record_degraded_section(section.as_str());
            degraded.push(section);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::collections::{BLOG_POSTS, COMMENTS, EVENTS};
    use crate::lifetime::ViewLifetime;
    use crate::test_support::MemoryRowSource;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared::SharedError;
    use std::sync::Arc;
    use std::time::Duration;

    fn seeded() -> MemoryRowSource {
        MemoryRowSource::new()
            .with_rows(
                BLOG_POSTS,
                vec![
                    json!({"id": 1, "title": "Hello", "category": "A", "status": "published", "created_at": "2024-01-01T00:00:00Z"}),
                    json!({"id": 2, "title": "World", "category": "A", "status": "published", "created_at": "2024-01-03T00:00:00Z"}),
                    json!({"id": 3, "title": null, "category": "B", "status": "published", "created_at": "2024-01-02T00:00:00Z"}),
                    json!({"id": 4, "title": "Later", "category": "A", "status": "draft", "created_at": "2024-01-05T00:00:00Z"}),
                    json!({"id": 5, "title": "Maybe", "category": null, "status": "draft", "created_at": "2024-01-04T00:00:00Z"}),
                ],
            )
            .with_rows(
                COMMENTS,
                vec![
                    json!({"id": 1, "status": "approved", "blog_post_id": 2}),
                    json!({"id": 2, "status": "approved", "blog_post_id": 2}),
                    json!({"id": 3, "status": "pending", "blog_post_id": 2}),
                    json!({"id": 4, "status": "approved", "blog_post_id": 1}),
                    json!({"id": 5, "status": "spam", "blog_post_id": 3}),
                ],
            )
            .with_rows(
                EVENTS,
                vec![
                    json!({"registered": 10}),
                    json!({"registered": 5}),
                    json!({"registered": 0}),
                ],
            )
    }

    fn usecase(source: MemoryRowSource) -> AnalyticsUseCase {
        AnalyticsUseCase::new(AnalyticsRepository::new(Arc::new(source)))
    }

    fn admin() -> AdminContext {
        AdminContext::new("admin@example.com")
    }

    #[test_log::test(tokio::test)]
    async fn test_summary_with_all_sections() {
        let lifetime = ViewLifetime::new();
        let summary = usecase(seeded())
            .get_summary(&admin(), &lifetime.token())
            .await
            .unwrap();

        assert_eq!(
            summary.blog,
            BlogStatsDto {
                total: 5,
                published: 3,
                draft: 2,
                unrecognized: 0,
                publish_rate: 60
            }
        );
        assert_eq!(
            summary.comments,
            CommentStatsDto {
                total: 5,
                approved: 3,
                pending: 1,
                unrecognized: 1,
                approval_rate: 60
            }
        );
        assert_eq!(
            summary.events,
            EventStatsDto {
                total_events: 3,
                total_registrations: 15
            }
        );

        let top: Vec<(&str, &str, u64)> = summary
            .top_posts
            .iter()
            .map(|t| (t.post_id.as_str(), t.title.as_str(), t.comment_count))
            .collect();
        assert_eq!(
            top,
            vec![("2", "World", 2), ("3", "Untitled", 0), ("1", "Hello", 1)]
        );

        let categories: Vec<(Option<&str>, u64, u32)> = summary
            .categories
            .iter()
            .map(|c| (c.category.as_deref(), c.count, c.percentage))
            .collect();
        assert_eq!(categories, vec![(Some("A"), 2, 67), (Some("B"), 1, 33)]);

        assert!(summary.degraded.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_event_section_degrades_alone() {
        let lifetime = ViewLifetime::new();
        let summary = usecase(seeded().failing(EVENTS))
            .get_summary(&admin(), &lifetime.token())
            .await
            .unwrap();

        assert_eq!(summary.events, EventStatsDto::default());
        assert_eq!(summary.degraded, vec![SummarySection::Events]);
        assert_eq!(summary.blog.published, 3);
        assert_eq!(summary.blog.draft, 2);
        assert_eq!(summary.comments.approved, 3);
        assert_eq!(summary.top_posts.len(), 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_every_section_failing_still_returns_summary() {
        let source = seeded().failing(BLOG_POSTS).failing(COMMENTS).failing(EVENTS);
        let lifetime = ViewLifetime::new();
        let summary = usecase(source)
            .get_summary(&admin(), &lifetime.token())
            .await
            .unwrap();

        assert_eq!(
            summary.degraded,
            vec![
                SummarySection::Blog,
                SummarySection::Comments,
                SummarySection::Events,
                SummarySection::TopPosts,
                SummarySection::Categories,
            ]
        );
        assert_eq!(summary.blog, BlogStatsDto::default());
        assert!(summary.top_posts.is_empty());
        assert!(summary.categories.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_comment_lookup_failure_keeps_top_posts() {
        // Stats and lookups share the comments collection, so both fail;
        // only the comment stats section is degraded.
        let summary = usecase(seeded().failing(COMMENTS))
            .get_summary(&admin(), &ViewLifetime::new().token())
            .await
            .unwrap();

        assert_eq!(summary.degraded, vec![SummarySection::Comments]);
        let counts: Vec<u64> = summary.top_posts.iter().map(|t| t.comment_count).collect();
        assert_eq!(counts, vec![0, 0, 0]);
    }

    #[test_log::test(tokio::test)]
    async fn test_top_posts_limit_is_applied() {
        let repo = AnalyticsRepository::new(Arc::new(seeded()));
        let summary = AnalyticsUseCase::with_top_posts_limit(repo, 1)
            .get_summary(&admin(), &ViewLifetime::new().token())
            .await
            .unwrap();

        assert_eq!(summary.top_posts.len(), 1);
        assert_eq!(summary.top_posts[0].post_id, "2");
    }

    #[test_log::test(tokio::test)]
    async fn test_teardown_cancels_summary() {
        let source = seeded().with_delay(EVENTS, Duration::from_secs(5));
        let lifetime = ViewLifetime::new();
        let token = lifetime.token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            lifetime.teardown();
        });

        let result = usecase(source).get_summary(&admin(), &token).await;
        assert_eq!(result.unwrap_err(), SharedError::Cancelled);
    }
}
