use crate::datastore::collections::{BLOG_POSTS, COMMENTS, EVENTS};
use crate::datastore::{read_typed, Direction, RowQuery, RowSource};
use shared::models::comment::{Comment, APPROVED};
use shared::models::post::{Post, PUBLISHED};
use shared::{Event, Result, StatusRow};
use std::sync::Arc;

const POST_FIELDS: [&str; 5] = ["id", "title", "category", "status", "created_at"];

/// Reads behind the analytics dashboard
#[derive(Clone)]
pub struct AnalyticsRepository {
    source: Arc<dyn RowSource>,
}

impl AnalyticsRepository {
    pub fn new(source: Arc<dyn RowSource>) -> Self {
        Self { source }
    }

    /// Status of every blog post
    pub async fn get_post_statuses(&self) -> Result<Vec<StatusRow>> {
        let query = RowQuery::new(BLOG_POSTS).select(&["status"]);
        read_typed(self.source.as_ref(), &query).await
    }

    /// Status of every comment
    pub async fn get_comment_statuses(&self) -> Result<Vec<StatusRow>> {
        let query = RowQuery::new(COMMENTS).select(&["status"]);
        read_typed(self.source.as_ref(), &query).await
    }

    /// Registration count of every event
    pub async fn get_event_registrations(&self) -> Result<Vec<Event>> {
        let query = RowQuery::new(EVENTS).select(&["registered"]);
        read_typed(self.source.as_ref(), &query).await
    }

    /// The newest published posts, at most `limit`
    pub async fn get_recent_published_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let query = RowQuery::new(BLOG_POSTS)
            .select(&POST_FIELDS)
            .filter_eq("status", PUBLISHED)
            .order_by("created_at", Direction::Descending)
            .limit(limit);
        read_typed(self.source.as_ref(), &query).await
    }

    /// Every published post, for the category breakdown
    pub async fn get_published_posts(&self) -> Result<Vec<Post>> {
        let query = RowQuery::new(BLOG_POSTS)
            .select(&POST_FIELDS)
            .filter_eq("status", PUBLISHED);
        read_typed(self.source.as_ref(), &query).await
    }

    /// Number of approved comments on one post
    pub async fn count_approved_comments(&self, post_id: &str) -> Result<u64> {
        let query = RowQuery::new(COMMENTS)
            .select(&["id", "status", "blog_post_id"])
            .filter_eq("blog_post_id", post_id)
            .filter_eq("status", APPROVED);
        let comments: Vec<Comment> = read_typed(self.source.as_ref(), &query).await?;
        Ok(comments.len() as u64)
    }
}
