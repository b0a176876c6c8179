use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Blog post counters partitioned by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogStatsDto {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
    /// Posts whose status matched neither bucket; counted in `total` only.
    pub unrecognized: u64,
    /// Rounded share of published posts, 0..=100.
    pub publish_rate: u32,
}

/// Comment counters partitioned by moderation status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStatsDto {
    pub total: u64,
    pub approved: u64,
    pub pending: u64,
    pub unrecognized: u64,
    pub approval_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStatsDto {
    pub total_events: u64,
    pub total_registrations: u64,
}

/// One of the most recently published posts with its approved comment count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPostDto {
    pub post_id: String,
    pub title: String,
    pub comment_count: u64,
}

/// Share of published posts in a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShareDto {
    /// Exact category of the group; `None` groups the posts without one.
    pub category: Option<String>,
    pub count: u64,
    pub percentage: u32,
}

/// Summary sections. The names are also used in `AnalyticsSummaryDto::degraded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySection {
    Blog,
    Comments,
    Events,
    TopPosts,
    Categories,
}

impl SummarySection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarySection::Blog => "blog",
            SummarySection::Comments => "comments",
            SummarySection::Events => "events",
            SummarySection::TopPosts => "top_posts",
            SummarySection::Categories => "categories",
        }
    }
}

/// Everything the analytics dashboard shows, computed in one pass.
///
/// A section whose fetch failed carries its zero value and is listed in
/// `degraded`; the response is still a success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummaryDto {
    pub blog: BlogStatsDto,
    pub comments: CommentStatsDto,
    pub events: EventStatsDto,
    pub top_posts: Vec<TopPostDto>,
    pub categories: Vec<CategoryShareDto>,
    pub degraded: Vec<SummarySection>,
    pub generated_at: DateTime<FixedOffset>,
}

impl AnalyticsSummaryDto {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
