use super::record::deserialize_id;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const PUBLISHED: &str = "published";
pub const DRAFT: &str = "draft";

/// Post statuses the blog counters recognize, in display order.
pub const POST_STATUSES: [&str; 2] = [PUBLISHED, DRAFT];

/// Label used for posts without a title.
pub const UNTITLED: &str = "Untitled";

/// Blog post as read from the `blog_posts` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl Post {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("")
    }

    /// Exact, case-sensitive match on `published`.
    pub fn is_published(&self) -> bool {
        self.status() == PUBLISHED
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }
}
