use super::record::{deserialize_id, deserialize_optional_id};
use serde::{Deserialize, Serialize};

pub const APPROVED: &str = "approved";
pub const PENDING: &str = "pending";

/// Comment statuses the moderation counters recognize, in display order.
pub const COMMENT_STATUSES: [&str; 2] = [APPROVED, PENDING];

/// Comment as read from the `comments` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub blog_post_id: Option<String>,
}
