use super::record::{deserialize_id, deserialize_optional_id};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Title of the event a registration belongs to, as embedded by the
/// `rsvps` -> `events` join.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventTitle {
    #[serde(default)]
    pub title: Option<String>,
}

/// RSVP row joined with its event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub event_id: Option<String>,
    #[serde(default, rename = "events")]
    pub event: Option<EventTitle>,
}

impl Registration {
    pub fn event_title(&self) -> Option<&str> {
        self.event.as_ref().and_then(|e| e.title.as_deref())
    }
}
