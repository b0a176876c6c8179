use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts a row identifier stored either as text (uuid) or as an integer
/// primary key and keeps it as a string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, found {}",
            other
        ))),
    }
}

/// Same as [`deserialize_id`] for nullable foreign keys.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, found {}",
            other
        ))),
    }
}

/// Status-only projection, used by the counters that only need the status
/// column of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusRow {
    #[serde(default)]
    pub status: Option<String>,
}

impl StatusRow {
    pub fn new(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
        }
    }

    /// Raw status value; a null status reads as the empty string and
    /// therefore matches no recognized category.
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("")
    }
}
