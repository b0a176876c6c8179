use serde::{Deserialize, Serialize};

/// Event row as read by the registration counters. Only the `registered`
/// column is used; a negative value does not fit `u64` and is rejected at
/// the read boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub registered: Option<u64>,
}

impl Event {
    pub fn with_registered(registered: u64) -> Self {
        Self {
            registered: Some(registered),
        }
    }

    pub fn registered(&self) -> u64 {
        self.registered.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_registered_counts_as_zero() {
        let event: Event = serde_json::from_str(r#"{"registered":null}"#).unwrap();
        assert_eq!(event.registered(), 0);
    }

    #[test]
    fn test_negative_registered_is_rejected() {
        assert!(serde_json::from_str::<Event>(r#"{"registered":-3}"#).is_err());
    }
}
