use crate::models::registration::Registration;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Row of the registrations table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDto {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub event_id: Option<String>,
    pub event_title: Option<String>,
}

impl From<&Registration> for RegistrationDto {
    fn from(registration: &Registration) -> Self {
        Self {
            id: registration.id.clone(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            created_at: registration.created_at,
            event_id: registration.event_id.clone(),
            event_title: registration.event_title().map(str::to_string),
        }
    }
}

/// Event choice for the table's event filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOptionDto {
    pub event_id: String,
    pub title: Option<String>,
}

/// Filter applied to the fetched registrations before they are returned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RegistrationFilter {
    /// Case-insensitive substring over name, email, phone and event title.
    #[validate(length(max = 200))]
    pub search: Option<String>,
    /// Exact match on the registration's event.
    #[validate(length(min = 1, max = 64))]
    pub event_id: Option<String>,
}

impl RegistrationFilter {
    pub fn matches(&self, registration: &Registration) -> bool {
        if let Some(event_id) = &self.event_id {
            if registration.event_id.as_deref() != Some(event_id.as_str()) {
                return false;
            }
        }

        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };

        [
            registration.name.as_deref(),
            registration.email.as_deref(),
            registration.phone.as_deref(),
            registration.event_title(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Filtered registrations table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationsPageDto {
    /// Rows fetched before filtering.
    pub total: usize,
    /// Rows left after filtering; equals `rows.len()`.
    pub matched: usize,
    pub rows: Vec<RegistrationDto>,
    pub events: Vec<EventOptionDto>,
}
