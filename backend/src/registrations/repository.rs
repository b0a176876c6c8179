use crate::datastore::collections::{RSVPS, RSVP_EVENT_TITLE};
use crate::datastore::{read_typed, Direction, RowQuery, RowSource};
use shared::{Registration, Result};
use std::sync::Arc;

const REGISTRATION_FIELDS: [&str; 7] = [
    "id",
    "name",
    "email",
    "phone",
    "created_at",
    "event_id",
    RSVP_EVENT_TITLE,
];

#[derive(Clone)]
pub struct RegistrationsRepository {
    source: Arc<dyn RowSource>,
}

impl RegistrationsRepository {
    pub fn new(source: Arc<dyn RowSource>) -> Self {
        Self { source }
    }

    /// Every RSVP with its event title, newest first
    pub async fn list_registrations(&self) -> Result<Vec<Registration>> {
        let query = RowQuery::new(RSVPS)
            .select(&REGISTRATION_FIELDS)
            .order_by("created_at", Direction::Descending);
        read_typed(self.source.as_ref(), &query).await
    }
}
