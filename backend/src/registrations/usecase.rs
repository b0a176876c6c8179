use super::repository::RegistrationsRepository;
use crate::auth::AdminContext;
use crate::lifetime::TeardownToken;
use shared::dto::registrations::*;
use shared::{Registration, Result};
use std::collections::HashSet;
use validator::Validate;

/// Use case behind the registrations table
#[derive(Clone)]
pub struct RegistrationsUseCase {
    repo: RegistrationsRepository,
}

impl RegistrationsUseCase {
    pub fn new(repo: RegistrationsRepository) -> Self {
        Self { repo }
    }

    /// Fetches every registration and applies `filter` in memory.
    ///
    /// Fetch failures are returned to the caller; this view does not degrade.
    pub async fn list(
        &self,
        admin: &AdminContext,
        filter: &RegistrationFilter,
        token: &TeardownToken,
    ) -> Result<RegistrationsPageDto> {
        filter.validate()?;
        log::debug!("Listing registrations for {}", admin.email());

        let registrations = token.run(self.repo.list_registrations()).await??;

        let rows: Vec<RegistrationDto> = registrations
            .iter()
            .filter(|registration| filter.matches(registration))
            .map(RegistrationDto::from)
            .collect();

        log::info!(
            "Registrations: {} of {} match the filter",
            rows.len(),
            registrations.len()
        );

        Ok(RegistrationsPageDto {
            total: registrations.len(),
            matched: rows.len(),
            events: event_options(&registrations),
            rows,
        })
    }
}

/// Distinct events among `registrations`, in order of first appearance.
pub fn event_options(registrations: &[Registration]) -> Vec<EventOptionDto> {
    let mut seen = HashSet::new();
    registrations
        .iter()
        .filter_map(|registration| {
            let event_id = registration.event_id.as_deref()?;
            seen.insert(event_id).then(|| EventOptionDto {
                event_id: event_id.to_string(),
                title: registration.event_title().map(str::to_string),
            })
        })
        .collect()
}
