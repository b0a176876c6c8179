use crate::auth::{require_admin, AdminGate};
use crate::error::{ApiError, REGISTRATIONS_UNAVAILABLE};
use crate::lifetime::ViewLifetime;
use crate::registrations::usecase::RegistrationsUseCase;
use actix_web::{web, HttpRequest, HttpResponse};
use shared::{RegistrationFilter, SharedError};
use std::sync::Arc;

pub struct RegistrationsController {
    usecase: RegistrationsUseCase,
    gate: Arc<dyn AdminGate>,
}

impl RegistrationsController {
    pub fn new(usecase: RegistrationsUseCase, gate: Arc<dyn AdminGate>) -> Self {
        Self { usecase, gate }
    }

    /// Filtered registrations table. A failed fetch answers 502 with a
    /// notification for the admin.
    pub async fn list(
        &self,
        req: HttpRequest,
        query: web::Query<RegistrationFilter>,
    ) -> Result<HttpResponse, ApiError> {
        let admin = require_admin(&req, self.gate.as_ref()).await?;
        let filter = normalize(query.into_inner());

        // Torn down by drop with this future on client disconnect.
        let lifetime = ViewLifetime::new();
        match self.usecase.list(&admin, &filter, &lifetime.token()).await {
            Ok(page) => Ok(HttpResponse::Ok().json(page)),
            Err(SharedError::Query(message)) => {
                log::error!("Failed to load registrations: {}", message);
                Err(ApiError::upstream_error(&message).with_notification(REGISTRATIONS_UNAVAILABLE))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Empty query parameters mean "no filter" (`?event_id=` from an "All events" choice).
fn normalize(filter: RegistrationFilter) -> RegistrationFilter {
    RegistrationFilter {
        search: filter.search.filter(|s| !s.trim().is_empty()),
        event_id: filter.event_id.filter(|id| !id.is_empty()),
    }
}

pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    usecase: RegistrationsUseCase,
    gate: Arc<dyn AdminGate>,
) {
    let controller = RegistrationsController::new(usecase, gate);

    log::debug!("Registering registrations routes:");
    log::debug!("  GET /api/admin/registrations?search=&event_id= (admin)");

    cfg.service(
        web::scope("/api/admin/registrations")
            .app_data(web::Data::new(controller))
            .route(
                "",
                web::get().to(
                    |req: HttpRequest,
                     query: web::Query<RegistrationFilter>,
                     controller: web::Data<RegistrationsController>| async move {
                        controller.list(req, query).await
                    },
                ),
            ),
    );
}
