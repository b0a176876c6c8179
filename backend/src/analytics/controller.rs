use crate::analytics::usecase::AnalyticsUseCase;
use crate::auth::{require_admin, AdminGate};
use crate::error::ApiError;
use crate::lifetime::ViewLifetime;
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

/// Analytics controller for handling HTTP requests
pub struct AnalyticsController {
    usecase: AnalyticsUseCase,
    gate: Arc<dyn AdminGate>,
}

impl AnalyticsController {
    pub fn new(usecase: AnalyticsUseCase, gate: Arc<dyn AdminGate>) -> Self {
        Self { usecase, gate }
    }

    /// Dashboard summary. Degraded sections still answer 200.
    pub async fn get_summary(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let admin = require_admin(&req, self.gate.as_ref()).await?;

        // Teardown is by drop: actix drops this future when the client
        // disconnects, taking the lifetime and every pending fetch with it.
        let lifetime = ViewLifetime::new();
        let summary = self.usecase.get_summary(&admin, &lifetime.token()).await?;

        if summary.is_degraded() {
            log::warn!(
                "Serving analytics summary with degraded sections: {:?}",
                summary.degraded
            );
        }
        Ok(HttpResponse::Ok().json(summary))
    }
}

pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    usecase: AnalyticsUseCase,
    gate: Arc<dyn AdminGate>,
) {
    let controller = AnalyticsController::new(usecase, gate);

    log::debug!("Registering analytics routes:");
    log::debug!("  GET /api/admin/analytics/summary (admin)");

    cfg.service(
        web::scope("/api/admin/analytics")
            .app_data(web::Data::new(controller))
            .route(
                "/summary",
                web::get().to(
                    |req: HttpRequest, controller: web::Data<AnalyticsController>| async move {
                        controller.get_summary(req).await
                    },
                ),
            ),
    );
}
