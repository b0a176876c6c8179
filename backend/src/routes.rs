//! HTTP surface of the admin service.

use crate::analytics::{AnalyticsRepository, AnalyticsUseCase};
use crate::auth::AdminGate;
use crate::datastore::RowSource;
use crate::health::HealthProbes;
use crate::registrations::{RegistrationsRepository, RegistrationsUseCase};
use crate::{analytics, health, metrics, registrations};
use actix_web::web;
use std::sync::Arc;

/// Everything the routes need, shared by every worker.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn RowSource>,
    pub gate: Arc<dyn AdminGate>,
    pub redis: Option<redis::Client>,
    pub top_posts_limit: usize,
}

pub fn configure(cfg: &mut web::ServiceConfig, services: &Services) {
    let analytics_usecase = AnalyticsUseCase::with_top_posts_limit(
        AnalyticsRepository::new(services.source.clone()),
        services.top_posts_limit,
    );
    let registrations_usecase =
        RegistrationsUseCase::new(RegistrationsRepository::new(services.source.clone()));

    health::configure_routes(
        cfg,
        HealthProbes {
            source: services.source.clone(),
            redis: services.redis.clone(),
        },
    );
    cfg.route("/metrics", web::get().to(metrics::metrics_handler));
    analytics::controller::configure_routes(cfg, analytics_usecase, services.gate.clone());
    registrations::controller::configure_routes(cfg, registrations_usecase, services.gate.clone());
}
