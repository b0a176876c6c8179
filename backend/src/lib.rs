pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod lifetime;
pub mod metrics;
pub mod middleware;
pub mod routes;

pub mod datastore {
    pub mod collections;
    pub mod query;
    pub mod rest;

    pub use query::*;
    pub use rest::RestRowSource;
}

pub mod analytics {
    pub mod controller;
    pub mod engine;
    pub mod repository;
    pub mod usecase;

    pub use controller::AnalyticsController;
    pub use repository::AnalyticsRepository;
    pub use usecase::AnalyticsUseCase;
}

pub mod registrations {
    pub mod controller;
    pub mod repository;
    pub mod usecase;

    pub use controller::RegistrationsController;
    pub use repository::RegistrationsRepository;
    pub use usecase::RegistrationsUseCase;
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
