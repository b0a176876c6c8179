pub mod models {
    pub mod comment;
    pub mod event;
    pub mod post;
    pub mod profile;
    pub mod record;
    pub mod registration;
}

pub mod dto {
    pub mod analytics;
    pub mod registrations;
}

pub mod error;

// Re-export commonly used items
pub use error::{Result, SharedError};

// Re-export models
pub use models::{
    comment::Comment,
    event::Event,
    post::Post,
    profile::Profile,
    record::StatusRow,
    registration::Registration,
};

// Re-export DTOs
pub use dto::{
    analytics::{
        AnalyticsSummaryDto, BlogStatsDto, CategoryShareDto, CommentStatsDto, EventStatsDto,
        SummarySection, TopPostDto,
    },
    registrations::{EventOptionDto, RegistrationDto, RegistrationFilter, RegistrationsPageDto},
};
