use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SharedError {
    /// A read against the data store failed: transport, HTTP status,
    /// permission, or a row that does not fit its record type.
    #[error("Query error: {0}")]
    Query(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The view that issued the request was torn down before it finished.
    #[error("Request cancelled: view was torn down")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Conversion error: {0}")]
    Conversion(String),
}

impl SharedError {
    pub fn query(context: &str, cause: impl std::fmt::Display) -> Self {
        Self::Query(format!("{}: {}", context, cause))
    }
}

impl From<ValidationErrors> for SharedError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonError> for SharedError {
    fn from(error: JsonError) -> Self {
        Self::Conversion(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SharedError>;
