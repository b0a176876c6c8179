use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use shared::SharedError;
use std::fmt;

/// Message shown to the admin when the registrations table cannot load.
pub const REGISTRATIONS_UNAVAILABLE: &str = "Could not load registrations. Please try again.";

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    /// User-facing text for a transient notification, when the view shows one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
}

impl ApiError {
    pub fn new(error: &str, message: &str, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status_code,
            notification: None,
        }
    }

    pub fn with_notification(mut self, notification: &str) -> Self {
        self.notification = Some(notification.to_string());
        self
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new("UNAUTHORIZED", message, 401)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new("FORBIDDEN", message, 403)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("INTERNAL_ERROR", message, 500)
    }

    pub fn upstream_error(message: &str) -> Self {
        Self::new("UPSTREAM_ERROR", message, 502)
    }

    pub fn cancelled() -> Self {
        // 499: client closed request. HTTP handlers tear their views down by
        // drop, so this is only written when a caller cancels its own token.
        Self::new("CANCELLED", "Request cancelled", 499)
    }

    pub fn validation_error(message: &str) -> Self {
        Self::new("VALIDATION_ERROR", message, 400)
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status = match actix_web::http::StatusCode::from_u16(self.status_code) {
            Ok(status) => status,
            Err(_) => {
                log::warn!("Invalid status code {}, defaulting to 500", self.status_code);
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        HttpResponse::build(status).json(self)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl From<SharedError> for ApiError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::Query(message) => Self::upstream_error(&message),
            SharedError::Unauthorized(message) => Self::unauthorized(&message),
            SharedError::Forbidden(message) => Self::forbidden(&message),
            SharedError::Validation(message) => Self::validation_error(&message),
            SharedError::Cancelled => Self::cancelled(),
            SharedError::Configuration(message) | SharedError::Conversion(message) => {
                Self::internal_error(&message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::new("TEST_ERROR", "Test message", 400);
        assert_eq!(error.error, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert_eq!(error.status_code, 400);
        assert_eq!(error.notification, None);
    }

    #[test_case(SharedError::Query("down".into()), "UPSTREAM_ERROR", 502 ; "query")]
    #[test_case(SharedError::Unauthorized("no".into()), "UNAUTHORIZED", 401 ; "unauthorized")]
    #[test_case(SharedError::Forbidden("no".into()), "FORBIDDEN", 403 ; "forbidden")]
    #[test_case(SharedError::Validation("bad".into()), "VALIDATION_ERROR", 400 ; "validation")]
    #[test_case(SharedError::Cancelled, "CANCELLED", 499 ; "cancelled")]
    #[test_case(SharedError::Configuration("x".into()), "INTERNAL_ERROR", 500 ; "configuration")]
    fn test_from_shared_error(err: SharedError, code: &str, status: u16) {
        let api_error = ApiError::from(err);
        assert_eq!(api_error.error, code);
        assert_eq!(api_error.status_code, status);
    }

    #[test]
    fn test_display_format() {
        let error = ApiError::forbidden("Test message");
        assert_eq!(format!("{}", error), "FORBIDDEN: Test message");
    }

    #[test]
    fn test_error_response_status() {
        let error = ApiError::upstream_error("store down").with_notification(REGISTRATIONS_UNAVAILABLE);
        let response = error.error_response();
        assert_eq!(response.status().as_u16(), 502);
    }

    #[test]
    fn test_notification_serialized_only_when_set() {
        let plain = serde_json::to_value(ApiError::forbidden("no")).unwrap();
        assert!(plain.get("notification").is_none());

        let toast = serde_json::to_value(
            ApiError::upstream_error("down").with_notification(REGISTRATIONS_UNAVAILABLE),
        )
        .unwrap();
        assert_eq!(toast["notification"], REGISTRATIONS_UNAVAILABLE);
    }
}
