use crate::datastore::collections::PROFILES;
use crate::datastore::{read_typed, RowQuery, RowSource};
use actix_web::HttpRequest;
use async_trait::async_trait;
use redis::AsyncCommands;
use shared::{Profile, Result, SharedError};
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "session_id";

/// Proof that the caller passed the admin check.
///
/// Use cases take this as an argument instead of consulting ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    email: String,
}

impl AdminContext {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Decides whether a session belongs to an administrator
#[async_trait]
pub trait AdminGate: Send + Sync {
    async fn authorize(&self, session_id: &str) -> Result<AdminContext>;
}

/// Maps session ids to the signed-in email
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_session(&self, session_id: &str) -> Result<Option<String>>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    pub client: redis::Client,
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get_session(&self, session_id: &str) -> Result<Option<String>> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| SharedError::query("Session store unavailable", e))?;

        conn.get::<_, Option<String>>(session_id)
            .await
            .map_err(|e| SharedError::query("Failed to read session", e))
    }
}

/// Session lookup followed by the `profiles.is_admin` flag.
pub struct SessionAdminGate<S: SessionStore> {
    sessions: S,
    source: Arc<dyn RowSource>,
}

impl<S: SessionStore> SessionAdminGate<S> {
    pub fn new(sessions: S, source: Arc<dyn RowSource>) -> Self {
        Self { sessions, source }
    }
}

#[async_trait]
impl<S: SessionStore> AdminGate for SessionAdminGate<S> {
    async fn authorize(&self, session_id: &str) -> Result<AdminContext> {
        let email = match self.sessions.get_session(session_id).await? {
            Some(email) => email,
            None => {
                log::warn!("Admin check: no session found");
                return Err(SharedError::Unauthorized("Invalid session".to_string()));
            }
        };

        let query = RowQuery::new(PROFILES)
            .select(&["email", "is_admin"])
            .filter_eq("email", email.as_str())
            .limit(1);
        let profiles: Vec<Profile> = read_typed(self.source.as_ref(), &query).await?;

        match profiles.first() {
            Some(profile) if profile.is_admin() => {
                log::debug!("Admin check: {} is admin, allowing access", email);
                Ok(AdminContext::new(&email))
            }
            Some(_) => {
                log::warn!("Admin check: {} is not admin, denying access", email);
                Err(SharedError::Forbidden(
                    "Administrative privileges required".to_string(),
                ))
            }
            None => {
                log::warn!("Admin check: no profile for {}", email);
                Err(SharedError::Forbidden(
                    "Administrative privileges required".to_string(),
                ))
            }
        }
    }
}

/// Session id from the `session_id` cookie, falling back to a bearer token.
pub fn session_id_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolves the request's session through `gate`.
pub async fn require_admin(req: &HttpRequest, gate: &dyn AdminGate) -> Result<AdminContext> {
    let session_id = session_id_from_request(req).ok_or_else(|| {
        log::warn!("Admin check: no session id on {}", req.path());
        SharedError::Unauthorized("Authentication required".to_string())
    })?;
    gate.authorize(&session_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryRowSource, StaticAdminGate};
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn profiles() -> MemoryRowSource {
        MemoryRowSource::new().with_rows(
            PROFILES,
            vec![
                json!({"email": "admin@example.com", "is_admin": true}),
                json!({"email": "writer@example.com", "is_admin": false}),
                json!({"email": "legacy@example.com", "is_admin": null}),
            ],
        )
    }

    fn gate_for(session: &'static str, email: Option<&'static str>) -> SessionAdminGate<MockSessionStore> {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_get_session()
            .with(eq(session))
            .times(1)
            .returning(move |_| Ok(email.map(str::to_string)));
        SessionAdminGate::new(sessions, Arc::new(profiles()))
    }

    #[tokio::test]
    async fn test_admin_session_is_authorized() {
        let gate = gate_for("s-admin", Some("admin@example.com"));
        let context = gate.authorize("s-admin").await.unwrap();
        assert_eq!(context.email(), "admin@example.com");
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let gate = gate_for("s-writer", Some("writer@example.com"));
        let err = gate.authorize("s-writer").await.unwrap_err();
        assert!(matches!(err, SharedError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_null_flag_and_missing_profile_are_forbidden() {
        let gate = gate_for("s-legacy", Some("legacy@example.com"));
        assert!(matches!(
            gate.authorize("s-legacy").await,
            Err(SharedError::Forbidden(_))
        ));

        let gate = gate_for("s-ghost", Some("ghost@example.com"));
        assert!(matches!(
            gate.authorize("s-ghost").await,
            Err(SharedError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_session_is_unauthorized() {
        let gate = gate_for("s-none", None);
        let err = gate.authorize("s-none").await.unwrap_err();
        assert!(matches!(err, SharedError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_session_store_failure_is_a_query_error() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_get_session()
            .returning(|_| Err(SharedError::Query("redis down".to_string())));
        let gate = SessionAdminGate::new(sessions, Arc::new(profiles()));

        let err = gate.authorize("anything").await.unwrap_err();
        assert_eq!(err, SharedError::Query("redis down".to_string()));
    }

    #[test]
    fn test_session_id_from_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "abc"))
            .insert_header(("Authorization", "Bearer other"))
            .to_http_request();
        assert_eq!(session_id_from_request(&req).as_deref(), Some("abc"));
    }

    #[test]
    fn test_session_id_from_bearer_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer  xyz "))
            .to_http_request();
        assert_eq!(session_id_from_request(&req).as_deref(), Some("xyz"));
    }

    #[tokio::test]
    async fn test_require_admin_without_session_is_unauthorized() {
        let gate = StaticAdminGate::new().with_session("s1", "admin@example.com", true);

        let anonymous = TestRequest::default().to_http_request();
        assert!(matches!(
            require_admin(&anonymous, &gate).await,
            Err(SharedError::Unauthorized(_))
        ));

        let signed_in = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "s1"))
            .to_http_request();
        let context = require_admin(&signed_in, &gate).await.unwrap();
        assert_eq!(context.email(), "admin@example.com");
    }

    #[test]
    fn test_session_id_missing() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(session_id_from_request(&req), None);
    }
}
