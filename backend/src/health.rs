use crate::datastore::collections::PROFILES;
use crate::datastore::{RowQuery, RowSource};
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: &'static str,
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
struct ServiceHealthStatus {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_ms: Option<u64>,
}

impl ServiceHealthStatus {
    fn healthy(elapsed: Duration) -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
            response_time_ms: Some(elapsed.as_millis() as u64),
        }
    }

    fn unhealthy(message: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message),
            response_time_ms: None,
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Dependencies probed by the detailed health check
pub struct HealthProbes {
    pub source: Arc<dyn RowSource>,
    pub redis: Option<redis::Client>,
}

async fn check_datastore(source: &dyn RowSource) -> ServiceHealthStatus {
    let start = Instant::now();
    let probe = RowQuery::new(PROFILES).select(&["email"]).limit(1);

    match timeout(CHECK_TIMEOUT, source.read_rows(&probe)).await {
        Ok(Ok(_)) => ServiceHealthStatus::healthy(start.elapsed()),
        Ok(Err(e)) => ServiceHealthStatus::unhealthy(format!("Data store query failed: {}", e)),
        Err(_) => ServiceHealthStatus::unhealthy("Data store timeout".to_string()),
    }
}

async fn check_redis(redis_client: &redis::Client) -> ServiceHealthStatus {
    let start = Instant::now();

    match timeout(CHECK_TIMEOUT, async {
        let mut conn = redis_client.get_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await
    })
    .await
    {
        Ok(Ok(_)) => ServiceHealthStatus::healthy(start.elapsed()),
        Ok(Err(e)) => ServiceHealthStatus::unhealthy(format!("Redis connection failed: {}", e)),
        Err(_) => ServiceHealthStatus::unhealthy("Redis connection timeout".to_string()),
    }
}

/// Probes the data store and the session store; 503 if either is down.
pub async fn detailed_health_check(probes: web::Data<HealthProbes>) -> impl Responder {
    let datastore = check_datastore(probes.source.as_ref()).await;
    let redis = match &probes.redis {
        Some(client) => check_redis(client).await,
        None => ServiceHealthStatus::unhealthy("Redis not configured".to_string()),
    };

    let healthy = datastore.is_healthy() && redis.is_healthy();
    if !healthy {
        log::warn!("Detailed health check failed: datastore={:?} redis={:?}", datastore, redis);
    }

    let body = serde_json::json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "timestamp": chrono::Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "datastore": datastore,
            "redis": redis,
        }
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, probes: HealthProbes) {
    cfg.app_data(web::Data::new(probes))
        .route("/health", web::get().to(health_check))
        .route("/health/detailed", web::get().to(detailed_health_check));
}
