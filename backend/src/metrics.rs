use actix_web::{HttpResponse, Responder};
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Duration;

/// Global metrics registry
static REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// Global metrics instance (set once at startup)
static METRICS: OnceCell<Metrics> = OnceCell::new();

/// Data store read metrics
pub struct DataStoreMetrics {
    /// Read duration histogram (in seconds)
    pub query_duration: HistogramVec,
    /// Total reads counter
    pub queries_total: IntCounterVec,
}

/// Dashboard rendering metrics
pub struct DashboardMetrics {
    /// Summary sections that fell back to their zero value
    pub degraded_sections_total: IntCounterVec,
}

/// All application metrics
pub struct Metrics {
    pub datastore: DataStoreMetrics,
    pub dashboard: DashboardMetrics,
}

impl Metrics {
    /// Creates all metrics and registers them with `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let query_duration = HistogramVec::new(
            HistogramOpts::new(
                "query_duration_seconds",
                "Data store read duration in seconds",
            )
            .namespace("cms_admin")
            .subsystem("datastore"),
            &["collection"],
        )?;
        registry.register(Box::new(query_duration.clone()))?;

        let queries_total = IntCounterVec::new(
            Opts::new("queries_total", "Total number of data store reads")
                .namespace("cms_admin")
                .subsystem("datastore"),
            &["collection", "outcome"],
        )?;
        registry.register(Box::new(queries_total.clone()))?;

        let degraded_sections_total = IntCounterVec::new(
            Opts::new(
                "degraded_sections_total",
                "Summary sections served as zero values after a failed read",
            )
            .namespace("cms_admin")
            .subsystem("dashboard"),
            &["section"],
        )?;
        registry.register(Box::new(degraded_sections_total.clone()))?;

        Ok(Metrics {
            datastore: DataStoreMetrics {
                query_duration,
                queries_total,
            },
            dashboard: DashboardMetrics {
                degraded_sections_total,
            },
        })
    }

    /// Registers the global metrics instance; later calls are no-ops
    pub fn init() -> Result<(), prometheus::Error> {
        METRICS
            .get_or_try_init(|| Metrics::new(&REGISTRY))
            .map(|_| ())
    }

    /// Get the global metrics instance (if initialized)
    pub fn global() -> Option<&'static Metrics> {
        METRICS.get()
    }

    /// Get the Prometheus registry
    pub fn registry() -> Arc<Registry> {
        REGISTRY.clone()
    }
}

/// Records one data store read. No-op until [`Metrics::init`] ran.
pub fn record_datastore_query(collection: &str, outcome: &str, duration: Duration) {
    if let Some(metrics) = Metrics::global() {
        metrics
            .datastore
            .query_duration
            .with_label_values(&[collection])
            .observe(duration.as_secs_f64());
        metrics
            .datastore
            .queries_total
            .with_label_values(&[collection, outcome])
            .inc();
    }
}

/// Records a summary section that was served degraded.
pub fn record_degraded_section(section: &str) {
    if let Some(metrics) = Metrics::global() {
        metrics
            .dashboard
            .degraded_sections_total
            .with_label_values(&[section])
            .inc();
    }
}

/// Prometheus text exposition of the global registry
pub async fn metrics_handler() -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        log::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_on_fresh_registry() {
        let registry = Registry::new();
        let metrics = Metrics::new(&registry).unwrap();
        metrics
            .datastore
            .queries_total
            .with_label_values(&["events", "ok"])
            .inc();
        metrics
            .dashboard
            .degraded_sections_total
            .with_label_values(&["events"])
            .inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"cms_admin_datastore_queries_total".to_string()));
        assert!(names.contains(&"cms_admin_dashboard_degraded_sections_total".to_string()));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        Metrics::new(&registry).unwrap();
        assert!(Metrics::new(&registry).is_err());
    }

    #[test]
    fn test_init_is_idempotent() {
        Metrics::init().unwrap();
        Metrics::init().unwrap();
        assert!(Metrics::global().is_some());
        record_datastore_query("blog_posts", "ok", Duration::from_millis(3));
    }
}
