use actix_web::{web, App, HttpServer};
use anyhow::Context;
use backend::auth::{RedisSessionStore, SessionAdminGate};
use backend::config::Config;
use backend::datastore::{RestRowSource, RowSource};
use backend::metrics::Metrics;
use backend::routes::{self, Services};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().context("Failed to load configuration")?;

    Metrics::init().context("Failed to register metrics")?;

    let source: Arc<dyn RowSource> = Arc::new(
        RestRowSource::new(&config.datastore).context("Failed to create data store client")?,
    );
    log::info!("Data store client ready for {}", config.datastore.url);

    let redis_client =
        redis::Client::open(config.redis.url.clone()).context("Failed to create Redis client")?;
    let gate = Arc::new(SessionAdminGate::new(
        RedisSessionStore {
            client: redis_client.clone(),
        },
        source.clone(),
    ));

    let services = Services {
        source,
        gate,
        redis: Some(redis_client),
        top_posts_limit: config.dashboard.top_posts_limit,
    };

    log::info!("Starting server on {}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        App::new()
            .wrap(backend::middleware::Logger)
            .wrap(backend::middleware::cors_middleware())
            .app_data(web::JsonConfig::default().limit(64 * 1024))
            .configure(|cfg| routes::configure(cfg, &services))
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))
    .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?
    .run()
    .await
    .context("Server error")
}
