use dotenv::dotenv;
use log::{info, warn};
use serde::Deserialize;
use shared::{Result, SharedError};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub datastore: DataStoreConfig,
    pub redis: RedisConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

/// Hosted row store (PostgREST dialect)
#[derive(Debug, Clone, Deserialize)]
pub struct DataStoreConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Number of recent published posts in the engagement table.
    pub top_posts_limit: usize,
}

const DEFAULT_BACKEND_URL: &str = "http://0.0.0.0:50002";
const DEFAULT_DATASTORE_URL: &str = "http://localhost:54321";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_TOP_POSTS: usize = 5;

impl Config {
    fn parse_backend_url(url: &str) -> (String, u16) {
        // BACKEND_URL like "http://localhost:50002"
        if let Ok(parsed_url) = url::Url::parse(url) {
            let host = parsed_url.host_str().unwrap_or("127.0.0.1").to_string();
            let port = parsed_url.port().unwrap_or(50002);
            (host, port)
        } else {
            warn!("BACKEND_URL '{}' is not a valid URL, using defaults", url);
            ("127.0.0.1".to_string(), 50002)
        }
    }

    fn load_env_files() {
        // ENV_FILE_PATH replaces every other .env file
        if let Ok(env_file_path) = env::var("ENV_FILE_PATH") {
            if !env_file_path.is_empty() {
                info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
                dotenv::from_filename(&env_file_path).ok();
                return;
            }
        }

        dotenv().ok();
        let environment_hint = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);
        let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
        if env_file != ".env.development" {
            let _ = dotenv::from_filename(&env_file);
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_env_files();

        let environment = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);

        info!("Loading configuration for environment: {:?}", environment);

        let config = Self::from_lookup(environment, |key| env::var(key).ok())?;
        config.log_configuration();
        Ok(config)
    }

    /// Builds and validates a configuration from `lookup`, which maps a
    /// variable name to its value.
    pub fn from_lookup<F>(environment: Environment, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            server: Self::load_server_config(&environment, &lookup)?,
            datastore: Self::load_datastore_config(&environment, &lookup)?,
            redis: Self::load_redis_config(&environment, &lookup),
            dashboard: Self::load_dashboard_config(&lookup)?,
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    fn load_server_config<F>(env: &Environment, lookup: &F) -> Result<ServerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let (host, port) = Self::parse_backend_url(&backend_url);
        let default_workers = match env {
            Environment::Production => 8,
            _ => 1,
        };

        Ok(ServerConfig {
            // SERVER_HOST takes precedence over the BACKEND_URL host
            host: lookup("SERVER_HOST").unwrap_or(host),
            port: parse_or("SERVER_PORT", lookup, port)?,
            workers: parse_or("BACKEND_WORKERS", lookup, default_workers)?,
        })
    }

    fn load_datastore_config<F>(env: &Environment, lookup: &F) -> Result<DataStoreConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (url, api_key) = match env {
            Environment::Production => (
                required("DATASTORE_URL", lookup)?,
                required("DATASTORE_API_KEY", lookup)?,
            ),
            _ => {
                let url = lookup("DATASTORE_URL").unwrap_or_else(|| {
                    warn!("DATASTORE_URL not found in environment, using default");
                    DEFAULT_DATASTORE_URL.to_string()
                });
                (url, lookup("DATASTORE_API_KEY").unwrap_or_default())
            }
        };

        Ok(DataStoreConfig {
            url,
            api_key,
            timeout_seconds: parse_or("DATASTORE_TIMEOUT_SECONDS", lookup, DEFAULT_TIMEOUT_SECONDS)?,
        })
    }

    fn load_redis_config<F>(env: &Environment, lookup: &F) -> RedisConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("REDIS_URL").unwrap_or_else(|| {
            if *env == Environment::Production {
                warn!("REDIS_URL not found in environment, using default");
            }
            DEFAULT_REDIS_URL.to_string()
        });
        RedisConfig { url }
    }

    fn load_dashboard_config<F>(lookup: &F) -> Result<DashboardConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(DashboardConfig {
            top_posts_limit: parse_or("DASHBOARD_TOP_POSTS", lookup, DEFAULT_TOP_POSTS)?,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.environment == Environment::Production && self.redis.url.contains("localhost") {
            return Err(SharedError::Configuration(
                "Production Redis URL cannot contain 'localhost'".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(SharedError::Configuration("Server port cannot be 0".to_string()));
        }
        if self.server.workers == 0 {
            return Err(SharedError::Configuration("BACKEND_WORKERS cannot be 0".to_string()));
        }
        if self.datastore.timeout_seconds == 0 {
            return Err(SharedError::Configuration(
                "DATASTORE_TIMEOUT_SECONDS must be at least 1".to_string(),
            ));
        }
        if self.dashboard.top_posts_limit == 0 {
            return Err(SharedError::Configuration(
                "DASHBOARD_TOP_POSTS must be at least 1".to_string(),
            ));
        }
        if url::Url::parse(&self.datastore.url).is_err() {
            return Err(SharedError::Configuration(format!(
                "DATASTORE_URL '{}' is not a valid URL",
                self.datastore.url
            )));
        }
        Ok(())
    }

    fn log_configuration(&self) {
        info!("Configuration loaded:");
        info!("  Environment: {:?}", self.environment);
        info!("  Server: {}:{}", self.server.host, self.server.port);
        info!("  Workers: {}", self.server.workers);
        info!("  Data store: {}", self.datastore.url);
        info!("  Data store timeout: {}s", self.datastore.timeout_seconds);
        info!("  Redis: {}", self.redis.url);
        info!("  Top posts: {}", self.dashboard.top_posts_limit);
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn required<F>(key: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SharedError::Configuration(format!("{} must be set", key)))
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            SharedError::Configuration(format!("{} has an invalid value: '{}'", key, raw))
        }),
        None => Ok(default),
    }
}
