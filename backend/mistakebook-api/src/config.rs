use serde::Deserialize;
use std::env;

pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    /// Upper bound for `/api` request bodies. Mistakes carry images inline.
    pub max_body_bytes: usize,
    pub default_user: DefaultUserConfig,
    pub metrics_auth: String,
    pub log_json: bool,
}

/// Stand-in for real accounts: the UI always works as this user.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultUserConfig {
    pub enabled: bool,
    pub email: String,
    pub name: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let database_url = settings
            .get_string("database.url")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "sqlite://mistakebook.db".to_string());

        let database_max_connections = settings
            .get_int("database.max_connections")
            .ok()
            .and_then(|value| u32::try_from(value).ok())
            .filter(|value| *value > 0)
            .unwrap_or(5);

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let max_body_bytes = settings
            .get_int("server.max_body_bytes")
            .ok()
            .and_then(|value| usize::try_from(value).ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let default_user = DefaultUserConfig {
            enabled: settings.get_bool("default_user.enabled").unwrap_or(true),
            email: settings
                .get_string("default_user.email")
                .or_else(|_| env::var("DEFAULT_USER_EMAIL"))
                .unwrap_or_else(|_| "default@example.com".to_string()),
            name: settings
                .get_string("default_user.name")
                .unwrap_or_else(|_| "Default User".to_string()),
        };

        let metrics_auth = match settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
        {
            Ok(value) => value,
            Err(_) if env == "prod" => {
                return Err(config::ConfigError::Message(
                    "METRICS_AUTH must be set in production".to_string(),
                ));
            }
            Err(_) => {
                eprintln!("WARNING: Using default METRICS_AUTH (dev mode only!)");
                "admin:changeme".to_string()
            }
        };

        let log_json = settings.get_bool("log.json").unwrap_or(false);

        Ok(Config {
            database_url,
            database_max_connections,
            bind_addr,
            max_body_bytes,
            default_user,
            metrics_auth,
            log_json,
        })
    }

    /// In-memory database, no default user. Used by the integration tests.
    pub fn in_memory() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            bind_addr: "127.0.0.1:0".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            default_user: DefaultUserConfig {
                enabled: false,
                email: "default@example.com".to_string(),
                name: "Default User".to_string(),
            },
            metrics_auth: "admin:changeme".to_string(),
            log_json: false,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}
