//! Layered settings: `config/default.toml`, then `config/{RUN_MODE}.toml`,
//! then `STRATA__*` environment variables (`STRATA__DATABASE__URL`, ...).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Re-read templates from disk on every render.
    #[serde(default)]
    pub dev_templates: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dev_templates: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL. Without one the app serves a seeded in-memory ledger.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_templates")]
    pub templates: String,
    #[serde(default = "default_public")]
    pub public: String,
    #[serde(default = "default_migrations")]
    pub migrations: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            public: default_public(),
            migrations: default_migrations(),
        }
    }
}

fn default_templates() -> String {
    "./templates".to_string()
}

fn default_public() -> String {
    "./public".to_string()
}

fn default_migrations() -> String {
    "./migrations".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STRATA").separator("__"))
            .build()?
            .try_deserialize()
    }
}
