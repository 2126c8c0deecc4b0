//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Session token configuration.
    pub jwt: JwtSettings,
    /// Workflow defaults.
    #[serde(default)]
    pub workflow: WorkflowSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Fee defaults and startup behaviour of the workflow engine.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSettings {
    /// LTO processing fee advanced per motorcycle.
    #[serde(default = "default_processing_fee")]
    pub processing_fee: Decimal,
    /// Official receipt fee advanced per motorcycle.
    #[serde(default = "default_or_fee")]
    pub or_fee: Decimal,
    /// Load the demo data set into the store at startup.
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            processing_fee: default_processing_fee(),
            or_fee: default_or_fee(),
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

fn default_processing_fee() -> Decimal {
    Decimal::new(150_000, 2)
}

fn default_or_fee() -> Decimal {
    Decimal::new(100_000, 2)
}

fn default_seed_demo_data() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MOTORTRACK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
