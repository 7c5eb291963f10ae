// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, CheckParams, DataSettings, Settings, ValidCheckParams};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `config/base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `config/development.toml`).
/// 3. Merges settings from environment variables (e.g., `APP__CHECK__SYMBOL=...`).
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    load_settings_from("config", &environment)
}

/// Same as [`load_settings`], reading files from `dir` for `environment`.
pub fn load_settings_from(dir: &str, environment: &str) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::with_name(&format!("{}/base", dir)))
        .add_source(File::with_name(&format!("{}/{}", dir, environment)).required(false))
        // The prefix is `APP`, separator is `__`.
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    Ok(settings)
}
