use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::discogs::client::{default_user_agent, DEFAULT_BASE_URL};

pub const ENV_BASE_URL: &str = "DISCOGS_API_BASE_URL";
pub const ENV_TOKEN: &str = "DISCOGS_API_TOKEN";
pub const ENV_USER_AGENT: &str = "DISCOGS_USER_AGENT";
pub const ENV_DATABASE_PATH: &str = "DISCOGS_DATABASE_PATH";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("Could not determine home directory; set {0}")]
    NoHomeDir(&'static str),
}

/// Application configuration
///
/// Read from environment variables. A `.env` file in the working directory
/// is loaded first when present.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub discogs_base_url: String,
    /// Personal access token sent with every Discogs request
    pub discogs_token: String,
    pub user_agent: String,
    pub database_path: PathBuf,
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            info!("Config: loaded .env file");
        } else {
            debug!("Config: no .env file found, using process environment");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discogs_token = non_empty(ENV_TOKEN).ok_or(ConfigError::MissingVar(ENV_TOKEN))?;

        let discogs_base_url =
            non_empty(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let user_agent = non_empty(ENV_USER_AGENT).unwrap_or_else(default_user_agent);

        let database_path = match non_empty(ENV_DATABASE_PATH) {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir(ENV_DATABASE_PATH))?
                .join(".discogs-compare")
                .join("library.db"),
        };

        info!("Config: Discogs API at {}", discogs_base_url);
        info!("Config: database at {}", database_path.display());

        Ok(Self {
            discogs_base_url,
            discogs_token,
            user_agent,
            database_path,
        })
    }
}
