use crate::constants;
use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::env;
use std::fs;

/// Top-level application configuration, passed by value into the
/// collaborators that need it. Credentials are never read from ambient
/// state after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Settings for the upstream JSearch data source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page")]
    pub num_pages: u32,
}

/// Settings for the relational store holding normalized listings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_host() -> String {
    constants::JSEARCH_HOST.to_string()
}

fn default_query() -> String {
    "Data Professional in Atlanta, Georgia, USA".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_db_path() -> String {
    "data/jobs.db".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            query: default_query(),
            page: default_page(),
            num_pages: default_page(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Config {
    /// Load configuration from `config.toml`, falling back to defaults when
    /// the file is absent. A `DB_PATH` environment variable overrides the
    /// configured database location.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let mut config = match fs::read_to_string(config_path) {
            Ok(content) => toml::from_str::<Config>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config {
                source: SourceConfig::default(),
                database: DatabaseConfig::default(),
            },
            Err(e) => {
                return Err(IngestError::Config(format!(
                    "Failed to read config file '{config_path}': {e}"
                )))
            }
        };

        if let Ok(path) = env::var("DB_PATH") {
            if !path.trim().is_empty() {
                config.database.path = path;
            }
        }

        Ok(config)
    }

    /// The RapidAPI key is a secret and only ever read from the environment.
    pub fn api_key() -> Result<String> {
        let key = env::var("API_KEY")
            .map_err(|_| IngestError::Config("API_KEY environment variable not set".to_string()))?;
        if key.trim().is_empty() {
            return Err(IngestError::Config("API_KEY is empty".to_string()));
        }
        Ok(key)
    }
}
