use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub picker: PickerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(alias = "apikey", rename = "api_key")]
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_min_vote_count")]
    pub min_vote_count: u32,
    /// Minimum runtime in minutes. Not sent upstream when unset.
    #[serde(default)]
    pub min_runtime: Option<u32>,
    #[serde(default = "default_max_page")]
    pub max_page: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
            min_vote_count: default_min_vote_count(),
            min_runtime: None,
            max_page: default_max_page(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TmdbConfig {
    /// The credential with surrounding whitespace removed. Blank counts as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PickerConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_single_capacity")]
    pub single_capacity: usize,
    #[serde(default = "default_batch_capacity")]
    pub batch_capacity: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            single_capacity: default_single_capacity(),
            batch_capacity: default_batch_capacity(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_language() -> String {
    "es-ES".to_string()
}

fn default_min_vote_count() -> u32 {
    500
}

fn default_max_page() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_origin() -> String {
    "http://localhost:4200".to_string()
}

fn default_max_attempts() -> u32 {
    10
}

fn default_single_capacity() -> usize {
    20
}

fn default_batch_capacity() -> usize {
    100
}

fn default_batch_size() -> usize {
    5
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    /// Load the config file if it exists, otherwise start from defaults.
    /// Environment variables are applied on top in both cases.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(port) = lookup("PORT") {
            self.listen.port = port;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            self.cors.origin = origin;
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.tmdb.api_key()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}
