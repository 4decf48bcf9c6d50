//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generative-image service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// API key for the generative-image service
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

/// Upload constraints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

fn default_max_files() -> usize {
    4
}

fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_mime_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
    ]
}

/// Persistence configuration: document store plus file storage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PersistenceConfig {
    /// Remote document-store endpoint; the in-memory store is used when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_database_id")]
    pub database_id: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    #[serde(default = "default_images_collection")]
    pub images_collection: String,
    #[serde(default = "default_favorites_collection")]
    pub favorites_collection: String,
    #[serde(default = "default_shares_collection")]
    pub shares_collection: String,
}

fn default_database_id() -> String {
    "studio".to_string()
}

fn default_storage_path() -> String {
    "./generated_images".to_string()
}

fn default_url_prefix() -> String {
    "http://localhost:8080/images".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_images_collection() -> String {
    "generated_images".to_string()
}

fn default_favorites_collection() -> String {
    "favorites".to_string()
}

fn default_shares_collection() -> String {
    "shares".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("generation.model", default_model())?
            .set_default("generation.endpoint", default_generation_endpoint())?
            .set_default("uploads.max_files", default_max_files() as i64)?
            .set_default("uploads.max_file_bytes", default_max_file_bytes() as i64)?
            // Load from configuration file
            .add_source(
                File::with_name(path.as_ref().to_str().unwrap_or("config/default"))
                    .required(false),
            )
            // Override with environment variables (prefixed with INSITU_)
            .add_source(
                Environment::with_prefix("INSITU")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.generation.model.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Generation model cannot be empty".to_string(),
            )));
        }

        if self.uploads.max_files == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "uploads.max_files must be at least 1".to_string(),
            )));
        }

        if self.uploads.allowed_mime_types.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "uploads.allowed_mime_types cannot be empty".to_string(),
            )));
        }

        if let Some(endpoint) = &self.persistence.endpoint {
            if self.persistence.project_id.is_empty() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "persistence.project_id is required when endpoint '{}' is set",
                    endpoint
                ))));
            }
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_generation_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_bytes: default_max_file_bytes(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            project_id: String::new(),
            api_key: String::new(),
            database_id: default_database_id(),
            storage_path: default_storage_path(),
            url_prefix: default_url_prefix(),
            users_collection: default_users_collection(),
            images_collection: default_images_collection(),
            favorites_collection: default_favorites_collection(),
            shares_collection: default_shares_collection(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
