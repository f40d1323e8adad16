use config::{Config as Cfg, File};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_service_name() -> String {
    "invoice-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl InvoiceConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_defaults_to_ten_megabytes() {
        assert_eq!(UploadConfig::default().max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn gemini_defaults_are_unconfigured_flash() {
        let settings = GeminiSettings::default();
        assert!(settings.api_key.is_empty());
        assert_eq!(settings.model, "gemini-2.0-flash");
    }
}
