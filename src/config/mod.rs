//! Configuration module for the mockup studio service

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::DEFAULT_SHADOW_OPACITY;

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub preview: PreviewSettings,
    pub catalog: CatalogSettings,
    pub asset_hosting: R2Settings,
    pub mockup_service: MockupServiceSettings,
    pub sessions: SessionSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Largest accepted design upload, in bytes
    pub max_upload_bytes: usize,
}

/// Local preview rendering
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Longest side of a rendered preview, in pixels
    pub max_dimension: u32,
    /// Strength of the fabric shading pass for Multiply regions
    pub shadow_opacity: f64,
    pub fetch_timeout_secs: u64,
    /// Template images kept in memory
    pub template_cache_size: usize,
}

/// Printful catalog access
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    /// Falls back to PRINTFUL_ACCESS_TOKEN
    pub access_token: Option<String>,
    pub rate_limit_per_minute: u32,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

/// Cloudflare R2 configuration for hosting design artwork
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct R2Settings {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub public_url_prefix: Option<String>,
}

/// Authoritative mockup renderer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockupServiceSettings {
    /// Unset disables remote generation
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub rate_limit_per_minute: u32,
    pub max_retries: u32,
    pub timeout_secs: u64,
    /// Durable design URLs remembered per content identity
    pub upload_cache_size: usize,
}

/// Editing session lifetime
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub idle_ttl_secs: u64,
    pub eviction_interval_secs: u64,
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with MOCKUP_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (MOCKUP_PREVIEW__MAX_DIMENSION, etc.)
            .add_source(
                Environment::with_prefix("MOCKUP")
                    .separator("__")
                    .try_parsing(true)
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        PreviewSettings {
            max_dimension: 1024,
            shadow_opacity: DEFAULT_SHADOW_OPACITY,
            fetch_timeout_secs: 15,
            template_cache_size: 256,
        }
    }
}

impl PreviewSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            base_url: "https://api.printful.com".to_string(),
            access_token: None,
            rate_limit_per_minute: 120,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

impl Default for R2Settings {
    fn default() -> Self {
        R2Settings {
            account_id: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: "mockup-studio-designs".to_string(),
            public_url_prefix: None,
        }
    }
}

impl R2Settings {
    pub fn is_configured(&self) -> bool {
        !self.account_id.is_empty() && !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

impl Default for MockupServiceSettings {
    fn default() -> Self {
        MockupServiceSettings {
            base_url: None,
            api_key: None,
            rate_limit_per_minute: 60,
            max_retries: 2,
            timeout_secs: 120,
            upload_cache_size: 4096,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            idle_ttl_secs: 2 * 60 * 60,
            eviction_interval_secs: 5 * 60,
        }
    }
}

impl SessionSettings {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }
}
