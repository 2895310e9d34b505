//! Collaborator trait definitions
//!
//! The editor talks to three external services: a catalog (template lookup),
//! an asset host (artwork bytes to durable URL) and a mockup-generation
//! service (authoritative renders). Each sits behind a trait so sessions and
//! the pipeline never depend on a concrete provider.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ContentId, ProductTemplate, TemplateVariant};

// ============================================================================
// Error Types
// ============================================================================

/// Provider error types
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

// ============================================================================
// Credentials
// ============================================================================

/// Provider credentials for authentication
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    /// OAuth access token or API key
    pub access_token: Option<String>,
}

impl ProviderCredentials {
    /// Read `{PROVIDER}_ACCESS_TOKEN` from the environment
    pub fn from_env(provider_code: &str) -> Self {
        let prefix = provider_code.to_uppercase();
        ProviderCredentials {
            access_token: std::env::var(format!("{}_ACCESS_TOKEN", prefix)).ok(),
        }
    }

    /// Prefer an explicitly configured token, fall back to the environment
    pub fn resolve(configured: Option<&str>, provider_code: &str) -> Self {
        match configured.filter(|t| !t.is_empty()) {
            Some(token) => ProviderCredentials { access_token: Some(token.to_string()) },
            None => Self::from_env(provider_code),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }
}

// ============================================================================
// Mockup Generation Wire Types
// ============================================================================

/// Request sent to the mockup-generation service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub design_url: String,
    pub template_id: String,
    pub provider_id: String,
    pub variant_ids: Vec<String>,
    pub placement_width: u32,
    pub placement_height: u32,
    pub scale_factor: f64,
    pub vertical_position: f64,
}

/// One rendered mockup in a generation response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMockup {
    pub url: String,
    #[serde(default)]
    pub variant_ids: Vec<String>,
    #[serde(default)]
    pub position_label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Response from the mockup-generation service: either mockups or an error
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    #[serde(default)]
    pub mockups: Vec<GeneratedMockup>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Template lookup against a provider catalog
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Provider code (e.g., "printful")
    fn code(&self) -> &'static str;

    /// Template with title, reference images, provider and variants
    async fn template(&self, template_id: &str) -> ProviderResult<ProductTemplate>;

    /// Variants a given provider offers for a template
    async fn variants(&self, template_id: &str, provider_id: &str) -> ProviderResult<Vec<TemplateVariant>>;
}

/// Durable hosting for design artwork
#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Upload raw bytes, returning a URL the mockup service can fetch
    async fn upload(&self, content_id: &ContentId, data: Bytes, content_type: &str) -> ProviderResult<String>;
}

/// Authoritative mockup rendering
#[async_trait]
pub trait MockupGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<GenerationResponse>;
}

// ============================================================================
// Unconfigured Fallback
// ============================================================================

/// Stand-in used when a collaborator has no configuration. Every call fails
/// with `NotConfigured`, so the editor still serves local previews.
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl AssetHost for Unconfigured {
    async fn upload(&self, _content_id: &ContentId, _data: Bytes, _content_type: &str) -> ProviderResult<String> {
        Err(ProviderError::NotConfigured(self.0.to_string()))
    }
}

#[async_trait]
impl MockupGenerator for Unconfigured {
    async fn generate(&self, _request: &GenerationRequest) -> ProviderResult<GenerationResponse> {
        Err(ProviderError::NotConfigured(self.0.to_string()))
    }
}
