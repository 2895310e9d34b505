//! Cloudflare R2 design hosting
//!
//! R2 is S3-compatible, so we use aws-sdk-s3 with custom endpoint configuration.
//!
//! ## Folder Structure
//! ```text
//! {bucket}/
//! └── designs/
//!     └── {content_id}.{ext}     # One object per distinct design
//! ```

use async_trait::async_trait;
use aws_sdk_s3::{
    Client as S3Client,
    config::{retry::RetryConfig, Builder, Credentials, Region},
    primitives::ByteStream,
};
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::R2Settings;
use crate::domain::ContentId;
use crate::providers::{AssetHost, ProviderError, ProviderResult};

/// Errors that can occur during R2 operations
#[derive(Error, Debug)]
pub enum R2Error {
    #[error("R2 not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("No public URL prefix configured")]
    NoPublicUrl,
}

impl From<R2Error> for ProviderError {
    fn from(err: R2Error) -> Self {
        match err {
            R2Error::NotConfigured(what) => ProviderError::NotConfigured(what.to_string()),
            other => ProviderError::Storage(other.to_string()),
        }
    }
}

/// Object key for a design: content-addressed, so re-uploads overwrite in place
pub fn design_key(content_id: &ContentId, content_type: &str) -> String {
    format!("designs/{}.{}", content_id.as_str(), extension_for(content_type))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}

/// Cloudflare R2 design host
#[derive(Clone)]
pub struct R2AssetHost {
    client: S3Client,
    bucket: String,
    public_url_prefix: String,
}

impl R2AssetHost {
    /// Create a new R2 host from settings
    pub fn new(settings: &R2Settings) -> Result<Self, R2Error> {
        if settings.account_id.is_empty() || settings.access_key_id.is_empty() {
            return Err(R2Error::NotConfigured("asset hosting"));
        }
        let public_url_prefix = settings.public_url_prefix
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(R2Error::NoPublicUrl)?;

        // R2 endpoint format: https://{account_id}.r2.cloudflarestorage.com
        let endpoint = format!(
            "https://{}.r2.cloudflarestorage.com",
            settings.account_id
        );

        debug!(endpoint = %endpoint, "Creating R2 client");

        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "r2-static-credentials",
        );

        let config = Builder::new()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .endpoint_url(&endpoint)
            .region(Region::new("auto"))
            .credentials_provider(credentials)
            .force_path_style(true)
            // A failed upload surfaces to the user, who decides whether to retry
            .retry_config(RetryConfig::disabled())
            .build();

        Ok(Self {
            client: S3Client::from_conf(config),
            bucket: settings.bucket_name.clone(),
            public_url_prefix,
        })
    }

    /// Public URL for an object key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url_prefix.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl AssetHost for R2AssetHost {
    #[instrument(skip(self, data), fields(content_id = %content_id, size = data.len()))]
    async fn upload(&self, content_id: &ContentId, data: Bytes, content_type: &str) -> ProviderResult<String> {
        let key = design_key(content_id, content_type);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| R2Error::UploadFailed(format!("{:?}", e)))?;

        info!(key = %key, size, "Uploaded design to R2");

        Ok(self.public_url(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> R2Settings {
        R2Settings {
            account_id: "acct".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "designs".to_string(),
            public_url_prefix: Some("https://cdn.example.com/".to_string()),
        }
    }

    #[test]
    fn test_design_key() {
        let id = ContentId::from_bytes(b"artwork");
        assert_eq!(design_key(&id, "image/png"), format!("designs/{}.png", id.as_str()));
        assert!(design_key(&id, "image/jpeg").ends_with(".jpg"));
    }

    #[test]
    fn test_public_url() {
        let host = R2AssetHost::new(&settings()).unwrap();
        assert_eq!(host.public_url("designs/a.png"), "https://cdn.example.com/designs/a.png");
    }

    #[test]
    fn test_requires_public_prefix() {
        let mut s = settings();
        s.public_url_prefix = None;
        assert!(matches!(R2AssetHost::new(&s), Err(R2Error::NoPublicUrl)));

        let mut s = settings();
        s.account_id.clear();
        let err: ProviderError = R2AssetHost::new(&s).err().unwrap().into();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn test_uploads_are_attempted_once() {
        let host = R2AssetHost::new(&settings()).unwrap();
        let retry = host.client.config().retry_config().unwrap();
        assert_eq!(retry.max_attempts(), 1);
    }
}
