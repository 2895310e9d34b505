//! Design assets and authoritative mockup sets

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

/// Content identity of a design asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    /// SHA-256 of the raw artwork bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentId(hex::encode(hasher.finalize()))
    }

    /// Stable reference for an asset that is already hosted
    pub fn from_url(url: &str) -> Self {
        ContentId(format!("url:{}", url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user's artwork
#[derive(Debug, Clone)]
pub struct DesignAsset {
    pub content_id: ContentId,
    pub width: u32,
    pub height: u32,
    /// Set once the asset has been uploaded (or was picked from hosted assets)
    pub durable_url: Option<String>,
    /// Raw bytes of a fresh upload, kept for previews and the deferred upload
    pub data: Option<Bytes>,
    pub content_type: String,
}

impl DesignAsset {
    /// A freshly uploaded, not yet durable asset
    pub fn from_upload(data: Bytes, width: u32, height: u32, content_type: &str) -> Self {
        DesignAsset {
            content_id: ContentId::from_bytes(&data),
            width,
            height,
            durable_url: None,
            data: Some(data),
            content_type: content_type.to_string(),
        }
    }

    /// An asset picked from already-hosted artwork
    pub fn from_hosted(url: &str, width: u32, height: u32, content_type: &str) -> Self {
        DesignAsset {
            content_id: ContentId::from_url(url),
            width,
            height,
            durable_url: Some(url.to_string()),
            data: None,
            content_type: content_type.to_string(),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.durable_url.is_some()
    }
}

/// Sorted, de-duplicated set of variant ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct VariantSet(Vec<String>);

impl VariantSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        ids.sort();
        ids.dedup();
        VariantSet(ids)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Inputs an authoritative mockup set was rendered from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SourceFingerprint {
    pub design: ContentId,
    pub transform_version: u64,
    pub variants: VariantSet,
}

/// A provider-rendered preview image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MockupImage {
    pub url: String,
    pub variant_ids: VariantSet,
    pub position_label: Option<String>,
    pub is_default: bool,
    pub batch_id: String,
}

/// Ordered set of authoritative mockups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MockupSet {
    pub images: Vec<MockupImage>,
    pub generated_at: DateTime<Utc>,
    pub source_fingerprint: SourceFingerprint,
    /// Inputs drifted since generation
    pub stale: bool,
}

impl MockupSet {
    pub fn new(images: Vec<MockupImage>, source_fingerprint: SourceFingerprint) -> Self {
        MockupSet {
            images,
            generated_at: Utc::now(),
            source_fingerprint,
            stale: false,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Index of the first `is_default` image, or 0
    pub fn default_index(&self) -> usize {
        self.images.iter().position(|m| m.is_default).unwrap_or(0)
    }
}
