//! Remote mockup request pipeline
//!
//! One invocation uploads the design when it is not durable yet, then asks the
//! mockup-generation service for authoritative renders. Uploads are cached by
//! content identity so repeat generations of the same artwork skip them.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    ContentId, DesignAsset, DesignTransform, MockupImage, MockupSet, PrintAreaSize, PrintRegionProfile,
    SourceFingerprint, VariantSet, PRINT_TEMPLATE_HEIGHT, PRINT_TEMPLATE_WIDTH,
};
use crate::providers::{AssetHost, GenerationRequest, MockupGenerator, ProviderError};

/// Pipeline failures, kept apart so callers can tell hosting from rendering
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Asset hosting failed: {0}")]
    AssetHosting(ProviderError),

    #[error("Mockup generation failed: {0}")]
    Generation(ProviderError),

    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
}

/// Everything one generation needs, captured from the session at request time
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub template_id: String,
    pub provider_id: String,
    pub variants: VariantSet,
    pub design: DesignAsset,
    pub profile: PrintRegionProfile,
    /// Print area of the first selected variant that has one
    pub print_area: Option<PrintAreaSize>,
    pub transform: DesignTransform,
    pub fingerprint: SourceFingerprint,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub set: MockupSet,
    /// URL the design was hosted at
    pub durable_url: String,
}

/// Placement box sent to the renderer, in print-file pixels
pub fn placement_hints(profile: &PrintRegionProfile, print_area: Option<PrintAreaSize>) -> (u32, u32) {
    match print_area {
        Some(area) => (area.width_px, area.height_px),
        None => (
            (profile.width * PRINT_TEMPLATE_WIDTH as f64).round() as u32,
            (profile.height * PRINT_TEMPLATE_HEIGHT as f64).round() as u32,
        ),
    }
}

pub struct MockupPipeline {
    asset_host: Arc<dyn AssetHost>,
    generator: Arc<dyn MockupGenerator>,
    uploads: DashMap<ContentId, Arc<OnceCell<String>>>,
    max_cached_uploads: usize,
}

impl MockupPipeline {
    pub fn new(
        asset_host: Arc<dyn AssetHost>,
        generator: Arc<dyn MockupGenerator>,
        max_cached_uploads: usize,
    ) -> Self {
        MockupPipeline {
            asset_host,
            generator,
            uploads: DashMap::new(),
            max_cached_uploads: max_cached_uploads.max(1),
        }
    }

    /// Number of designs with a cached durable URL
    pub fn hosted_count(&self) -> usize {
        self.uploads.iter().filter(|entry| entry.value().initialized()).count()
    }

    /// Durable URL for a design, uploading at most once per content identity.
    /// A failed upload drops its entry so the user can retry.
    pub async fn ensure_hosted(&self, design: &DesignAsset) -> Result<String, PipelineError> {
        if let Some(url) = &design.durable_url {
            return Ok(url.clone());
        }

        let data = design.data.clone().ok_or_else(|| {
            PipelineError::InvalidRequest("design has neither bytes nor a hosted URL".to_string())
        })?;

        if !self.uploads.contains_key(&design.content_id) && self.uploads.len() >= self.max_cached_uploads {
            // Uploads still in flight keep their cells
            warn!(entries = self.uploads.len(), "Upload cache full, clearing");
            self.uploads.retain(|_, cell| !cell.initialized());
        }

        let cell = self.uploads
            .entry(design.content_id.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_try_init(|| async {
                debug!(content_id = %design.content_id, size = data.len(), "Uploading design");
                self.asset_host
                    .upload(&design.content_id, data, &design.content_type)
                    .await
            })
            .await;

        match result {
            Ok(url) => Ok(url.clone()),
            Err(e) => {
                warn!(content_id = %design.content_id, error = %e, "Design upload failed");
                self.uploads.remove_if(&design.content_id, |_, cell| !cell.initialized());
                Err(PipelineError::AssetHosting(e))
            }
        }
    }

    /// Upload (if needed) then generate. The caller decides whether the result
    /// may still be committed.
    #[instrument(skip(self, job), fields(template_id = %job.template_id, variants = job.variants.len()))]
    pub async fn run(&self, job: GenerationJob) -> Result<PipelineOutput, PipelineError> {
        if job.variants.is_empty() {
            return Err(PipelineError::InvalidRequest("no variants selected".to_string()));
        }

        let durable_url = self.ensure_hosted(&job.design).await?;
        let (placement_width, placement_height) = placement_hints(&job.profile, job.print_area);

        let request = GenerationRequest {
            design_url: durable_url.clone(),
            template_id: job.template_id.clone(),
            provider_id: job.provider_id.clone(),
            variant_ids: job.variants.as_slice().to_vec(),
            placement_width,
            placement_height,
            scale_factor: job.transform.scale_factor,
            vertical_position: job.transform.y,
        };

        let response = self.generator
            .generate(&request)
            .await
            .map_err(PipelineError::Generation)?;

        if response.mockups.is_empty() {
            return Err(PipelineError::Generation(ProviderError::Rejected(
                "service returned no mockups".to_string(),
            )));
        }

        let batch_id = response.batch_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let images: Vec<MockupImage> = response.mockups
            .into_iter()
            .map(|m| MockupImage {
                url: m.url,
                variant_ids: if m.variant_ids.is_empty() {
                    job.variants.clone()
                } else {
                    VariantSet::new(m.variant_ids)
                },
                position_label: m.position_label,
                is_default: m.is_default,
                batch_id: batch_id.clone(),
            })
            .collect();

        info!(batch_id = %batch_id, mockups = images.len(), "Authoritative mockups generated");

        Ok(PipelineOutput {
            set: MockupSet::new(images, job.fingerprint),
            durable_url,
        })
    }
}
