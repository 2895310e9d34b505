//! Editing sessions
//!
//! One `EditingSession` holds everything a single user edits: the selected
//! template and variants, the design, its transform, the authoritative mockup
//! gallery and its staleness. State only changes through the transition
//! methods below, each of which keeps staleness in sync.
//!
//! Remote generations are split in two: `begin_generation` hands out a ticket
//! and a job, the job runs without the session locked, and
//! `commit_generation` / `fail_generation` apply the result only when the
//! ticket is still the latest one for the current template context.

mod gallery;
mod invalidation;
mod store;

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    resolve, ContentId, DesignAsset, DesignTransform, FineEdit, MockupSet, PrintRegionProfile, ProductTemplate,
    ProfileId, ScaleClass, SourceFingerprint, TemplateVariant, VariantSet, VerticalAnchor,
};
use crate::engine::{ImageSource, PreviewRequest};
use crate::pipeline::{GenerationJob, PipelineOutput};

pub use gallery::{GalleryState, MockupGallery};
pub use invalidation::InvalidationTracker;
pub use store::{SessionStore, SharedSession};

/// Session transition errors
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("No template selected")]
    NoTemplate,

    #[error("Template has no reference image")]
    NoTemplateImage,

    #[error("No design uploaded")]
    NoDesign,

    #[error("No variants selected")]
    NoVariantsSelected,

    #[error("Unknown variant: {0}")]
    UnknownVariant(String),
}

/// Identifies one pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    pub sequence: u64,
    pub epoch: u64,
}

#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub ticket: GenerationTicket,
    pub job: GenerationJob,
}

/// What happened to a finished pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed,
    /// A newer invocation was issued after this one
    Superseded,
    /// Template or provider changed while it was in flight
    ContextChanged,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DesignSummary {
    pub content_id: ContentId,
    pub width: u32,
    pub height: u32,
    pub durable_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GalleryItem {
    pub url: String,
    pub label: String,
    pub variant_ids: VariantSet,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GallerySnapshot {
    pub state: GalleryState,
    pub selected_index: usize,
    pub stale: bool,
    pub generated_at: Option<DateTime<Utc>>,
    pub mockups: Vec<GalleryItem>,
}

/// Full view of a session for the editor UI
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub template: Option<ProductTemplate>,
    pub profile_id: ProfileId,
    pub provider_id: Option<String>,
    pub selected_variants: VariantSet,
    pub design: Option<DesignSummary>,
    pub transform: DesignTransform,
    pub gallery: GallerySnapshot,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What product assembly reads from a finished session
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSelection {
    pub template_id: Option<String>,
    pub provider_id: Option<String>,
    pub variant_ids: VariantSet,
    pub profile_id: ProfileId,
    pub design_url: Option<String>,
    pub transform: DesignTransform,
    pub selected_mockup_url: Option<String>,
    pub mockups: Option<MockupSet>,
}

#[derive(Debug)]
pub struct EditingSession {
    id: Uuid,
    template: Option<ProductTemplate>,
    profile: PrintRegionProfile,
    provider_id: Option<String>,
    variants: VariantSet,
    design: Option<DesignAsset>,
    transform: DesignTransform,
    gallery: MockupGallery,
    tracker: InvalidationTracker,
    issued_sequence: u64,
    epoch: u64,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    last_active: Instant,
}

impl EditingSession {
    pub fn new(id: Uuid) -> Self {
        EditingSession {
            id,
            template: None,
            profile: resolve(ProfileId::Default),
            provider_id: None,
            variants: VariantSet::default(),
            design: None,
            transform: DesignTransform::default(),
            gallery: MockupGallery::default(),
            tracker: InvalidationTracker::default(),
            issued_sequence: 0,
            epoch: 0,
            last_error: None,
            created_at: Utc::now(),
            last_active: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    pub fn template(&self) -> Option<&ProductTemplate> {
        self.template.as_ref()
    }

    // ------------------------------------------------------------------
    // Template context
    // ------------------------------------------------------------------

    /// Select a template. Resets the transform and drops any mockup set; the
    /// design is kept.
    pub fn select_template(&mut self, template: ProductTemplate) {
        self.profile = resolve(template.profile_id());
        self.provider_id = Some(template.provider_id.clone());
        self.variants = VariantSet::new(template.variants.first().map(|v| v.id.clone()));
        self.transform = DesignTransform::default();

        info!(
            session_id = %self.id,
            template_id = %template.id,
            profile = %self.profile.id.as_str(),
            "Template selected"
        );

        self.template = Some(template);
        self.reset_context();
    }

    /// Switch the fulfilment provider, replacing the variant list
    pub fn select_provider(&mut self, provider_id: &str, variants: Vec<TemplateVariant>) -> Result<(), SessionError> {
        let template = self.template.as_mut().ok_or(SessionError::NoTemplate)?;
        template.provider_id = provider_id.to_string();
        template.variants = variants;

        self.variants = VariantSet::new(template.variants.first().map(|v| v.id.clone()));
        self.provider_id = Some(provider_id.to_string());

        debug!(session_id = %self.id, provider_id = %provider_id, "Provider selected");
        self.reset_context();
        Ok(())
    }

    fn reset_context(&mut self) {
        self.gallery.clear();
        self.tracker.discard();
        self.last_error = None;
        self.epoch += 1;
    }

    pub fn select_variants<I, S>(&mut self, ids: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = self.template.as_ref().ok_or(SessionError::NoTemplate)?;
        let variants = VariantSet::new(ids);
        if variants.is_empty() {
            return Err(SessionError::NoVariantsSelected);
        }
        if let Some(unknown) = variants.as_slice().iter().find(|id| template.variant(id).is_none()) {
            return Err(SessionError::UnknownVariant(unknown.clone()));
        }

        self.variants = variants;
        self.refresh_staleness();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Design and transform
    // ------------------------------------------------------------------

    pub fn set_design(&mut self, mut asset: DesignAsset) {
        // Same artwork again: keep the URL it was already hosted at
        if let Some(current) = &self.design {
            if current.content_id == asset.content_id && !asset.is_durable() {
                asset.durable_url = current.durable_url.clone();
            }
        }

        debug!(session_id = %self.id, content_id = %asset.content_id, "Design set");
        self.design = Some(asset);
        self.refresh_staleness();
    }

    pub fn set_scale_class(&mut self, class: ScaleClass) {
        self.transform.set_scale_class(class);
        self.refresh_staleness();
    }

    pub fn set_vertical_anchor(&mut self, anchor: VerticalAnchor) {
        self.transform.set_vertical_anchor(anchor);
        self.refresh_staleness();
    }

    pub fn apply_fine(&mut self, edit: &FineEdit) {
        self.transform.apply_fine(edit);
        self.refresh_staleness();
    }

    // ------------------------------------------------------------------
    // Gallery
    // ------------------------------------------------------------------

    pub fn select_mockup(&mut self, index: usize) -> usize {
        self.gallery.select(index)
    }

    pub fn next_mockup(&mut self) -> usize {
        self.gallery.next()
    }

    pub fn previous_mockup(&mut self) -> usize {
        self.gallery.previous()
    }

    // ------------------------------------------------------------------
    // Staleness
    // ------------------------------------------------------------------

    pub fn current_fingerprint(&self) -> Option<SourceFingerprint> {
        self.design.as_ref().map(|design| SourceFingerprint {
            design: design.content_id.clone(),
            transform_version: self.transform.version,
            variants: self.variants.clone(),
        })
    }

    fn refresh_staleness(&mut self) {
        if let Some(fingerprint) = self.current_fingerprint() {
            self.tracker.observe(&fingerprint);
        }
        let stale = self.tracker.is_stale();
        if let Some(set) = self.gallery.set_mut() {
            set.stale = stale;
        }
    }

    // ------------------------------------------------------------------
    // Remote generation
    // ------------------------------------------------------------------

    pub fn begin_generation(&mut self) -> Result<PendingGeneration, SessionError> {
        let template = self.template.as_ref().ok_or(SessionError::NoTemplate)?;
        let design = self.design.clone().ok_or(SessionError::NoDesign)?;
        if self.variants.is_empty() {
            return Err(SessionError::NoVariantsSelected);
        }

        let print_area = self.variants
            .as_slice()
            .iter()
            .filter_map(|id| template.variant(id))
            .find_map(|v| v.print_area);

        let job = GenerationJob {
            template_id: template.id.clone(),
            provider_id: self.provider_id.clone().unwrap_or_else(|| template.provider_id.clone()),
            variants: self.variants.clone(),
            fingerprint: SourceFingerprint {
                design: design.content_id.clone(),
                transform_version: self.transform.version,
                variants: self.variants.clone(),
            },
            design,
            profile: self.profile,
            print_area,
            transform: self.transform.clone(),
        };

        self.issued_sequence += 1;
        self.gallery.begin_loading();

        let ticket = GenerationTicket {
            sequence: self.issued_sequence,
            epoch: self.epoch,
        };
        debug!(session_id = %self.id, sequence = ticket.sequence, epoch = ticket.epoch, "Generation issued");

        Ok(PendingGeneration { ticket, job })
    }

    fn check_ticket(&self, ticket: GenerationTicket) -> CommitOutcome {
        if ticket.epoch != self.epoch {
            CommitOutcome::ContextChanged
        } else if ticket.sequence != self.issued_sequence {
            CommitOutcome::Superseded
        } else {
            CommitOutcome::Committed
        }
    }

    /// Apply a successful pipeline run if its ticket is still current
    pub fn commit_generation(&mut self, ticket: GenerationTicket, output: PipelineOutput) -> CommitOutcome {
        let outcome = self.check_ticket(ticket);
        if outcome != CommitOutcome::Committed {
            debug!(session_id = %self.id, sequence = ticket.sequence, outcome = ?outcome, "Dropping generation result");
            return outcome;
        }

        let fingerprint = output.set.source_fingerprint.clone();
        if let Some(design) = self.design.as_mut() {
            if design.content_id == fingerprint.design {
                design.durable_url = Some(output.durable_url);
            }
        }

        info!(
            session_id = %self.id,
            sequence = ticket.sequence,
            mockups = output.set.len(),
            "Mockup set committed"
        );

        self.tracker.regenerated(fingerprint);
        self.gallery.replace(output.set);
        self.last_error = None;
        // Inputs may have moved while the request was in flight
        self.refresh_staleness();
        outcome
    }

    /// Record a failed pipeline run. The existing set is left untouched.
    pub fn fail_generation(&mut self, ticket: GenerationTicket, message: String) -> CommitOutcome {
        let outcome = self.check_ticket(ticket);
        if outcome == CommitOutcome::Committed {
            self.gallery.end_loading();
            self.last_error = Some(message);
        }
        outcome
    }

    /// Release a generation whose request went away before the pipeline
    /// returned. Loading ends only if nothing newer was issued since.
    pub fn abandon_generation(&mut self, ticket: GenerationTicket) -> CommitOutcome {
        let outcome = self.check_ticket(ticket);
        if outcome == CommitOutcome::Committed {
            debug!(session_id = %self.id, sequence = ticket.sequence, "Generation abandoned");
            self.gallery.end_loading();
        }
        outcome
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Inputs for a local preview render
    pub fn preview_request(&self) -> Result<PreviewRequest, SessionError> {
        let template = self.template.as_ref().ok_or(SessionError::NoTemplate)?;
        let image = template.primary_image().ok_or(SessionError::NoTemplateImage)?;

        let design = self.design.as_ref().and_then(|d| match (&d.data, &d.durable_url) {
            (Some(bytes), _) => Some(ImageSource::Bytes(bytes.clone())),
            (None, Some(url)) => Some(ImageSource::Url(url.clone())),
            (None, None) => None,
        });

        Ok(PreviewRequest {
            template: ImageSource::Url(image.to_string()),
            design,
            profile: self.profile,
            transform: self.transform.clone(),
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let set = self.gallery.set();
        let mockups = set
            .map(|s| {
                s.images
                    .iter()
                    .enumerate()
                    .map(|(i, m)| GalleryItem {
                        url: m.url.clone(),
                        label: MockupGallery::label(m, i),
                        variant_ids: m.variant_ids.clone(),
                        is_default: m.is_default,
                    })
                    .collect()
            })
            .unwrap_or_default();

        SessionSnapshot {
            id: self.id,
            template: self.template.clone(),
            profile_id: self.profile.id,
            provider_id: self.provider_id.clone(),
            selected_variants: self.variants.clone(),
            design: self.design.as_ref().map(|d| DesignSummary {
                content_id: d.content_id.clone(),
                width: d.width,
                height: d.height,
                durable_url: d.durable_url.clone(),
            }),
            transform: self.transform.clone(),
            gallery: GallerySnapshot {
                state: self.gallery.state(),
                selected_index: self.gallery.selected_index(),
                stale: set.map_or(false, |s| s.stale),
                generated_at: set.map(|s| s.generated_at),
                mockups,
            },
            last_error: self.last_error.clone(),
            created_at: self.created_at,
        }
    }

    pub fn selection(&self) -> ProductSelection {
        ProductSelection {
            template_id: self.template.as_ref().map(|t| t.id.clone()),
            provider_id: self.provider_id.clone(),
            variant_ids: self.variants.clone(),
            profile_id: self.profile.id,
            design_url: self.design.as_ref().and_then(|d| d.durable_url.clone()),
            transform: self.transform.clone(),
            selected_mockup_url: self.gallery.selected().map(|m| m.url.clone()),
            mockups: self.gallery.set().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    use crate::domain::{BlendMode, MockupImage, PrintAreaSize};

    fn hoodie() -> ProductTemplate {
        let mut large = TemplateVariant::new("11", "Black / L");
        large.print_area = Some(PrintAreaSize { width_px: 3600, height_px: 4800 });
        ProductTemplate {
            id: "146".to_string(),
            title: "Premium Hoodie XL".to_string(),
            images: vec!["https://pf/146.jpg".to_string()],
            provider_id: "printful".to_string(),
            variants: vec![TemplateVariant::new("10", "Black / M"), large],
        }
    }

    fn poster() -> ProductTemplate {
        ProductTemplate {
            id: "1".to_string(),
            title: "Wall Poster A3".to_string(),
            images: vec!["https://pf/1.jpg".to_string()],
            provider_id: "printful".to_string(),
            variants: vec![TemplateVariant::new("20", "A3")],
        }
    }

    fn design(bytes: &'static [u8]) -> DesignAsset {
        DesignAsset::from_upload(Bytes::from_static(bytes), 400, 400, "image/png")
    }

    fn output(job: &GenerationJob, n: usize, default_at: usize) -> PipelineOutput {
        let images = (0..n)
            .map(|i| MockupImage {
                url: format!("https://m/{}.png", i),
                variant_ids: job.variants.clone(),
                position_label: None,
                is_default: i == default_at,
                batch_id: "b".to_string(),
            })
            .collect();
        PipelineOutput {
            set: MockupSet::new(images, job.fingerprint.clone()),
            durable_url: format!("https://cdn/{}.png", job.design.content_id),
        }
    }

    fn ready_session() -> EditingSession {
        let mut session = EditingSession::new(Uuid::new_v4());
        session.select_template(hoodie());
        session.set_design(design(b"d1"));
        session
    }

    fn generate(session: &mut EditingSession, n: usize, default_at: usize) -> CommitOutcome {
        let pending = session.begin_generation().unwrap();
        let out = output(&pending.job, n, default_at);
        session.commit_generation(pending.ticket, out)
    }

    #[test]
    fn test_select_template_resolves_profile() {
        let mut session = EditingSession::new(Uuid::new_v4());
        session.select_template(hoodie());

        assert_eq!(session.profile.id, ProfileId::Hoodie);
        assert_eq!(session.profile.blend_mode, BlendMode::Multiply);
        assert_eq!(session.snapshot().selected_variants, VariantSet::new(["10"]));
    }

    #[test]
    fn test_generation_requires_inputs() {
        let mut session = EditingSession::new(Uuid::new_v4());
        assert_eq!(session.begin_generation().unwrap_err(), SessionError::NoTemplate);

        session.select_template(hoodie());
        assert_eq!(session.begin_generation().unwrap_err(), SessionError::NoDesign);
    }

    #[test]
    fn test_variant_validation() {
        let mut session = ready_session();
        assert_eq!(session.select_variants(Vec::<String>::new()), Err(SessionError::NoVariantsSelected));
        assert_eq!(session.select_variants(["10", "99"]), Err(SessionError::UnknownVariant("99".to_string())));
        assert!(session.select_variants(["11", "10"]).is_ok());

        // Print area comes from the first selected variant that has one
        let pending = session.begin_generation().unwrap();
        assert_eq!(pending.job.print_area, Some(PrintAreaSize { width_px: 3600, height_px: 4800 }));
    }

    #[test]
    fn test_design_switch_marks_stale_then_regenerate_clears() {
        let mut session = ready_session();
        assert_eq!(generate(&mut session, 2, 0), CommitOutcome::Committed);
        assert!(!session.tracker.is_stale());

        session.set_design(design(b"d2"));
        assert!(session.tracker.is_stale());
        assert!(session.snapshot().gallery.stale);
        // Stale set is kept
        assert_eq!(session.gallery.state(), GalleryState::Populated);

        assert_eq!(generate(&mut session, 2, 0), CommitOutcome::Committed);
        assert!(!session.tracker.is_stale());
        let set = session.gallery.set().unwrap();
        assert_eq!(set.source_fingerprint.design, ContentId::from_bytes(b"d2"));
    }

    #[test]
    fn test_transform_and_variant_changes_mark_stale() {
        let mut session = ready_session();
        generate(&mut session, 1, 0);

        session.set_scale_class(ScaleClass::Small);
        assert!(session.tracker.is_stale());

        generate(&mut session, 1, 0);
        session.select_variants(["11"]).unwrap();
        assert!(session.tracker.is_stale());
    }

    #[test]
    fn test_template_switch_discards_set() {
        let mut session = ready_session();
        generate(&mut session, 3, 2);
        assert_eq!(session.gallery.selected_index(), 2);
        session.apply_fine(&FineEdit { rotation: Some(45.0), ..Default::default() });

        session.select_template(poster());

        assert_eq!(session.gallery.state(), GalleryState::Empty);
        assert_eq!(session.gallery.selected_index(), 0);
        assert!(!session.tracker.is_stale());
        assert_eq!(&session.transform, &DesignTransform::default());
        assert!(session.design.as_ref().is_some());
        assert_eq!(session.profile.id, ProfileId::Poster);
    }

    #[test]
    fn test_late_earlier_response_is_dropped() {
        let mut session = ready_session();
        let first = session.begin_generation().unwrap();
        session.set_scale_class(ScaleClass::Fill);
        let second = session.begin_generation().unwrap();

        let second_out = output(&second.job, 2, 0);
        assert_eq!(session.commit_generation(second.ticket, second_out), CommitOutcome::Committed);

        let first_out = output(&first.job, 4, 0);
        assert_eq!(session.commit_generation(first.ticket, first_out), CommitOutcome::Superseded);

        let set = session.gallery.set().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.source_fingerprint.transform_version, second.job.transform.version);
        assert!(!session.tracker.is_stale());
    }

    #[test]
    fn test_result_after_template_switch_is_ignored() {
        let mut session = ready_session();
        let pending = session.begin_generation().unwrap();
        session.select_template(poster());

        let out = output(&pending.job, 2, 0);
        assert_eq!(session.commit_generation(pending.ticket, out), CommitOutcome::ContextChanged);
        assert!(session.gallery.set().is_none());
    }

    #[test]
    fn test_failure_preserves_set() {
        let mut session = ready_session();
        generate(&mut session, 2, 1);

        let pending = session.begin_generation().unwrap();
        assert_eq!(session.gallery.state(), GalleryState::Loading);
        assert_eq!(
            session.fail_generation(pending.ticket, "renderer down".to_string()),
            CommitOutcome::Committed
        );

        assert_eq!(session.gallery.state(), GalleryState::Populated);
        assert_eq!(session.gallery.selected_index(), 1);
        assert_eq!(session.snapshot().last_error.as_deref(), Some("renderer down"));
    }

    #[test]
    fn test_abandoned_generation_ends_loading() {
        let mut session = ready_session();
        let pending = session.begin_generation().unwrap();
        assert_eq!(session.gallery.state(), GalleryState::Loading);

        assert_eq!(session.abandon_generation(pending.ticket), CommitOutcome::Committed);
        assert_eq!(session.gallery.state(), GalleryState::Empty);
        assert!(session.snapshot().last_error.is_none());
    }

    #[test]
    fn test_abandoning_older_ticket_keeps_newer_loading() {
        let mut session = ready_session();
        let first = session.begin_generation().unwrap();
        let _second = session.begin_generation().unwrap();

        assert_eq!(session.abandon_generation(first.ticket), CommitOutcome::Superseded);
        assert_eq!(session.gallery.state(), GalleryState::Loading);
    }

    #[test]
    fn test_edit_during_flight_leaves_new_set_stale() {
        let mut session = ready_session();
        let pending = session.begin_generation().unwrap();
        session.set_vertical_anchor(VerticalAnchor::Top);

        let out = output(&pending.job, 1, 0);
        session.commit_generation(pending.ticket, out);
        assert!(session.tracker.is_stale());
    }

    #[test]
    fn test_commit_records_durable_url_and_selection() {
        let mut session = ready_session();
        generate(&mut session, 2, 1);

        let selection = session.selection();
        assert_eq!(selection.template_id.as_deref(), Some("146"));
        assert_eq!(selection.profile_id, ProfileId::Hoodie);
        assert_eq!(selection.selected_mockup_url.as_deref(), Some("https://m/1.png"));
        assert!(selection.design_url.unwrap().starts_with("https://cdn/"));

        // Re-uploading the same bytes keeps the hosted URL
        session.set_design(design(b"d1"));
        assert!(session.design.as_ref().unwrap().is_durable());
    }

    #[test]
    fn test_preview_request_prefers_bytes() {
        let session = ready_session();
        let request = session.preview_request().unwrap();
        assert!(matches!(request.design, Some(ImageSource::Bytes(_))));
        assert!(matches!(request.template, ImageSource::Url(ref u) if u == "https://pf/146.jpg"));
    }
}
