//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    health::HealthResponse,
    error::{ErrorResponse, ApiError},
    sessions::{SessionResponse, SelectTemplateRequest, SelectProviderRequest, SelectVariantsRequest},
    design::{HostedDesignRequest, PresetRequest, PreviewUnavailableResponse},
    gallery::{SelectMockupRequest, GalleryResponse},
    generate::GenerateResponse,
};
use crate::domain::{
    DesignTransform, FineEdit, Mirror, ScaleClass, VerticalAnchor,
    ProductTemplate, TemplateVariant, PrintAreaSize,
    ContentId, MockupImage, MockupSet, SourceFingerprint, VariantSet, ProfileId,
};
use crate::engine::{PixelRect, PreviewOutcome};
use crate::session::{
    CommitOutcome, DesignSummary, GalleryItem, GallerySnapshot, GalleryState, ProductSelection, SessionSnapshot,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mockup Studio API",
        version = "1.0.0",
        description = "Design placement, local mockup previews and authoritative mockup generation",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "sessions", description = "Editing session and template context"),
        (name = "design", description = "Design artwork, placement and local preview"),
        (name = "gallery", description = "Authoritative mockup browsing"),
        (name = "mockups", description = "Authoritative mockup generation")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::sessions::create_session,
        crate::api::handlers::sessions::get_session,
        crate::api::handlers::sessions::delete_session,
        crate::api::handlers::sessions::select_template,
        crate::api::handlers::sessions::select_provider,
        crate::api::handlers::sessions::select_variants,
        crate::api::handlers::sessions::get_selection,
        crate::api::handlers::design::upload_design,
        crate::api::handlers::design::use_hosted_design,
        crate::api::handlers::design::set_preset,
        crate::api::handlers::design::apply_advanced,
        crate::api::handlers::design::preview,
        crate::api::handlers::gallery::select_mockup,
        crate::api::handlers::gallery::next_mockup,
        crate::api::handlers::gallery::previous_mockup,
        crate::api::handlers::generate::generate_mockups,
    ),
    components(
        schemas(
            // System
            HealthResponse,
            ErrorResponse,
            ApiError,
            // Sessions
            SessionResponse,
            SessionSnapshot,
            SelectTemplateRequest,
            SelectProviderRequest,
            SelectVariantsRequest,
            ProductSelection,
            DesignSummary,
            // Design
            HostedDesignRequest,
            PresetRequest,
            PreviewUnavailableResponse,
            PreviewOutcome,
            PixelRect,
            // Gallery and generation
            SelectMockupRequest,
            GalleryResponse,
            GallerySnapshot,
            GalleryItem,
            GalleryState,
            GenerateResponse,
            CommitOutcome,
            // Domain
            DesignTransform,
            FineEdit,
            Mirror,
            ScaleClass,
            VerticalAnchor,
            ProductTemplate,
            TemplateVariant,
            PrintAreaSize,
            ContentId,
            MockupImage,
            MockupSet,
            SourceFingerprint,
            VariantSet,
            ProfileId,
        )
    )
)]
pub struct ApiDoc;
