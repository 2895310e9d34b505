//! Design upload, placement and local preview endpoints

use actix_web::{http::header, web, HttpResponse};
use image::{GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::domain::{DesignAsset, FineEdit, ScaleClass, VerticalAnchor};
use crate::engine::{ImageSource, PreviewOutcome};
use super::error::{ApiFailure, ErrorResponse};
use super::sessions::{find_session, SessionResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct HostedDesignRequest {
    /// Publicly reachable URL of already hosted artwork
    pub url: String,
}

/// Preset placement; either field may be omitted
#[derive(Debug, Deserialize, ToSchema)]
pub struct PresetRequest {
    pub scale_class: Option<ScaleClass>,
    pub vertical_anchor: Option<VerticalAnchor>,
}

/// Body returned when no preview image could be drawn
#[derive(Serialize, ToSchema)]
pub struct PreviewUnavailableResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: PreviewOutcome,
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

/// POST /api/v1/sessions/{session_id}/design - Upload design artwork
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/design",
    tag = "design",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body(content = Vec<u8>, description = "Raw PNG, JPEG, WebP or GIF bytes", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Design set, existing mockups marked stale", body = SessionResponse),
        (status = 400, description = "Not a supported image", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn upload_design(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;

    if body.is_empty() {
        return Err(ApiFailure::InvalidDesign("empty upload".to_string()));
    }
    let content_type = image::guess_format(&body)
        .ok()
        .and_then(mime_for)
        .ok_or_else(|| ApiFailure::InvalidDesign("unsupported image format".to_string()))?;

    let decoded = state.loader
        .load(&ImageSource::Bytes(body.clone()))
        .await
        .map_err(|e| ApiFailure::InvalidDesign(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    let asset = DesignAsset::from_upload(body, width, height, content_type);
    info!(content_id = %asset.content_id, width, height, content_type, "Design uploaded");

    let mut guard = session.lock();
    guard.set_design(asset);
    Ok(SessionResponse::ok(guard.snapshot()))
}

/// PUT /api/v1/sessions/{session_id}/design/hosted - Pick already hosted artwork
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/design/hosted",
    tag = "design",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body = HostedDesignRequest,
    responses(
        (status = 200, description = "Design set", body = SessionResponse),
        (status = 400, description = "Invalid URL or image", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn use_hosted_design(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<HostedDesignRequest>,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;

    let url = url::Url::parse(&body.url)
        .map_err(|e| ApiFailure::InvalidDesign(format!("invalid URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiFailure::InvalidDesign(format!("unsupported scheme: {}", url.scheme())));
    }

    let data = state.loader
        .fetch(url.as_str())
        .await
        .map_err(|e| ApiFailure::InvalidDesign(e.to_string()))?;
    let content_type = image::guess_format(&data)
        .ok()
        .and_then(mime_for)
        .ok_or_else(|| ApiFailure::InvalidDesign("unsupported image format".to_string()))?;

    let decoded = state.loader
        .load(&ImageSource::Bytes(data))
        .await
        .map_err(|e| ApiFailure::InvalidDesign(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    let mut guard = session.lock();
    guard.set_design(DesignAsset::from_hosted(url.as_str(), width, height, content_type));
    Ok(SessionResponse::ok(guard.snapshot()))
}

/// PUT /api/v1/sessions/{session_id}/transform/preset - Coarse placement
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/transform/preset",
    tag = "design",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body = PresetRequest,
    responses(
        (status = 200, description = "Transform updated", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn set_preset(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PresetRequest>,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;

    let mut guard = session.lock();
    if let Some(class) = body.scale_class {
        guard.set_scale_class(class);
    }
    if let Some(anchor) = body.vertical_anchor {
        guard.set_vertical_anchor(anchor);
    }
    Ok(SessionResponse::ok(guard.snapshot()))
}

/// PUT /api/v1/sessions/{session_id}/transform/advanced - Fine placement
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/transform/advanced",
    tag = "design",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body = FineEdit,
    responses(
        (status = 200, description = "Transform updated, values clamped into range", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn apply_advanced(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<FineEdit>,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;

    let mut guard = session.lock();
    guard.apply_fine(&body);
    Ok(SessionResponse::ok(guard.snapshot()))
}

/// GET /api/v1/sessions/{session_id}/preview - Local composited preview
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}/preview",
    tag = "design",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "PNG preview; X-Preview-Outcome and X-Fit-Rect describe it", content_type = "image/png"),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "No template selected", body = ErrorResponse),
        (status = 503, description = "Template image unavailable", body = PreviewUnavailableResponse)
    )
)]
pub async fn preview(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;
    let request = session.lock().preview_request()?;

    let preview = state.compositor.compose(&state.loader, request).await;
    debug!(outcome = preview.outcome.as_str(), width = preview.width, height = preview.height, "Preview rendered");

    let png = match preview.png {
        Some(png) => png,
        None => {
            return Ok(HttpResponse::ServiceUnavailable()
                .insert_header(("X-Preview-Outcome", preview.outcome.as_str()))
                .json(PreviewUnavailableResponse { success: false, outcome: preview.outcome }));
        }
    };

    let mut response = HttpResponse::Ok();
    response
        .content_type("image/png")
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .insert_header(("X-Preview-Outcome", preview.outcome.as_str()));
    if let Some(fit) = preview.fit {
        response.insert_header(("X-Fit-Rect", fit.to_string()));
    }
    Ok(response.body(png))
}
