//! Session lifecycle and template context endpoints

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::session::{SessionSnapshot, SharedSession};
use super::error::{ApiFailure, ErrorResponse};

/// Response wrapping a session snapshot
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub session: SessionSnapshot,
}

impl SessionResponse {
    pub fn ok(session: SessionSnapshot) -> HttpResponse {
        HttpResponse::Ok().json(SessionResponse { success: true, session })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectTemplateRequest {
    /// Catalog template ID
    pub template_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectProviderRequest {
    /// Fulfilment provider code (e.g., "printful")
    pub provider_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectVariantsRequest {
    pub variant_ids: Vec<String>,
}

/// Look up a session or fail with SESSION_NOT_FOUND
pub fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, ApiFailure> {
    state.sessions.get(&id).ok_or(ApiFailure::SessionNotFound(id))
}

/// POST /api/v1/sessions - Start an editing session
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = SessionResponse)
    )
)]
pub async fn create_session(state: web::Data<AppState>) -> HttpResponse {
    let session = state.sessions.create();
    let snapshot = session.lock().snapshot();
    HttpResponse::Created().json(SessionResponse { success: true, session: snapshot })
}

/// GET /api/v1/sessions/{session_id}
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;
    let snapshot = session.lock().snapshot();
    Ok(SessionResponse::ok(snapshot))
}

/// DELETE /api/v1/sessions/{session_id}
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiFailure> {
    let id = path.into_inner();
    if !state.sessions.remove(&id) {
        return Err(ApiFailure::SessionNotFound(id));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/v1/sessions/{session_id}/template - Select a product template
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/template",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body = SelectTemplateRequest,
    responses(
        (status = 200, description = "Template selected, downstream state reset", body = SessionResponse),
        (status = 404, description = "Session or template not found", body = ErrorResponse),
        (status = 502, description = "Catalog unavailable", body = ErrorResponse)
    )
)]
pub async fn select_template(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SelectTemplateRequest>,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;

    let template = state.catalog
        .template(&body.template_id)
        .await
        .map_err(|e| ApiFailure::from_catalog(&body.template_id, e))?;

    info!(template_id = %template.id, title = %template.title, "Selecting template");

    let mut guard = session.lock();
    guard.select_template(template);
    Ok(SessionResponse::ok(guard.snapshot()))
}

/// PUT /api/v1/sessions/{session_id}/provider - Switch fulfilment provider
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/provider",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body = SelectProviderRequest,
    responses(
        (status = 200, description = "Provider selected, mockups discarded", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "No template selected", body = ErrorResponse)
    )
)]
pub async fn select_provider(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SelectProviderRequest>,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;

    let template_id = session.lock()
        .template()
        .map(|t| t.id.clone())
        .ok_or(crate::session::SessionError::NoTemplate)?;

    let variants = state.catalog
        .variants(&template_id, &body.provider_id)
        .await
        .map_err(|e| ApiFailure::from_catalog(&template_id, e))?;

    let mut guard = session.lock();
    guard.select_provider(&body.provider_id, variants)?;
    Ok(SessionResponse::ok(guard.snapshot()))
}

/// PUT /api/v1/sessions/{session_id}/variants - Choose variants to render
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/variants",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body = SelectVariantsRequest,
    responses(
        (status = 200, description = "Variants selected", body = SessionResponse),
        (status = 409, description = "Empty or unknown variant selection", body = ErrorResponse)
    )
)]
pub async fn select_variants(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SelectVariantsRequest>,
) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;
    let body = body.into_inner();

    let mut guard = session.lock();
    guard.select_variants(body.variant_ids)?;
    Ok(SessionResponse::ok(guard.snapshot()))
}

/// GET /api/v1/sessions/{session_id}/selection - Inputs for product assembly
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}/selection",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Selected mockup, set, transform and profile", body = crate::session::ProductSelection),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn get_selection(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(&state, path.into_inner())?;
    let selection = session.lock().selection();
    Ok(HttpResponse::Ok().json(selection))
}
