//! Mockup gallery navigation

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::session::GallerySnapshot;
use super::error::{ApiFailure, ErrorResponse};
use super::sessions::find_session;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectMockupRequest {
    /// Clamped into the bounds of the current set
    pub index: usize,
}

#[derive(Serialize, ToSchema)]
pub struct GalleryResponse {
    pub success: bool,
    pub gallery: GallerySnapshot,
}

enum Step {
    To(usize),
    Next,
    Previous,
}

fn navigate(state: &AppState, id: Uuid, step: Step) -> Result<HttpResponse, ApiFailure> {
    let session = find_session(state, id)?;
    let mut guard = session.lock();
    match step {
        Step::To(index) => guard.select_mockup(index),
        Step::Next => guard.next_mockup(),
        Step::Previous => guard.previous_mockup(),
    };
    Ok(HttpResponse::Ok().json(GalleryResponse {
        success: true,
        gallery: guard.snapshot().gallery,
    }))
}

/// POST /api/v1/sessions/{session_id}/gallery/select
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/gallery/select",
    tag = "gallery",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body = SelectMockupRequest,
    responses(
        (status = 200, description = "Selection updated", body = GalleryResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn select_mockup(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SelectMockupRequest>,
) -> Result<HttpResponse, ApiFailure> {
    navigate(&state, path.into_inner(), Step::To(body.index))
}

/// POST /api/v1/sessions/{session_id}/gallery/next
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/gallery/next",
    tag = "gallery",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Moved forward, wrapping at the end", body = GalleryResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn next_mockup(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiFailure> {
    navigate(&state, path.into_inner(), Step::Next)
}

/// POST /api/v1/sessions/{session_id}/gallery/previous
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/gallery/previous",
    tag = "gallery",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Moved back, wrapping at the start", body = GalleryResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn previous_mockup(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiFailure> {
    navigate(&state, path.into_inner(), Step::Previous)
}
