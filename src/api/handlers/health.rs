//! Health check endpoint

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// Catalog provider code
    pub catalog: &'static str,
    pub active_sessions: usize,
    pub cached_images: usize,
    pub hosted_designs: usize,
}

/// GET /health - Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        catalog: state.catalog.code(),
        active_sessions: state.sessions.len(),
        cached_images: state.loader.cached_count(),
        hosted_designs: state.pipeline.hosted_count(),
    };

    HttpResponse::Ok().json(response)
}
