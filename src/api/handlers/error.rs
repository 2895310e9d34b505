//! Error bodies shared by every handler

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pipeline::PipelineError;
use crate::providers::ProviderError;
use crate::session::SessionError;

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Serialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Handler failures, rendered as `ErrorResponse` bodies
#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error("Session '{0}' does not exist")]
    SessionNotFound(Uuid),

    #[error("Template '{0}' does not exist")]
    TemplateNotFound(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Invalid design: {0}")]
    InvalidDesign(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiFailure {
    /// Catalog lookups: a missing template is the caller's problem, anything
    /// else is the catalog's
    pub fn from_catalog(template_id: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(_) => ApiFailure::TemplateNotFound(template_id.to_string()),
            other => ApiFailure::CatalogUnavailable(other.to_string()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiFailure::SessionNotFound(_) => "SESSION_NOT_FOUND",
            ApiFailure::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            ApiFailure::CatalogUnavailable(_) => "CATALOG_UNAVAILABLE",
            ApiFailure::InvalidDesign(_) => "INVALID_DESIGN",
            ApiFailure::Session(e) => match e {
                SessionError::NoTemplate => "NO_TEMPLATE_SELECTED",
                SessionError::NoTemplateImage => "TEMPLATE_NOT_FOUND",
                SessionError::NoDesign => "NO_DESIGN",
                SessionError::NoVariantsSelected => "NO_VARIANTS_SELECTED",
                SessionError::UnknownVariant(_) => "UNKNOWN_VARIANT",
            },
            ApiFailure::Pipeline(e) => match e {
                PipelineError::AssetHosting(_) => "ASSET_HOSTING_FAILED",
                PipelineError::Generation(_) | PipelineError::InvalidRequest(_) => "GENERATION_FAILED",
            },
        }
    }
}

impl ResponseError for ApiFailure {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiFailure::SessionNotFound(_) | ApiFailure::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            ApiFailure::CatalogUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiFailure::InvalidDesign(_) => StatusCode::BAD_REQUEST,
            ApiFailure::Session(SessionError::NoTemplateImage) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiFailure::Session(_) => StatusCode::CONFLICT,
            ApiFailure::Pipeline(PipelineError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiFailure::Pipeline(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(code = self.code(), error = %self, "Request failed");
        }

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error: ApiError {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        })
    }
}
