//! Authoritative mockup generation endpoint

use std::time::Instant;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::session::{CommitOutcome, GenerationTicket, SessionSnapshot, SharedSession};
use super::error::{ApiFailure, ErrorResponse};
use super::sessions::find_session;

/// Response for a generation request
#[derive(Serialize, ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    /// `committed`, or why the result was dropped
    pub outcome: CommitOutcome,
    pub generation_time_ms: u64,
    pub session: SessionSnapshot,
}

/// Ends the loading state if the request future is dropped before the
/// pipeline returns (client disconnect, timeout).
struct InFlight {
    session: SharedSession,
    ticket: GenerationTicket,
    armed: bool,
}

impl InFlight {
    fn new(session: SharedSession, ticket: GenerationTicket) -> Self {
        InFlight { session, ticket, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.armed {
            let outcome = self.session.lock().abandon_generation(self.ticket);
            warn!(sequence = self.ticket.sequence, outcome = ?outcome, "Generation request dropped in flight");
        }
    }
}

/// POST /api/v1/sessions/{session_id}/generate - Request authoritative mockups
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/generate",
    tag = "mockups",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Mockups generated, or the result was superseded", body = GenerateResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Missing template, design or variants", body = ErrorResponse),
        (status = 502, description = "Asset hosting or generation failed; previous mockups kept", body = ErrorResponse)
    )
)]
pub async fn generate_mockups(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiFailure> {
    let start = Instant::now();
    let session = find_session(&state, path.into_inner())?;

    let pending = session.lock().begin_generation()?;
    let ticket = pending.ticket;

    info!(
        template_id = %pending.job.template_id,
        variants = pending.job.variants.len(),
        sequence = ticket.sequence,
        "Processing mockup generation request"
    );

    let mut in_flight = InFlight::new(session.clone(), ticket);
    let result = state.pipeline.run(pending.job).await;
    in_flight.disarm();
    let elapsed = start.elapsed().as_millis() as u64;

    let mut guard = session.lock();
    let outcome = match result {
        Ok(output) => guard.commit_generation(ticket, output),
        Err(e) => {
            let outcome = guard.fail_generation(ticket, e.to_string());
            if outcome == CommitOutcome::Committed {
                error!(error = %e, generation_time_ms = elapsed, "Mockup generation failed");
                return Err(e.into());
            }
            outcome
        }
    };

    info!(outcome = ?outcome, generation_time_ms = elapsed, "Mockup generation finished");

    Ok(HttpResponse::Ok().json(GenerateResponse {
        success: outcome == CommitOutcome::Committed,
        outcome,
        generation_time_ms: elapsed,
        session: guard.snapshot(),
    }))
}
