//! The relay endpoint.
//!
//! - `OPTIONS` — preflight answer, `204` or `403`, body never read
//! - `POST` — origin gate, body cap, shape validation, verify, deliver
//! - anything else — `405` with `Allow: POST, OPTIONS`
//!
//! Every response carries the cross-origin headers resolved for the caller.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, FailedToBufferBody};
use axum::extract::{FromRequest, Request, State};
use axum::http::header::{ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::warn;

use formrelay_core::Submission;

use crate::cors::CorsDecision;
use crate::envelope::Envelope;
use crate::error::AppError;
use crate::state::AppState;

/// Message returned when a submission was delivered.
pub const SUCCESS_MESSAGE: &str = "Form submitted successfully.";

/// Entry point for every request, whatever the path.
pub async fn relay_entry(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let cors = state.origins.resolve(request.headers().get(ORIGIN));

    if request.method() == Method::OPTIONS {
        return preflight(&cors, &request);
    }

    let mut response = match submit(&state, &cors, request).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(err) => err.into_response(),
    };
    cors.apply(response.headers_mut());
    response
}

fn preflight(cors: &CorsDecision, request: &Request) -> Response {
    let status = if cors.allowed {
        StatusCode::NO_CONTENT
    } else {
        warn!(origin = ?request.headers().get(ORIGIN), "preflight from forbidden origin");
        StatusCode::FORBIDDEN
    };

    let mut response = status.into_response();
    cors.apply_preflight(
        response.headers_mut(),
        request.headers().get(ACCESS_CONTROL_REQUEST_HEADERS),
    );
    response
}

async fn submit(
    state: &AppState,
    cors: &CorsDecision,
    request: Request,
) -> Result<Envelope, AppError> {
    if !cors.allowed {
        warn!(origin = ?request.headers().get(ORIGIN), "request from forbidden origin");
        return Err(AppError::ForbiddenOrigin);
    }

    if request.method() != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let bytes = Bytes::from_request(request, &()).await.map_err(|rejection| match rejection {
        BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
            AppError::PayloadTooLarge
        }
        other => {
            warn!(error = %other, "failed to read request body");
            AppError::UnreadableBody
        }
    })?;
    let payload: Value = serde_json::from_slice(&bytes).map_err(|_| AppError::InvalidJson)?;
    let submission = Submission::from_payload(&payload, state.validation)?;

    state.relay.submit(&submission).await?;
    Ok(Envelope::success(SUCCESS_MESSAGE))
}
