//! `/verify` decision handler.
//!
//! Parse the asserted key, fetch the daemon's current peers, answer with
//! `{"Allow": bool}`. Malformed input is answered with a bare 404 before the
//! daemon is ever queried.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use peerverify_core::{VerifyRequest, VerifyResponse};
use peerverify_logging::DecisionEvent;
use peerverify_status::known_keys;

use crate::server::GatewayState;

/// Non-decision outcomes of a verify call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Wrong method, unreadable body, or missing fields.
    NotFound,
    /// The mesh daemon could not be queried. Distinct from a deny.
    StatusUnavailable,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::NotFound => (StatusCode::NOT_FOUND, "404: Not Found").into_response(),
            Rejection::StatusUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "503: Service Unavailable").into_response()
            }
        }
    }
}

/// Handler for `/verify`.
pub async fn verify(
    State(state): State<GatewayState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<VerifyResponse>, Rejection> {
    if method != Method::POST {
        return Err(Rejection::NotFound);
    }

    let body = body.map_err(|e| {
        debug!(error = %e, "Unreadable verify body");
        Rejection::NotFound
    })?;

    let request = VerifyRequest::parse(&body).map_err(|e| {
        debug!(error = %e, "Rejecting verify request");
        Rejection::NotFound
    })?;

    let keys = known_keys(state.source.as_ref()).await.map_err(|e| {
        state.audit.record(DecisionEvent::status_unavailable(&e));
        Rejection::StatusUnavailable
    })?;

    let allow = keys.contains(&request.node_public);
    let event = if allow {
        DecisionEvent::allowed(&request)
    } else {
        DecisionEvent::denied(&request)
    };
    state.audit.record(event);

    Ok(Json(VerifyResponse { allow }))
}

/// Fallback for every other path.
pub async fn not_found() -> Rejection {
    Rejection::NotFound
}
