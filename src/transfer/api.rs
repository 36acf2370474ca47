//! Webhook endpoints for daemon transfer callbacks
//!
//! The daemon agents report the outcome of a transfer by POSTing to these
//! endpoints with no body. Both respond 204 No Content on success.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::gateway::state::AppState;

use super::error::TransferError;

/// Error body returned by the webhook endpoints
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub msg: String,
}

fn error_response(e: &TransferError) -> (StatusCode, Json<ErrorBody>) {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(error = %e, "Transfer transition failed");
    }

    (
        status,
        Json(ErrorBody {
            code: e.code(),
            msg: e.to_string(),
        }),
    )
}

fn parse_uuid(raw: &str) -> Result<Uuid, TransferError> {
    // An unparseable identifier cannot name a known server
    raw.parse().map_err(|_| TransferError::NotFound)
}

/// `POST /api/remote/servers/{uuid}/transfer/failure`
///
/// The daemon notifies us about a transfer failure.
pub async fn transfer_failure(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> Response {
    let result = async {
        let uuid = parse_uuid(&uuid)?;
        state.engine.report_failure(uuid).await
    }
    .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// `POST /api/remote/servers/{uuid}/transfer/success`
///
/// The daemon notifies us about a transfer success.
pub async fn transfer_success(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> Response {
    let result = async {
        let uuid = parse_uuid(&uuid)?;
        state.engine.report_success(uuid).await
    }
    .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
