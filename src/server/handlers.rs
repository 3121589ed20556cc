use axum::extract::{rejection::JsonRejection, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::aggregate::TripOutcome;
use crate::engine::{EngineError, ShadeRequest};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody { error: self.1 };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── POST /api/shade ─────────────────────────────────────────────

pub async fn shade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ShadeRequest>, JsonRejection>,
) -> Result<Json<TripOutcome>, ApiError> {
    let start = Instant::now();

    let Json(request) =
        payload.map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;

    // The engine does blocking provider I/O; keep it off the async workers.
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || engine.estimate(&request))
        .await
        .map_err(|e| {
            error!("estimation task panicked: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

    match result {
        Ok(outcome) => {
            info!(
                "POST /api/shade -> sun {} / shade {} ({:.1}ms)",
                outcome.sun_side.map_or("none", |s| s.as_str()),
                outcome.shade_side.map_or("none", |s| s.as_str()),
                start.elapsed().as_secs_f64() * 1000.0,
            );
            Ok(Json(outcome))
        }
        Err(EngineError::Validation(msg)) => Err(api_error(StatusCode::BAD_REQUEST, msg)),
        Err(EngineError::Provider(e)) => {
            error!("provider failure: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))
        }
    }
}
