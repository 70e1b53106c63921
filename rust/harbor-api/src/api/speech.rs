//! Streaming speech synthesis relay.
//!
//! The handler either fails before committing the response (structured
//! JSON error via [`ApiError`]) or commits `200 audio/mpeg` and hands the
//! upstream byte stream to the response body. A mid-stream upstream error
//! then surfaces as a body stream error, which terminates the connection
//! without touching the committed status line or appending a JSON trailer.
//! The two failure paths cannot mix; the headers-sent guard is the type of
//! the return value.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::synthesis::SynthesisRequest;
use crate::AppState;

/// Create the speech router. Non-POST methods get a 405 from axum.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/speech", post(synthesize))
}

/// Speech synthesis request.
#[derive(Debug, Deserialize)]
struct SpeechRequest {
    /// Text to synthesize.
    text: Option<String>,
    /// Optional voice identifier; the configured default is used when
    /// absent.
    path: Option<String>,
}

/// Relay a live audio stream from the upstream synthesis provider.
async fn synthesize(
    State(state): State<AppState>,
    Json(req): Json<SpeechRequest>,
) -> ApiResult<Response> {
    // Validating: both rejections happen before any upstream connection.
    let text = match req.text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(ApiError::validation("Text is required")),
    };
    if state.synthesizer.settings().api_key.is_none() {
        return Err(ApiError::Unauthorized("API key not configured".into()));
    }

    // StreamOpening: an open failure is still reportable as JSON.
    let stream = state
        .synthesizer
        .stream(SynthesisRequest {
            text,
            voice_id: req.path,
        })
        .await?;

    // Streaming: framing commits here. The body pulls upstream bytes on
    // demand, so a slow or vanished client exerts backpressure and a
    // dropped body cancels the upstream request.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build response: {e}")))?;

    Ok(response)
}
