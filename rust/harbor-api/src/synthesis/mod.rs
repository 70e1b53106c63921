//! Speech synthesis driver abstraction.
//!
//! The [`SynthesisDriver`] trait defines the streaming interface the relay
//! consumes: text in, live audio byte stream out. Provider implementations
//! live in [`providers`].

pub mod providers;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// A live audio byte stream from an upstream provider.
///
/// Bytes are forwarded verbatim and in order; an `Err` item means the
/// upstream failed after the stream opened.
pub type AudioStream = Pin<Box<dyn Stream<Item = anyhow::Result<Bytes>> + Send>>;

/// Upstream synthesis connection and model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Base URL for the provider API.
    pub base_url: String,
    /// API key for authentication. Requests fail with 401 when absent.
    pub api_key: Option<String>,
    /// Voice used when the request does not name one.
    pub default_voice_id: String,
    /// Synthesis model identifier.
    pub model_id: String,
    /// Audio output encoding.
    pub output_format: String,
    /// Bound on how long opening the upstream stream may hang.
    pub connect_timeout_secs: u64,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: None,
            default_voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
            output_format: "mp3_44100_128".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

/// A synthesis request: text plus an optional voice override.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: Option<String>,
}

/// Streaming text-to-speech driver.
#[async_trait]
pub trait SynthesisDriver: Send + Sync {
    /// Open a live audio stream for the given text.
    ///
    /// Fails with `ApiError::Upstream` when the stream cannot be opened;
    /// failures after opening surface as `Err` items on the stream.
    async fn stream(&self, req: SynthesisRequest) -> ApiResult<AudioStream>;

    /// Connection settings, shared across concurrent requests.
    fn settings(&self) -> &SynthesisSettings;
}
