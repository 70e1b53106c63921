//! ElevenLabs-compatible streaming synthesis driver.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use crate::error::{ApiError, ApiResult};
use crate::synthesis::{AudioStream, SynthesisDriver, SynthesisRequest, SynthesisSettings};

/// Driver for the ElevenLabs streaming text-to-speech API.
#[derive(Debug, Clone)]
pub struct ElevenLabsDriver {
    settings: SynthesisSettings,
    client: Client,
}

impl ElevenLabsDriver {
    /// Create a new driver. The client is reused across concurrent requests.
    pub fn new(settings: SynthesisSettings) -> ApiResult<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build HTTP client: {e}")))?;

        Ok(Self { settings, client })
    }

    /// Build the streaming endpoint URL for a voice.
    fn stream_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}/stream?output_format={}",
            self.settings.base_url.trim_end_matches('/'),
            voice_id,
            self.settings.output_format
        )
    }
}

#[async_trait]
impl SynthesisDriver for ElevenLabsDriver {
    async fn stream(&self, req: SynthesisRequest) -> ApiResult<AudioStream> {
        let voice_id = req
            .voice_id
            .unwrap_or_else(|| self.settings.default_voice_id.clone());

        let api_key = self.settings.api_key.as_deref().unwrap_or_default();

        let body = serde_json::json!({
            "text": req.text,
            "model_id": self.settings.model_id,
        });

        let response = self
            .client
            .post(self.stream_url(&voice_id))
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream {
                detail: format!("Failed to reach synthesis provider: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                detail: format!("Synthesis provider error ({status}): {text}"),
            });
        }

        tracing::debug!(voice_id = %voice_id, "Upstream synthesis stream opened");

        // Forward bytes as they arrive. Dropping the stream cancels the
        // upstream request.
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| anyhow::anyhow!("Synthesis stream error: {e}")));

        Ok(Box::pin(stream))
    }

    fn settings(&self) -> &SynthesisSettings {
        &self.settings
    }
}
