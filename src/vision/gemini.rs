use async_trait::async_trait;
use base64::Engine as _;

use crate::errors::{GazeError, GazeResult};

/// External vision-grounding service: screenshot + prompt in, answer text out.
#[async_trait]
pub trait GroundingClient: Send + Sync {
    async fn locate(&self, image_png: &[u8], prompt: &str) -> GazeResult<String>;
}

/// Gemini `generateContent` REST client. Stateless; safe to share because
/// workflow execution never issues concurrent calls.
pub struct GeminiClient {
    api_base: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_base: String, model: String, api_key: String) -> Self {
        Self {
            api_base,
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GroundingClient for GeminiClient {
    async fn locate(&self, image_png: &[u8], prompt: &str) -> GazeResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "image/png",
                            "data": base64::engine::general_purpose::STANDARD.encode(image_png),
                        }
                    },
                    { "text": prompt },
                ]
            }]
        });

        tracing::debug!(model = %self.model, image_bytes = image_png.len(), "sending grounding request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let value: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = value["error"]["message"]
                .as_str()
                .unwrap_or("unknown API error");
            return Err(GazeError::Grounding(format!("{status}: {message}")));
        }

        value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| GazeError::Grounding(format!("no text in response: {value}")))
    }
}
