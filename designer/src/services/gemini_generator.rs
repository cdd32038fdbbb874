//! Gemini-backed design text generator

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

use shared::ApiFailure;

use crate::config::DesignerConfig;
use crate::error::{DesignerError, DesignerResult};
use crate::services::{http_client, transport_failure};
use crate::traits::DesignTextGenerator;

/// Calls the Gemini `generateContent` endpoint
pub struct GeminiDesignGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiDesignGenerator {
    pub fn new(api_key: String, model: String, base_url: String, timeout: Duration) -> DesignerResult<Self> {
        let client = http_client(timeout)
            .map_err(|e| DesignerError::config(format!("Failed to build generator HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &DesignerConfig) -> DesignerResult<Self> {
        Self::new(
            config.generator_api_key.clone(),
            config.generator_model.clone(),
            config.generator_base_url.clone(),
            config.request_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl DesignTextGenerator for GeminiDesignGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ApiFailure> {
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        {
                            "text": prompt
                        }
                    ]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": 2048,
                "temperature": 0.7
            }
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiFailure::from_status(status.as_u16(), status.to_string()));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiFailure::InvalidResponse(format!("Failed to parse response: {e}")))?;

        if let Some(reason) = response_json
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(|reason| reason.as_str())
        {
            return Err(ApiFailure::InvalidResponse(format!("Prompt blocked: {reason}")));
        }

        let text: String = response_json
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .map(|parts| parts.iter().filter_map(|part| part.get("text").and_then(|t| t.as_str())).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ApiFailure::InvalidResponse("No content in response".to_string()));
        }

        debug!(
            model = %self.model,
            elapsed_ms = request_start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Design text generated"
        );
        Ok(text)
    }
}
