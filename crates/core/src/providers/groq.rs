use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::ChatProvider;
use crate::errors::CoreError;
use crate::models::chat::ChatMessage;
use crate::models::settings::ChatSettings;

const PROVIDER: &str = "Groq";

/// Groq chat completions through its OpenAI-compatible endpoint.
///
/// - **Auth**: bearer API key (`GROQ_API_KEY`).
/// - **Endpoint**: `POST {base_url}/chat/completions`
/// - Any OpenAI-compatible server works by pointing `base_url` at it.
#[derive(Debug)]
pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqProvider {
    /// Build a provider from chat settings. Fails if no API key is configured.
    pub fn from_settings(settings: &ChatSettings) -> Result<Self, CoreError> {
        let api_key = settings.api_key.clone().ok_or(CoreError::MissingApiKey)?;

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.timeout_secs));

        Ok(Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

// ── Completion API request/response types ───────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChatProvider for GroqProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CoreError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {}: {message}", status.as_u16()),
            });
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse completion response: {e}"),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CoreError::Api {
                provider: PROVIDER.into(),
                message: "Completion response contained no message".into(),
            })
    }
}
