// ============================================
// Gemini LLM Provider
// ============================================
//
// Thin client for the Gemini `generateContent` endpoint. Prompts are plain
// text; the first text part of the first candidate is returned. The API key
// travels in the `x-goog-api-key` header and never appears in a URL or error.

use super::{OracleError, Result};
use crate::config::OracleConfig;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name, for logs
    fn name(&self) -> &'static str;
}

pub struct GeminiProvider {
    client: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, config: &OracleConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| OracleError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn request(&self, prompt: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&GenerateContentRequest::from_prompt(prompt))
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(OracleError::EmptyResponse)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .request(prompt)
            .send()
            .await
            .map_err(|e| OracleError::Request(format!("Gemini API error: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(e.without_url().to_string()))?;

        let text = result.into_text()?;
        debug!(model = %self.model, reply_len = text.len(), "Gemini completion received");
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
