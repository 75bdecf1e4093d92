use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{config::AdviceConfig, upstream::truncate_body};

use super::{GenerationFailure, TextGenerator};

/// Text generator backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiGenerator {
    /// Point the generator at another endpoint (tests, proxies).
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self { api_key, model, base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }

    /// Build from config; `None` when no API key is configured.
    pub fn from_config(config: &AdviceConfig) -> Option<Self> {
        let api_key = config.configured_key()?;
        Some(Self::with_base_url(
            api_key.to_string(),
            config.model.clone(),
            config.endpoint.clone(),
        ))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, or empty when any link is missing.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationFailure> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };

        tracing::debug!(model = %self.model, "requesting advice completion");

        let res = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationFailure::Transport(e.to_string()))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| GenerationFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationFailure::Status(status.as_u16(), truncate_body(&text)));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| GenerationFailure::Decode(e.to_string()))?;

        Ok(parsed.into_text())
    }
}
