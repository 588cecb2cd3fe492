//! Gemini gateway (Google Generative Language API)
//!
//! Copy, brand-voice and moderation requests go to the text model;
//! moderation asks for a JSON reply. Visual requests go to the image model
//! with text and image response modalities, and the inline image comes back
//! as a `data:` URI. Each request is attempted once.

use crate::config::StudioConfig;
use crate::task::*;
use crea_board::{data_uri_from_base64, ModerationVerdict};
use crea_core::{CreaError, Result};
use serde_json::json;
use std::time::Duration;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini gateway for all four task kinds
pub struct GeminiGateway {
    api_key: String,
    api_url: String,
    text_model: String,
    image_model: String,
    timeout: Duration,
}

impl GeminiGateway {
    /// Create a new GeminiGateway from config
    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        let api_key = config
            .api_key("gemini")
            .ok_or_else(|| {
                CreaError::ConfigError(
                    "Gemini API key not configured. Set CREA_GEMINI_API_KEY or add to .crea/config.toml".to_string(),
                )
            })?
            .to_string();

        let api_url = config
            .api_url("gemini")
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            api_url,
            text_model: config.text_model("gemini").to_string(),
            image_model: config.image_model("gemini").to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs()),
        })
    }

    fn generate_content(&self, model: &str, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url, model, self.api_key
        );

        let agent = build_agent(self.timeout);
        let mut response = agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send_json(payload)
            .map_err(|e| {
                CreaError::GenerationError(format!("Gemini API request to {} failed: {}", model, e))
            })?;

        response.body_mut().read_json().map_err(|e| {
            CreaError::GenerationError(format!("Failed to parse Gemini response: {}", e))
        })
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}

impl Gateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    fn supported_kinds(&self) -> Vec<TaskKind> {
        TaskKind::all().to_vec()
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if self.api_key.is_empty() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let prompt = request.prompt();
        tracing::debug!(kind = %request.kind(), prompt_chars = prompt.len(), "gemini request");

        match request {
            GenerationRequest::Copy(_) => {
                let response = self.generate_content(&self.text_model, &text_payload(&prompt))?;
                Ok(GenerationOutput::Copy(CopyOutput {
                    marketing_copy: parse_text_response(&response)?,
                }))
            }
            GenerationRequest::BrandVoice(_) => {
                let response = self.generate_content(&self.text_model, &text_payload(&prompt))?;
                Ok(GenerationOutput::BrandVoice(BrandVoiceOutput {
                    adapted_content: parse_text_response(&response)?,
                }))
            }
            GenerationRequest::Visual(_) => {
                let response = self.generate_content(&self.image_model, &image_payload(&prompt))?;
                Ok(GenerationOutput::Visual(VisualOutput {
                    image_url: parse_image_response(&response)?,
                }))
            }
            GenerationRequest::Moderation(_) => {
                let response =
                    self.generate_content(&self.text_model, &moderation_payload(&prompt))?;
                let text = parse_text_response(&response)?;
                Ok(GenerationOutput::Moderation(parse_verdict(&text)?))
            }
        }
    }
}

pub fn text_payload(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
    })
}

pub fn moderation_payload(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseMimeType": "application/json" }
    })
}

pub fn image_payload(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
    })
}

fn candidate_parts(response: &serde_json::Value) -> Result<&Vec<serde_json::Value>> {
    if let Some(reason) = response
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(CreaError::GenerationError(format!(
            "Gemini blocked the prompt: {}",
            reason
        )));
    }

    response
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| CreaError::GenerationError("No candidate content in Gemini response".to_string()))
}

/// Concatenate the text parts of the first candidate
pub fn parse_text_response(response: &serde_json::Value) -> Result<String> {
    let text: String = candidate_parts(response)?
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(CreaError::GenerationError(
            "Gemini returned no text".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// The first inline image of the first candidate, as a `data:` URI
pub fn parse_image_response(response: &serde_json::Value) -> Result<String> {
    candidate_parts(response)?
        .iter()
        .filter_map(|part| part.get("inlineData"))
        .find_map(|inline| {
            let mime = inline.get("mimeType").and_then(|m| m.as_str())?;
            let data = inline.get("data").and_then(|d| d.as_str())?;
            Some(data_uri_from_base64(mime, data))
        })
        .ok_or_else(|| CreaError::GenerationError("Gemini returned no image".to_string()))
}

/// Parse a moderation verdict, tolerating a fenced code block around the JSON
pub fn parse_verdict(text: &str) -> Result<ModerationVerdict> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| {
        CreaError::GenerationError(format!("Invalid moderation verdict: {}", e))
    })
}
