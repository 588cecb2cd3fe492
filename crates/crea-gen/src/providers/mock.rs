//! Mock gateway for offline use and testing
//!
//! Produces text derived from the request parameters, solid-color PNG data
//! URIs for visuals, and keyword-based moderation verdicts without any
//! network calls. A scripted mode answers from a queue instead and records
//! every request it sees.

use crate::task::*;
use crea_board::{encode_data_uri, ModerationVerdict};
use crea_core::{CreaError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;

const MOCK_IMAGE_SIZE: u32 = 64;

/// Phrases the mock moderator treats as sensitive
const SENSITIVE_TERMS: &[&str] = &[
    "only for men",
    "only for women",
    "like a girl",
    "too old",
    "young people only",
    "exotic",
    "primitive",
    "third world",
];

/// A gateway that answers locally
#[derive(Default)]
pub struct MockGateway {
    script: Option<Mutex<VecDeque<Result<GenerationOutput>>>>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that returns `outcomes` in order, one per call. Once the
    /// queue is empty every call fails.
    pub fn scripted(outcomes: Vec<Result<GenerationOutput>>) -> Self {
        Self {
            script: Some(Mutex::new(outcomes.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, oldest first
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn next_scripted(script: &Mutex<VecDeque<Result<GenerationOutput>>>) -> Result<GenerationOutput> {
        let mut queue = script
            .lock()
            .map_err(|_| CreaError::GenerationError("Mock script lock poisoned".to_string()))?;
        queue.pop_front().unwrap_or_else(|| {
            Err(CreaError::GenerationError(
                "Mock script exhausted".to_string(),
            ))
        })
    }
}

impl Gateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    fn supported_kinds(&self) -> Vec<TaskKind> {
        TaskKind::all().to_vec()
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        tracing::debug!(kind = %request.kind(), "mock generation");

        if let Some(script) = &self.script {
            return Self::next_scripted(script);
        }

        match request {
            GenerationRequest::Copy(p) => Ok(GenerationOutput::Copy(CopyOutput {
                marketing_copy: mock_copy(p),
            })),
            GenerationRequest::BrandVoice(p) => Ok(GenerationOutput::BrandVoice(BrandVoiceOutput {
                adapted_content: mock_adaptation(p),
            })),
            GenerationRequest::Visual(p) => Ok(GenerationOutput::Visual(VisualOutput {
                image_url: mock_visual(p)?,
            })),
            GenerationRequest::Moderation(p) => Ok(GenerationOutput::Moderation(mock_verdict(p))),
        }
    }
}

fn mock_copy(p: &CopyParams) -> String {
    let label = crate::prompt::COPY_TYPES
        .iter()
        .find(|c| c.value == p.prompt_template)
        .map(|c| c.label)
        .unwrap_or("Copy");
    format!(
        "{}: {} ({} for {} on {})",
        p.product_name, p.product_description, label, p.audience, p.platform
    )
}

fn mock_adaptation(p: &BrandVoiceParams) -> String {
    let tone = p.brand_guidelines.lines().next().unwrap_or_default().trim();
    format!("{} [voice: {}]", p.content_to_adapt.trim(), tone)
}

/// Solid-color PNG whose color is derived from the prompt
fn mock_visual(p: &VisualParams) -> Result<String> {
    let seed = format!("{}|{}|{}", p.prompt, p.style_preferences, p.layout_hints);
    let hash_val = seed
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let r = ((hash_val >> 16) & 0xFF) as u8;
    let g = ((hash_val >> 8) & 0xFF) as u8;
    let b = (hash_val & 0xFF) as u8;

    let img = RgbaImage::from_pixel(MOCK_IMAGE_SIZE, MOCK_IMAGE_SIZE, image::Rgba([r, g, b, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CreaError::GenerationError(format!("Failed to encode PNG: {}", e)))?;

    Ok(encode_data_uri("image/png", &bytes))
}

fn mock_verdict(p: &ModerationParams) -> ModerationVerdict {
    let lowered = p.text.to_lowercase();
    match SENSITIVE_TERMS.iter().find(|term| lowered.contains(*term)) {
        Some(term) => ModerationVerdict {
            is_sensitive: true,
            reason: format!("The phrase \"{}\" may read as exclusionary or stereotyping.", term),
        },
        None => ModerationVerdict {
            is_sensitive: false,
            reason: "No cultural, gender or racial sensitivity issues found.".to_string(),
        },
    }
}
