//! Gateway trait and request/output types

use crea_board::{AssetType, ModerationVerdict};
use crea_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of generation task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Copy,
    BrandVoice,
    Visual,
    Moderation,
}

impl TaskKind {
    pub fn all() -> [TaskKind; 4] {
        [
            TaskKind::Copy,
            TaskKind::BrandVoice,
            TaskKind::Visual,
            TaskKind::Moderation,
        ]
    }

    /// Board asset type produced by committing this task's result
    pub fn asset_type(&self) -> AssetType {
        match self {
            TaskKind::Copy => AssetType::Copy,
            TaskKind::BrandVoice => AssetType::BrandVoice,
            TaskKind::Visual => AssetType::Visual,
            TaskKind::Moderation => AssetType::Moderation,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Copy => write!(f, "copy"),
            TaskKind::BrandVoice => write!(f, "brand_voice"),
            TaskKind::Visual => write!(f, "visual"),
            TaskKind::Moderation => write!(f, "moderation"),
        }
    }
}

/// Parameters for marketing copy generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyParams {
    /// One of the copy types in [`crate::prompt::COPY_TYPES`]
    pub prompt_template: String,
    pub audience: String,
    pub platform: String,
    pub product_name: String,
    pub product_description: String,
}

/// Parameters for adapting content to a brand voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandVoiceParams {
    pub brand_guidelines: String,
    pub content_to_adapt: String,
}

/// Parameters for visual mockup generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualParams {
    pub prompt: String,
    pub style_preferences: String,
    /// One of the layout styles in [`crate::prompt::LAYOUT_STYLES`]
    pub layout_hints: String,
}

/// Parameters for a content moderation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationParams {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyOutput {
    pub marketing_copy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandVoiceOutput {
    pub adapted_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualOutput {
    /// Opaque image reference: a `data:` URI or a URL
    pub image_url: String,
}

/// A request sent through the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum GenerationRequest {
    Copy(CopyParams),
    BrandVoice(BrandVoiceParams),
    Visual(VisualParams),
    Moderation(ModerationParams),
}

impl GenerationRequest {
    pub fn kind(&self) -> TaskKind {
        match self {
            GenerationRequest::Copy(_) => TaskKind::Copy,
            GenerationRequest::BrandVoice(_) => TaskKind::BrandVoice,
            GenerationRequest::Visual(_) => TaskKind::Visual,
            GenerationRequest::Moderation(_) => TaskKind::Moderation,
        }
    }

    /// The filled prompt template for this request
    pub fn prompt(&self) -> String {
        crate::prompt::build_prompt(self)
    }
}

/// What the gateway returned for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "output", rename_all = "snake_case")]
pub enum GenerationOutput {
    Copy(CopyOutput),
    BrandVoice(BrandVoiceOutput),
    Visual(VisualOutput),
    Moderation(ModerationVerdict),
}

impl GenerationOutput {
    pub fn kind(&self) -> TaskKind {
        match self {
            GenerationOutput::Copy(_) => TaskKind::Copy,
            GenerationOutput::BrandVoice(_) => TaskKind::BrandVoice,
            GenerationOutput::Visual(_) => TaskKind::Visual,
            GenerationOutput::Moderation(_) => TaskKind::Moderation,
        }
    }
}

/// Status returned by a gateway health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    Unavailable(String),
    NoApiKey,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Available => write!(f, "available"),
            ProviderStatus::Unavailable(reason) => write!(f, "unavailable ({})", reason),
            ProviderStatus::NoApiKey => write!(f, "no API key"),
        }
    }
}

/// Trait implemented by each generative backend (Gemini, Mock)
pub trait Gateway: Send + Sync {
    /// Provider name (e.g. "gemini", "mock")
    fn name(&self) -> &str;

    /// Task kinds this provider can serve
    fn supported_kinds(&self) -> Vec<TaskKind>;

    /// Check if the provider is usable (API key set, service configured)
    fn health_check(&self) -> Result<ProviderStatus>;

    /// Run one generation request. Blocks until the backend answers or fails.
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = GenerationRequest::Moderation(ModerationParams {
            text: "Is this okay to post?".to_string(),
        });
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "moderation");
        assert_eq!(json["params"]["text"], "Is this okay to post?");
        assert_eq!(request.kind(), TaskKind::Moderation);
    }

    #[test]
    fn test_copy_params_use_camel_case() {
        let params = CopyParams {
            prompt_template: "Generate a catchy tagline.".to_string(),
            audience: "Shoppers".to_string(),
            platform: "Instagram".to_string(),
            product_name: "Acme".to_string(),
            product_description: "Widgets for everyone".to_string(),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["productName"], "Acme");
        assert_eq!(json["promptTemplate"], "Generate a catchy tagline.");
    }

    #[test]
    fn test_moderation_output_shape() {
        let output: GenerationOutput = serde_json::from_str(
            r#"{"kind":"moderation","output":{"isSensitive":true,"reason":"Ageist phrasing"}}"#,
        )
        .unwrap();
        assert_eq!(output.kind(), TaskKind::Moderation);
        assert_eq!(
            output,
            GenerationOutput::Moderation(ModerationVerdict {
                is_sensitive: true,
                reason: "Ageist phrasing".to_string(),
            })
        );
    }

    #[test]
    fn test_kind_maps_to_asset_type() {
        assert_eq!(TaskKind::BrandVoice.asset_type(), AssetType::BrandVoice);
        assert_eq!(TaskKind::BrandVoice.to_string(), "brand_voice");
        assert_eq!(TaskKind::all().len(), 4);
    }
}
