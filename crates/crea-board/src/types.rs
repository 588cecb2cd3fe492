//! Asset type definitions

use chrono::{DateTime, Utc};
use crea_core::{AssetId, CreaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Types of content the studio can place on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Copy,
    Visual,
    #[serde(rename = "Brand Voice")]
    BrandVoice,
    Moderation,
}

impl AssetType {
    /// Label shown on board cards
    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Copy => "Copy",
            AssetType::Visual => "Visual",
            AssetType::BrandVoice => "Brand Voice",
            AssetType::Moderation => "Moderation",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Side-channel result of a moderation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    pub is_sensitive: bool,
    pub reason: String,
}

/// The asset type together with any metadata that type carries.
///
/// Only moderation reports have metadata; every other type is a bare tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssetKind {
    Copy,
    Visual,
    #[serde(rename = "Brand Voice")]
    BrandVoice,
    Moderation { meta: ModerationVerdict },
}

impl AssetKind {
    pub fn asset_type(&self) -> AssetType {
        match self {
            AssetKind::Copy => AssetType::Copy,
            AssetKind::Visual => AssetType::Visual,
            AssetKind::BrandVoice => AssetType::BrandVoice,
            AssetKind::Moderation { .. } => AssetType::Moderation,
        }
    }

    pub fn meta(&self) -> Option<&ModerationVerdict> {
        match self {
            AssetKind::Moderation { meta } => Some(meta),
            _ => None,
        }
    }
}

/// The parameters that produced an asset, keyed by request field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptData(BTreeMap<String, serde_json::Value>);

impl PromptData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a serializable parameter record. The record must serialize
    /// to a JSON object.
    pub fn from_params<T: Serialize>(params: &T) -> Result<Self> {
        match serde_json::to_value(params)? {
            serde_json::Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(CreaError::GenerationError(format!(
                "Prompt data must be a record, got {}",
                other
            ))),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for PromptData {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An asset that has not been committed yet: no id, no timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDraft {
    pub kind: AssetKind,
    pub content: String,
    pub prompt_data: PromptData,
}

impl AssetDraft {
    pub fn new(kind: AssetKind, content: impl Into<String>, prompt_data: PromptData) -> Self {
        Self {
            kind,
            content: content.into(),
            prompt_data,
        }
    }
}

/// A committed unit of generated content with its provenance.
///
/// Fields are read-only after creation; an asset is replaced, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    id: AssetId,
    #[serde(flatten)]
    kind: AssetKind,
    content: String,
    prompt_data: PromptData,
    created_at: DateTime<Utc>,
}

impl Asset {
    pub(crate) fn from_draft(draft: AssetDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: AssetId::new(),
            kind: draft.kind,
            content: draft.content,
            prompt_data: draft.prompt_data,
            created_at,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn asset_type(&self) -> AssetType {
        self.kind.asset_type()
    }

    pub fn kind(&self) -> &AssetKind {
        &self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn prompt_data(&self) -> &PromptData {
        &self.prompt_data
    }

    pub fn meta(&self) -> Option<&ModerationVerdict> {
        self.kind.meta()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct SampleParams {
        product_name: String,
        word_limit: u32,
    }

    #[test]
    fn test_prompt_data_from_params() {
        let data = PromptData::from_params(&SampleParams {
            product_name: "Acme".to_string(),
            word_limit: 12,
        })
        .unwrap();
        assert_eq!(data.get_str("productName"), Some("Acme"));
        assert_eq!(data.get("wordLimit"), Some(&serde_json::json!(12)));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_prompt_data_rejects_non_record() {
        assert!(PromptData::from_params(&"just a string").is_err());
    }

    #[test]
    fn test_asset_serializes_type_tag_and_meta() {
        let draft = AssetDraft::new(
            AssetKind::Moderation {
                meta: ModerationVerdict {
                    is_sensitive: true,
                    reason: "Stereotyping".to_string(),
                },
            },
            "some text to check",
            PromptData::new(),
        );
        let asset = Asset::from_draft(draft, Utc::now());
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "Moderation");
        assert_eq!(json["meta"]["isSensitive"], true);
        assert_eq!(json["content"], "some text to check");
        assert!(json.get("createdAt").is_some());

        let back: Asset = serde_json::from_value(json).unwrap();
        assert_eq!(back, asset);
    }

    #[test]
    fn test_brand_voice_label() {
        let json = serde_json::to_string(&AssetType::BrandVoice).unwrap();
        assert_eq!(json, "\"Brand Voice\"");
        assert_eq!(AssetType::BrandVoice.to_string(), "Brand Voice");
        assert!(AssetKind::BrandVoice.meta().is_none());
    }
}
