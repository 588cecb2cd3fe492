//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `CREA_GEMINI_API_KEY`, then `GEMINI_API_KEY`
//!    or `GOOGLE_API_KEY`
//! 2. Project-local: `.crea/config.toml`
//! 3. Global: `~/.crea/config.toml`

use crea_board::{ExportSettings, PageSetup};
use crea_core::{CreaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Environment variables checked for a provider's API key, in order
fn env_keys(provider_name: &str) -> Vec<String> {
    let mut keys = vec![format!("CREA_{}_API_KEY", provider_name.to_uppercase())];
    if provider_name == "gemini" {
        keys.push("GEMINI_API_KEY".to_string());
        keys.push("GOOGLE_API_KEY".to_string());
    }
    keys
}

/// Resolved provider-specific configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub enabled: bool,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            enabled: true,
            text_model: None,
            image_model: None,
        }
    }
}

/// Generation defaults
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub default_provider: String,
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_timeout() -> u64 {
    120
}

/// One `[providers.<name>]` table as written in a config file.
/// Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderFile {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub enabled: Option<bool>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationFile {
    pub default_provider: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFile {
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub margin_mm: Option<f64>,
    pub gap_mm: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportFile {
    #[serde(default)]
    pub page: PageFile,
    pub card_width_px: Option<u32>,
    pub scale: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub file_name: Option<String>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfigFile {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderFile>,
    #[serde(default)]
    pub generation: GenerationFile,
    #[serde(default)]
    pub export: ExportFile,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct StudioConfig {
    pub log_level: Option<String>,
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
    pub export: ExportSettings,
}

impl From<ProviderFile> for ProviderConfig {
    fn from(file: ProviderFile) -> Self {
        Self {
            api_key: file.api_key,
            api_url: file.api_url,
            enabled: file.enabled.unwrap_or(true),
            text_model: file.text_model,
            image_model: file.image_model,
        }
    }
}

impl From<GenerationFile> for GenerationConfig {
    fn from(file: GenerationFile) -> Self {
        Self {
            default_provider: file.default_provider.unwrap_or_else(default_provider),
            request_timeout_secs: file.request_timeout_secs.unwrap_or_else(default_timeout),
        }
    }
}

impl From<ExportFile> for ExportSettings {
    fn from(file: ExportFile) -> Self {
        let defaults = ExportSettings::default();
        let page = PageSetup {
            width_mm: file.page.width_mm.unwrap_or(defaults.page.width_mm),
            height_mm: file.page.height_mm.unwrap_or(defaults.page.height_mm),
            margin_mm: file.page.margin_mm.unwrap_or(defaults.page.margin_mm),
            gap_mm: file.page.gap_mm.unwrap_or(defaults.page.gap_mm),
        };
        Self {
            page,
            card_width_px: file.card_width_px.unwrap_or(defaults.card_width_px),
            scale: file.scale.unwrap_or(defaults.scale),
            jpeg_quality: file.jpeg_quality.unwrap_or(defaults.jpeg_quality),
            file_name: file.file_name.unwrap_or(defaults.file_name),
        }
    }
}

impl From<StudioConfigFile> for StudioConfig {
    fn from(file: StudioConfigFile) -> Self {
        Self {
            log_level: file.log_level,
            providers: file
                .providers
                .into_iter()
                .map(|(name, provider)| (name, provider.into()))
                .collect(),
            generation: file.generation.into(),
            export: file.export.into(),
        }
    }
}

/// Replace `base` only when the upper layer sets a value
fn layer<T>(base: &mut Option<T>, overlay: Option<T>) {
    if overlay.is_some() {
        *base = overlay;
    }
}

impl StudioConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = StudioConfigFile::default();

        // Layer 1: Global config (~/.crea/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        // Layer 2: Project-local config (.crea/config.toml)
        let local_path = PathBuf::from(".crea/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        // Layer 3: Environment variable overrides
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        Ok(config.into())
    }

    /// Load config from a specific file path, plus environment overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config.into())
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
    }

    /// Get the API base URL override for a provider
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    pub fn default_provider(&self) -> &str {
        &self.generation.default_provider
    }

    /// Model used for copy, brand-voice and moderation requests
    pub fn text_model(&self, provider_name: &str) -> &str {
        self.providers
            .get(provider_name)
            .and_then(|p| p.text_model.as_deref())
            .unwrap_or(DEFAULT_TEXT_MODEL)
    }

    /// Model used for visual requests
    pub fn image_model(&self, provider_name: &str) -> &str {
        self.providers
            .get(provider_name)
            .and_then(|p| p.image_model.as_deref())
            .unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.generation.request_timeout_secs
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".crea").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<StudioConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let config: StudioConfigFile = toml::from_str(&content).map_err(|e| {
            CreaError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    fn merge_into(base: &mut StudioConfigFile, overlay: StudioConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = base.providers.entry(name).or_default();
            layer(&mut entry.api_key, provider.api_key);
            layer(&mut entry.api_url, provider.api_url);
            layer(&mut entry.enabled, provider.enabled);
            layer(&mut entry.text_model, provider.text_model);
            layer(&mut entry.image_model, provider.image_model);
        }

        let generation = overlay.generation;
        layer(&mut base.generation.default_provider, generation.default_provider);
        layer(&mut base.generation.request_timeout_secs, generation.request_timeout_secs);

        let export = overlay.export;
        let page = &mut base.export.page;
        layer(&mut page.width_mm, export.page.width_mm);
        layer(&mut page.height_mm, export.page.height_mm);
        layer(&mut page.margin_mm, export.page.margin_mm);
        layer(&mut page.gap_mm, export.page.gap_mm);
        layer(&mut base.export.card_width_px, export.card_width_px);
        layer(&mut base.export.scale, export.scale);
        layer(&mut base.export.jpeg_quality, export.jpeg_quality);
        layer(&mut base.export.file_name, export.file_name);

        layer(&mut base.log_level, overlay.log_level);
    }

    fn apply_env_overrides<F>(config: &mut StudioConfigFile, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in crate::providers::available_providers() {
            let found = env_keys(name)
                .iter()
                .find_map(|key| lookup(key).filter(|v| !v.is_empty()));
            if let Some(key) = found {
                let entry = config.providers.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crea_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_config_from_file() {
        let config_str = r#"
log_level = "debug"

[providers.gemini]
api_url = "https://gemini.example.com/v1beta"
text_model = "gemini-1.5-pro"

[providers.mock]
enabled = false

[generation]
default_provider = "mock"
request_timeout_secs = 30

[export]
file_name = "board.pdf"
scale = 1
"#;
        let path = temp_config(config_str);
        let config = StudioConfig::load_from_file(&path).unwrap();

        assert!(config.is_enabled("gemini"));
        assert!(!config.is_enabled("mock"));
        assert_eq!(config.default_provider(), "mock");
        assert_eq!(config.request_timeout_secs(), 30);
        assert_eq!(config.log_level(), Some("debug"));
        assert_eq!(
            config.api_url("gemini"),
            Some("https://gemini.example.com/v1beta")
        );
        assert_eq!(config.text_model("gemini"), "gemini-1.5-pro");
        assert_eq!(config.image_model("gemini"), DEFAULT_IMAGE_MODEL);
        assert_eq!(config.export.file_name, "board.pdf");
        assert_eq!(config.export.scale, 1);
        assert_eq!(config.export.card_width_px, 800);
        assert_eq!(config.export.page.margin_mm, 10.0);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_env_override_precedence() {
        let mut file = StudioConfigFile::default();
        file.providers.insert(
            "gemini".to_string(),
            ProviderFile {
                api_key: Some("file-key".to_string()),
                ..Default::default()
            },
        );

        StudioConfig::apply_env_overrides(&mut file, |key| match key {
            "GEMINI_API_KEY" => Some("gemini-env".to_string()),
            "GOOGLE_API_KEY" => Some("google-env".to_string()),
            _ => None,
        });
        assert_eq!(file.providers["gemini"].api_key.as_deref(), Some("gemini-env"));

        StudioConfig::apply_env_overrides(&mut file, |key| match key {
            "CREA_GEMINI_API_KEY" => Some("crea-env".to_string()),
            "GEMINI_API_KEY" => Some("gemini-env".to_string()),
            _ => None,
        });
        assert_eq!(file.providers["gemini"].api_key.as_deref(), Some("crea-env"));
    }

    #[test]
    fn test_env_only_provider_is_enabled() {
        let mut file = StudioConfigFile::default();
        StudioConfig::apply_env_overrides(&mut file, |key| match key {
            "GOOGLE_API_KEY" => Some("google-env".to_string()),
            _ => None,
        });
        let config: StudioConfig = file.into();
        assert!(config.is_enabled("gemini"));
        assert_eq!(config.api_key("gemini"), Some("google-env"));
    }

    #[test]
    fn test_empty_env_value_ignored() {
        let mut file = StudioConfigFile::default();
        StudioConfig::apply_env_overrides(&mut file, |key| match key {
            "CREA_GEMINI_API_KEY" => Some(String::new()),
            _ => None,
        });
        assert!(!file.providers.contains_key("gemini"));
    }

    #[test]
    fn test_merge_layers() {
        let mut base: StudioConfigFile = toml::from_str(
            r#"
[providers.gemini]
api_key = "global-key"
image_model = "global-image"
"#,
        )
        .unwrap();
        let overlay: StudioConfigFile = toml::from_str(
            r#"
log_level = "warn"

[providers.gemini]
text_model = "project-text"

[generation]
default_provider = "mock"
"#,
        )
        .unwrap();

        StudioConfig::merge_into(&mut base, overlay);
        let config: StudioConfig = base.into();
        assert_eq!(config.api_key("gemini"), Some("global-key"));
        assert_eq!(config.text_model("gemini"), "project-text");
        assert_eq!(config.image_model("gemini"), "global-image");
        assert_eq!(config.default_provider(), "mock");
        assert_eq!(config.log_level(), Some("warn"));
    }

    #[test]
    fn test_merge_keeps_lower_export_fields() {
        let mut base: StudioConfigFile = toml::from_str(
            r#"
[export]
scale = 3

[export.page]
margin_mm = 15.0
"#,
        )
        .unwrap();
        let overlay: StudioConfigFile = toml::from_str(
            r#"
[export]
file_name = "project.pdf"

[export.page]
gap_mm = 8.0
"#,
        )
        .unwrap();

        StudioConfig::merge_into(&mut base, overlay);
        let config: StudioConfig = base.into();
        assert_eq!(config.export.file_name, "project.pdf");
        assert_eq!(config.export.scale, 3);
        assert_eq!(config.export.page.margin_mm, 15.0);
        assert_eq!(config.export.page.gap_mm, 8.0);
        assert_eq!(config.export.page.height_mm, 297.0);
        assert_eq!(config.export.card_width_px, 800);
    }

    #[test]
    fn test_merge_keeps_lower_enabled_flag() {
        let mut base: StudioConfigFile = toml::from_str(
            r#"
[providers.gemini]
enabled = false

[providers.mock]
enabled = false

[generation]
default_provider = "mock"
request_timeout_secs = 45
"#,
        )
        .unwrap();
        let overlay: StudioConfigFile = toml::from_str(
            r#"
[providers.gemini]
text_model = "project-text"

[providers.mock]
enabled = true

[generation]
default_provider = "gemini"
"#,
        )
        .unwrap();

        StudioConfig::merge_into(&mut base, overlay);
        let config: StudioConfig = base.into();
        assert!(!config.is_enabled("gemini"));
        assert!(config.is_enabled("mock"));
        assert_eq!(config.text_model("gemini"), "project-text");
        assert_eq!(config.default_provider(), "gemini");
        assert_eq!(config.request_timeout_secs(), 45);
    }

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();
        assert_eq!(config.api_key("nonexistent"), None);
        assert!(config.is_enabled("nonexistent"));
        assert_eq!(config.default_provider(), "gemini");
        assert_eq!(config.text_model("gemini"), DEFAULT_TEXT_MODEL);
        assert_eq!(config.request_timeout_secs(), 120);
        assert_eq!(config.export.file_name, "CreaPrompt-Campaign-Board.pdf");
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let path = temp_config("[generation\ndefault_provider = ");
        let err = StudioConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, CreaError::ConfigError(_)));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
