//! Gateway registry
//!
//! Maps provider names to concrete implementations.

pub mod gemini;
pub mod mock;

use crate::config::StudioConfig;
use crate::task::Gateway;
use crea_core::{CreaError, Result};

/// Create a gateway by name with configuration
pub fn create_gateway(name: &str, config: &StudioConfig) -> Result<Box<dyn Gateway>> {
    if !config.is_enabled(name) {
        return Err(CreaError::ConfigError(format!(
            "Provider '{}' is disabled in config",
            name
        )));
    }

    match name {
        "mock" => Ok(Box::new(mock::MockGateway::new())),
        "gemini" => Ok(Box::new(gemini::GeminiGateway::from_config(config)?)),
        _ => Err(CreaError::ConfigError(format!(
            "Unknown provider '{}'. Available: {}",
            name,
            available_providers().join(", ")
        ))),
    }
}

/// List all available provider names
pub fn available_providers() -> Vec<&'static str> {
    vec!["mock", "gemini"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[test]
    fn test_create_mock() {
        let gateway = create_gateway("mock", &StudioConfig::default()).unwrap();
        assert_eq!(gateway.name(), "mock");
    }

    #[test]
    fn test_unknown_provider() {
        let err = create_gateway("dall-e", &StudioConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("mock, gemini"));
    }

    #[test]
    fn test_disabled_provider() {
        let mut config = StudioConfig::default();
        config.providers.insert(
            "mock".to_string(),
            ProviderConfig {
                enabled: false,
                ..Default::default()
            },
        );
        assert!(create_gateway("mock", &config).is_err());
    }
}
