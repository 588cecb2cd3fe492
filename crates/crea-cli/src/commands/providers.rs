//! Provider listing with health checks

use anyhow::Result;
use crea_gen::{available_providers, create_gateway, StudioConfig};

pub fn run(config: &StudioConfig) -> Result<()> {
    println!("Providers (default: {}):", config.default_provider());
    for name in available_providers() {
        let status = match create_gateway(name, config) {
            Ok(gateway) => match gateway.health_check() {
                Ok(status) => status.to_string(),
                Err(e) => format!("error ({})", e),
            },
            Err(e) => {
                tracing::debug!(provider = name, error = %e, "provider not constructible");
                if !config.is_enabled(name) {
                    "disabled".to_string()
                } else if config.api_key(name).is_none() && name != "mock" {
                    "no API key".to_string()
                } else {
                    format!("error ({})", e)
                }
            }
        };
        println!("  {:<8} {}", name, status);
    }
    Ok(())
}
