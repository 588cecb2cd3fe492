//! Logging setup
//!
//! Installs a `tracing-subscriber` registry. Pretty terminal output in debug
//! builds, JSON lines in release builds.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the subscriber.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter.
pub fn init_telemetry_with_level(log_level: &str) {
    let default_filter = format!(
        "warn,crea={level},crea_core={level},crea_board={level},crea_gen={level}",
        level = log_level
    );

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}
