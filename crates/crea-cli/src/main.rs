//! Crea CLI - Command-line interface for the Crea content studio

mod commands;
mod telemetry;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{generate, providers, session, templates};
use crea_gen::StudioConfig;

#[derive(Parser)]
#[command(name = "crea")]
#[command(about = "AI content studio: generate campaign assets and export a campaign board", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single generation form
    #[command(subcommand)]
    Generate(generate::GenerateCommands),

    /// Run a scripted session against one campaign board
    Session {
        /// Path to the session script (TOML)
        script: String,

        /// Provider to use (gemini, mock)
        #[arg(long)]
        provider: Option<String>,

        /// Directory for relative export paths (defaults to the script's directory)
        #[arg(long)]
        out_dir: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List gateway providers and their health
    Providers,

    /// List copy types and layout styles
    Templates,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config errors are reported after logging is up.
    let config = StudioConfig::load();
    let level = cli
        .log_level
        .as_deref()
        .or_else(|| config.as_ref().ok().and_then(|c| c.log_level()))
        .unwrap_or("info")
        .to_string();
    telemetry::init_telemetry_with_level(&level);
    let config = config?;

    match cli.command {
        Commands::Generate(cmd) => generate::run(cmd, &config),
        Commands::Session {
            script,
            provider,
            out_dir,
            format,
        } => session::run(session::SessionArgs {
            script,
            provider,
            out_dir,
            format,
        }, &config),
        Commands::Providers => providers::run(&config),
        Commands::Templates => templates::run(),
    }
}
