//! Scripted session command

use anyhow::{bail, Result};
use crea_gen::{run_session, SessionScript, Studio, StudioConfig};
use std::path::{Path, PathBuf};

pub struct SessionArgs {
    pub script: String,
    pub provider: Option<String>,
    pub out_dir: Option<String>,
    pub format: String,
}

pub fn run(args: SessionArgs, config: &StudioConfig) -> Result<()> {
    let script_path = Path::new(&args.script);
    let script = SessionScript::load(script_path)?;

    let base_dir = match &args.out_dir {
        Some(dir) => PathBuf::from(dir),
        None => script_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut studio = Studio::from_config(config, args.provider.as_deref())?;
    tracing::info!(
        script = %script_path.display(),
        steps = script.steps.len(),
        provider = studio.gateway().name(),
        "running session"
    );

    let report = run_session(&mut studio, &script, &base_dir);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => {
            for step in &report.steps {
                println!("{}", step);
                for notice in &step.notices {
                    println!("    {}", notice);
                }
                for card in &step.cards {
                    let badge = card.badge().map(|b| format!(" [{}]", b)).unwrap_or_default();
                    println!("    - {}{} ({})", card.title, badge, card.age);
                    if let Some(text) = card.copyable_text() {
                        println!("      {}", text);
                    }
                }
            }
            println!(
                "\n{} step(s), {} failed, {} asset(s) on the board",
                report.steps.len(),
                report.failures(),
                report.board_size
            );
        }
        other => bail!("Unknown format '{}'. Use text or json", other),
    }

    Ok(())
}
