//! Scripted studio sessions
//!
//! A session file is a TOML list of steps run in order against one studio:
//!
//! ```toml
//! [[step]]
//! action = "copy"
//! promptTemplate = "Tagline"
//! productName = "Acme"
//! productDescription = "Widgets for everyone"
//! platform = "Instagram"
//! audience = "Shoppers"
//!
//! [[step]]
//! action = "commit"
//! form = "copy"
//!
//! [[step]]
//! action = "export"
//! output = "board.pdf"
//! ```
//!
//! A failing step is reported and the session continues.

use crate::form::SubmitOutcome;
use crate::prompt::{resolve_choice, COPY_TYPES, LAYOUT_STYLES};
use crate::studio::Studio;
use crate::task::{BrandVoiceParams, CopyParams, ModerationParams, TaskKind, VisualParams};
use chrono::Utc;
use crea_board::{Card, ExportOutcome};
use crea_core::{CreaError, Notice, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One scripted action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionStep {
    Copy(CopyParams),
    BrandVoice(BrandVoiceParams),
    Visual(VisualParams),
    Moderation(ModerationParams),
    Commit {
        form: TaskKind,
    },
    /// Remove by board position, 0 being the most recent asset
    Remove {
        index: usize,
    },
    Clear,
    List,
    Export {
        #[serde(default)]
        output: Option<PathBuf>,
    },
}

impl SessionStep {
    pub fn action(&self) -> &'static str {
        match self {
            SessionStep::Copy(_) => "copy",
            SessionStep::BrandVoice(_) => "brand_voice",
            SessionStep::Visual(_) => "visual",
            SessionStep::Moderation(_) => "moderation",
            SessionStep::Commit { .. } => "commit",
            SessionStep::Remove { .. } => "remove",
            SessionStep::Clear => "clear",
            SessionStep::List => "list",
            SessionStep::Export { .. } => "export",
        }
    }
}

/// A parsed session file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionScript {
    #[serde(rename = "step", default)]
    pub steps: Vec<SessionStep>,
}

impl SessionScript {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CreaError::SessionError(format!("Invalid session script: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            CreaError::SessionError(msg) => {
                CreaError::SessionError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }
}

/// What happened at one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: String,
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.ok { "ok" } else { "FAILED" };
        write!(f, "[{}] {} {}: {}", self.step, self.action, mark, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub steps: Vec<StepReport>,
    pub board_size: usize,
}

impl SessionReport {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }
}

/// Run every step against `studio`. Relative export paths resolve against `base_dir`.
pub fn run_session(studio: &mut Studio, script: &SessionScript, base_dir: &Path) -> SessionReport {
    let mut report = SessionReport::default();

    for (i, step) in script.steps.iter().enumerate() {
        let step_no = i + 1;
        let mut cards = Vec::new();
        let result = run_step(studio, step, base_dir, &mut cards);
        let notices = studio.take_notices();

        let (ok, message) = match result {
            Ok(message) => (true, message),
            Err(e) => (false, e.to_string()),
        };
        if ok {
            tracing::info!(step = step_no, action = step.action(), "{}", message);
        } else {
            tracing::warn!(step = step_no, action = step.action(), "{}", message);
        }

        report.steps.push(StepReport {
            step: step_no,
            action: step.action().to_string(),
            ok,
            message,
            notices,
            cards,
        });
    }

    report.board_size = studio.store().len();
    report
}

fn run_step(
    studio: &mut Studio,
    step: &SessionStep,
    base_dir: &Path,
    cards: &mut Vec<Card>,
) -> Result<String> {
    match step {
        SessionStep::Copy(params) => {
            let mut params = params.clone();
            if let Some(value) = resolve_choice(COPY_TYPES, &params.prompt_template) {
                params.prompt_template = value.to_string();
            }
            describe(studio.submit_copy(params)?, |out| out.marketing_copy.clone())
        }
        SessionStep::BrandVoice(params) => describe(
            studio.submit_brand_voice(params.clone())?,
            |out| out.adapted_content.clone(),
        ),
        SessionStep::Visual(params) => {
            let mut params = params.clone();
            if let Some(value) = resolve_choice(LAYOUT_STYLES, &params.layout_hints) {
                params.layout_hints = value.to_string();
            }
            describe(studio.submit_visual(params)?, |out| {
                summarize_image(&out.image_url)
            })
        }
        SessionStep::Moderation(params) => {
            describe(studio.submit_moderation(params.clone())?, |verdict| {
                let badge = if verdict.is_sensitive { "Sensitive" } else { "Okay" };
                format!("{}: {}", badge, verdict.reason)
            })
        }
        SessionStep::Commit { form } => {
            let asset = studio.commit(*form)?;
            Ok(format!("committed {} asset {}", asset.asset_type(), asset.id()))
        }
        SessionStep::Remove { index } => match studio.remove_at(*index) {
            Some(asset) => Ok(format!("removed {} asset {}", asset.asset_type(), asset.id())),
            None => Ok(format!("no asset at position {}", index)),
        },
        SessionStep::Clear => {
            studio.clear();
            Ok("board cleared".to_string())
        }
        SessionStep::List => {
            *cards = studio.cards(Utc::now());
            Ok(format!("{} asset(s) on the board", cards.len()))
        }
        SessionStep::Export { output } => {
            let outcome = match output {
                Some(path) if path.is_absolute() => studio.export(path)?,
                Some(path) => studio.export(&base_dir.join(path))?,
                None => studio.export_to_dir(base_dir)?,
            };
            Ok(match outcome {
                ExportOutcome::NothingToExport => "board is empty, nothing exported".to_string(),
                ExportOutcome::Exported {
                    path,
                    page_count,
                    card_count,
                } => format!(
                    "exported {} card(s) on {} page(s) to {}",
                    card_count,
                    page_count,
                    path.display()
                ),
            })
        }
    }
}

fn describe<O>(outcome: SubmitOutcome<O>, summary: impl FnOnce(&O) -> String) -> Result<String> {
    match outcome {
        SubmitOutcome::Succeeded(output) => Ok(summary(&output)),
        SubmitOutcome::Failed(notice) => Err(CreaError::GenerationError(
            notice.description.unwrap_or(notice.title),
        )),
    }
}

fn summarize_image(url: &str) -> String {
    match url.split_once(',') {
        Some((header, data)) if url.starts_with("data:") => {
            format!("{} ({} base64 chars)", header, data.len())
        }
        _ => url.to_string(),
    }
}
