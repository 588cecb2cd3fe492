//! Single-form generation commands

use super::describe_error;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use crea_board::parse_data_uri;
use crea_core::Notice;
use crea_gen::prompt::{resolve_choice, COPY_TYPES, LAYOUT_STYLES};
use crea_gen::{
    BrandVoiceParams, CopyParams, ModerationParams, Studio, StudioConfig, SubmitOutcome, TaskKind,
    VisualParams,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Generate marketing copy
    Copy {
        /// Product name
        #[arg(long)]
        product_name: String,

        /// Product description
        #[arg(long, short)]
        description: String,

        /// Target platform (e.g., Instagram, Email)
        #[arg(long)]
        platform: String,

        /// Target audience
        #[arg(long)]
        audience: String,

        /// Copy type label or template text (see `crea templates`)
        #[arg(long, default_value = "Tagline")]
        template: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Adapt content to brand guidelines
    BrandVoice {
        /// Brand guidelines text
        #[arg(long)]
        guidelines: String,

        /// Content to adapt
        #[arg(long)]
        content: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate a visual mockup
    Visual {
        /// Image description
        #[arg(long, short)]
        prompt: String,

        /// Style preferences (colors, design trends)
        #[arg(long)]
        style: String,

        /// Layout style label or value (see `crea templates`)
        #[arg(long, default_value = "Minimalist")]
        layout: String,

        /// Write the decoded image to this path
        #[arg(long)]
        image_out: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Check text for cultural, gender or racial sensitivity
    Moderate {
        /// Text to moderate
        text: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args)]
pub struct CommonArgs {
    /// Provider to use (gemini, mock)
    #[arg(long)]
    provider: Option<String>,

    /// Commit the result and export a one-card board PDF to this path
    #[arg(long)]
    export: Option<String>,
}

pub fn run(cmd: GenerateCommands, config: &StudioConfig) -> Result<()> {
    match cmd {
        GenerateCommands::Copy {
            product_name,
            description,
            platform,
            audience,
            template,
            common,
        } => {
            let prompt_template = resolve_choice(COPY_TYPES, &template)
                .map(str::to_string)
                .unwrap_or(template);
            let mut studio = open_studio(config, &common)?;
            let outcome = studio
                .submit_copy(CopyParams {
                    prompt_template,
                    audience,
                    platform,
                    product_name,
                    product_description: description,
                })
                .map_err(describe_error)?;
            let copy = succeeded(outcome)?;
            println!("{}", copy.marketing_copy);
            finish(&mut studio, TaskKind::Copy, &common)
        }
        GenerateCommands::BrandVoice {
            guidelines,
            content,
            common,
        } => {
            let mut studio = open_studio(config, &common)?;
            let outcome = studio
                .submit_brand_voice(BrandVoiceParams {
                    brand_guidelines: guidelines,
                    content_to_adapt: content,
                })
                .map_err(describe_error)?;
            let adapted = succeeded(outcome)?;
            println!("{}", adapted.adapted_content);
            finish(&mut studio, TaskKind::BrandVoice, &common)
        }
        GenerateCommands::Visual {
            prompt,
            style,
            layout,
            image_out,
            common,
        } => {
            let layout_hints = resolve_choice(LAYOUT_STYLES, &layout)
                .map(str::to_string)
                .unwrap_or(layout);
            let mut studio = open_studio(config, &common)?;
            let outcome = studio
                .submit_visual(VisualParams {
                    prompt,
                    style_preferences: style,
                    layout_hints,
                })
                .map_err(describe_error)?;
            let visual = succeeded(outcome)?;

            match image_out {
                Some(path) => save_image(&visual.image_url, Path::new(&path))?,
                None => println!("{}", visual.image_url),
            }
            finish(&mut studio, TaskKind::Visual, &common)
        }
        GenerateCommands::Moderate { text, common } => {
            let mut studio = open_studio(config, &common)?;
            let outcome = studio
                .submit_moderation(ModerationParams { text })
                .map_err(describe_error)?;
            let verdict = succeeded(outcome)?;
            let badge = if verdict.is_sensitive { "Sensitive" } else { "Okay" };
            println!("{}: {}", badge, verdict.reason);
            finish(&mut studio, TaskKind::Moderation, &common)
        }
    }
}

fn open_studio(config: &StudioConfig, common: &CommonArgs) -> Result<Studio> {
    let studio = Studio::from_config(config, common.provider.as_deref())?;
    println!("Generating via {}...", studio.gateway().name());
    Ok(studio)
}

fn succeeded<O>(outcome: SubmitOutcome<O>) -> Result<O> {
    match outcome {
        SubmitOutcome::Succeeded(output) => Ok(output),
        SubmitOutcome::Failed(notice) => bail!("{}", notice_text(&notice)),
    }
}

fn notice_text(notice: &Notice) -> String {
    match &notice.description {
        Some(desc) => format!("{}: {}", notice.title, desc),
        None => notice.title.clone(),
    }
}

/// Optionally commit the held result and export the board
fn finish(studio: &mut Studio, kind: TaskKind, common: &CommonArgs) -> Result<()> {
    let Some(path) = &common.export else {
        return Ok(());
    };

    studio.commit(kind)?;
    studio.export(Path::new(path))?;
    for notice in studio.take_notices() {
        println!("{}", notice);
    }
    Ok(())
}

fn save_image(image_url: &str, path: &Path) -> Result<()> {
    let data = parse_data_uri(image_url)
        .map_err(|e| anyhow::anyhow!("Invalid image data: {}", e))?;
    let Some(data) = data else {
        bail!("Image is a remote URL, not inline data: {}", image_url);
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, &data.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Saved {} image to {}", data.mime_type, path.display());
    Ok(())
}
