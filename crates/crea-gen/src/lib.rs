//! Crea Gen - Generation gateway and studio forms
//!
//! Provides a pluggable gateway framework for generating marketing copy,
//! brand-voice adaptations, visual mockups and moderation reports, the
//! per-task form state machines that drive it, and the studio session that
//! ties forms to the campaign board.

pub mod config;
pub mod form;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod studio;
pub mod task;
pub mod validate;

pub use config::StudioConfig;
pub use form::{
    BrandVoiceTask, CopyTask, Form, FormStatus, ModerationTask, PendingSubmission, SubmitOutcome,
    Task, VisualTask,
};
pub use providers::{available_providers, create_gateway};
pub use session::{run_session, SessionReport, SessionScript, SessionStep, StepReport};
pub use studio::Studio;
pub use task::{
    BrandVoiceOutput, BrandVoiceParams, CopyOutput, CopyParams, Gateway, GenerationOutput,
    GenerationRequest, ModerationParams, ProviderStatus, TaskKind, VisualOutput, VisualParams,
};
pub use validate::Validate;
