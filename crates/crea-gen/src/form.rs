//! Generation form state machines
//!
//! One [`Form`] per task kind. A form moves `Idle -> Submitting ->
//! Succeeded` on a good gateway answer and back to `Idle` on failure.
//! Committing a success adds exactly one asset to the board and resets the
//! form, so the same result cannot be committed twice.
//!
//! Submission is split into [`Form::begin_submit`] and
//! [`Form::finish_submit`] so a host can run the gateway call elsewhere and
//! keep other forms responsive. [`Form::submit`] does both in one call.

use crate::task::{
    BrandVoiceOutput, BrandVoiceParams, CopyOutput, CopyParams, Gateway, GenerationOutput,
    GenerationRequest, ModerationParams, TaskKind, VisualOutput, VisualParams,
};
use crate::validate::Validate;
use crea_board::{Asset, AssetDraft, AssetKind, AssetStore, ModerationVerdict, PromptData};
use crea_core::{CreaError, Notice, Result};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Binds a task kind to its parameter and output types
pub trait Task {
    const KIND: TaskKind;
    type Params: Validate + Serialize + Clone + fmt::Debug;
    type Output: Clone + fmt::Debug;

    fn request(params: &Self::Params) -> GenerationRequest;

    /// Pull this task's output out of a gateway answer. `None` on a kind mismatch.
    fn extract(output: GenerationOutput) -> Option<Self::Output>;

    /// Build the board entry for a committed result
    fn draft(params: &Self::Params, output: &Self::Output) -> Result<AssetDraft>;

    /// Generic description shown when generation fails
    fn failure_message() -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyTask;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrandVoiceTask;

#[derive(Debug, Clone, Copy, Default)]
pub struct VisualTask;

#[derive(Debug, Clone, Copy, Default)]
pub struct ModerationTask;

impl Task for CopyTask {
    const KIND: TaskKind = TaskKind::Copy;
    type Params = CopyParams;
    type Output = CopyOutput;

    fn request(params: &CopyParams) -> GenerationRequest {
        GenerationRequest::Copy(params.clone())
    }

    fn extract(output: GenerationOutput) -> Option<CopyOutput> {
        match output {
            GenerationOutput::Copy(out) => Some(out),
            _ => None,
        }
    }

    fn draft(params: &CopyParams, output: &CopyOutput) -> Result<AssetDraft> {
        Ok(AssetDraft::new(
            AssetKind::Copy,
            output.marketing_copy.clone(),
            PromptData::from_params(params)?,
        ))
    }

    fn failure_message() -> &'static str {
        "Failed to generate marketing copy. Please try again."
    }
}

impl Task for BrandVoiceTask {
    const KIND: TaskKind = TaskKind::BrandVoice;
    type Params = BrandVoiceParams;
    type Output = BrandVoiceOutput;

    fn request(params: &BrandVoiceParams) -> GenerationRequest {
        GenerationRequest::BrandVoice(params.clone())
    }

    fn extract(output: GenerationOutput) -> Option<BrandVoiceOutput> {
        match output {
            GenerationOutput::BrandVoice(out) => Some(out),
            _ => None,
        }
    }

    fn draft(params: &BrandVoiceParams, output: &BrandVoiceOutput) -> Result<AssetDraft> {
        Ok(AssetDraft::new(
            AssetKind::BrandVoice,
            output.adapted_content.clone(),
            PromptData::from_params(params)?,
        ))
    }

    fn failure_message() -> &'static str {
        "Failed to adapt content. Please try again."
    }
}

impl Task for VisualTask {
    const KIND: TaskKind = TaskKind::Visual;
    type Params = VisualParams;
    type Output = VisualOutput;

    fn request(params: &VisualParams) -> GenerationRequest {
        GenerationRequest::Visual(params.clone())
    }

    fn extract(output: GenerationOutput) -> Option<VisualOutput> {
        match output {
            GenerationOutput::Visual(out) => Some(out),
            _ => None,
        }
    }

    fn draft(params: &VisualParams, output: &VisualOutput) -> Result<AssetDraft> {
        Ok(AssetDraft::new(
            AssetKind::Visual,
            output.image_url.clone(),
            PromptData::from_params(params)?,
        ))
    }

    fn failure_message() -> &'static str {
        "Failed to generate visual. Please try again."
    }
}

impl Task for ModerationTask {
    const KIND: TaskKind = TaskKind::Moderation;
    type Params = ModerationParams;
    type Output = ModerationVerdict;

    fn request(params: &ModerationParams) -> GenerationRequest {
        GenerationRequest::Moderation(params.clone())
    }

    fn extract(output: GenerationOutput) -> Option<ModerationVerdict> {
        match output {
            GenerationOutput::Moderation(verdict) => Some(verdict),
            _ => None,
        }
    }

    // The moderated text is the content; the verdict rides along as meta.
    fn draft(params: &ModerationParams, output: &ModerationVerdict) -> Result<AssetDraft> {
        Ok(AssetDraft::new(
            AssetKind::Moderation {
                meta: output.clone(),
            },
            params.text.clone(),
            PromptData::from_params(params)?,
        ))
    }

    fn failure_message() -> &'static str {
        "Failed to moderate content. Please try again."
    }
}

/// Coarse form state, for display and control enabling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Submitting,
    Succeeded,
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormStatus::Idle => write!(f, "idle"),
            FormStatus::Submitting => write!(f, "submitting"),
            FormStatus::Succeeded => write!(f, "succeeded"),
        }
    }
}

#[derive(Debug)]
enum FormState<T: Task> {
    Idle,
    Submitting { ticket: u64, params: T::Params },
    Succeeded { params: T::Params, output: T::Output },
}

/// An in-flight gateway request handed out by [`Form::begin_submit`]
#[derive(Debug)]
pub struct PendingSubmission {
    ticket: u64,
    request: GenerationRequest,
}

impl PendingSubmission {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn kind(&self) -> TaskKind {
        self.request.kind()
    }
}

/// What a finished submission produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<O> {
    /// The form now holds this result, ready to commit
    Succeeded(O),
    /// The gateway failed; the form is idle again
    Failed(Notice),
}

impl<O> SubmitOutcome<O> {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded(_))
    }
}

/// Submission state for one task kind
#[derive(Debug)]
pub struct Form<T: Task> {
    state: FormState<T>,
}

impl<T: Task> Default for Form<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Task> Form<T> {
    pub fn new() -> Self {
        Self {
            state: FormState::Idle,
        }
    }

    pub fn kind(&self) -> TaskKind {
        T::KIND
    }

    pub fn status(&self) -> FormStatus {
        match self.state {
            FormState::Idle => FormStatus::Idle,
            FormState::Submitting { .. } => FormStatus::Submitting,
            FormState::Succeeded { .. } => FormStatus::Succeeded,
        }
    }

    /// The submit control is disabled while a request is in flight
    pub fn can_submit(&self) -> bool {
        !matches!(self.state, FormState::Submitting { .. })
    }

    pub fn can_commit(&self) -> bool {
        matches!(self.state, FormState::Succeeded { .. })
    }

    /// The held result, if the last submission succeeded
    pub fn result(&self) -> Option<&T::Output> {
        match &self.state {
            FormState::Succeeded { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Parameters of the submission in flight or being held
    pub fn submitted_params(&self) -> Option<&T::Params> {
        match &self.state {
            FormState::Idle => None,
            FormState::Submitting { params, .. } | FormState::Succeeded { params, .. } => {
                Some(params)
            }
        }
    }

    /// Validate and move to `Submitting`. On any error the state is unchanged.
    ///
    /// Submitting from `Succeeded` drops the uncommitted result.
    pub fn begin_submit(&mut self, params: T::Params) -> Result<PendingSubmission> {
        if let FormState::Submitting { .. } = self.state {
            return Err(CreaError::InvalidTransition {
                state: FormStatus::Submitting.to_string(),
                action: "submit".to_string(),
            });
        }

        let errors = params.validate();
        if !errors.is_empty() {
            tracing::debug!(task = %T::KIND, errors = errors.len(), "submission rejected by validation");
            return Err(CreaError::ValidationError(errors));
        }

        let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        let request = T::request(&params);
        self.state = FormState::Submitting { ticket, params };
        tracing::debug!(task = %T::KIND, ticket, "submission started");

        Ok(PendingSubmission { ticket, request })
    }

    /// Apply the gateway's answer to a pending submission
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        result: Result<GenerationOutput>,
    ) -> Result<SubmitOutcome<T::Output>> {
        let status = self.status();
        let params = match std::mem::replace(&mut self.state, FormState::Idle) {
            FormState::Submitting { ticket, params } if ticket == pending.ticket => params,
            other => {
                self.state = other;
                return Err(CreaError::InvalidTransition {
                    state: status.to_string(),
                    action: "finish a submission it did not start".to_string(),
                });
            }
        };

        let output = result.and_then(|output| {
            let kind = output.kind();
            T::extract(output).ok_or_else(|| {
                CreaError::GenerationError(format!(
                    "Gateway answered a {} request with {} output",
                    T::KIND,
                    kind
                ))
            })
        });

        match output {
            Ok(output) => {
                tracing::info!(task = %T::KIND, "generation succeeded");
                self.state = FormState::Succeeded {
                    params,
                    output: output.clone(),
                };
                Ok(SubmitOutcome::Succeeded(output))
            }
            Err(e) => {
                tracing::error!(task = %T::KIND, error = %e, "generation failed");
                Ok(SubmitOutcome::Failed(Notice::destructive(
                    "Error",
                    T::failure_message(),
                )))
            }
        }
    }

    /// Validate, call the gateway once, and record the answer
    pub fn submit(
        &mut self,
        params: T::Params,
        gateway: &dyn Gateway,
    ) -> Result<SubmitOutcome<T::Output>> {
        let pending = self.begin_submit(params)?;
        let result = gateway.generate(pending.request());
        self.finish_submit(pending, result)
    }

    /// Move the held result onto the board and reset to `Idle`
    pub fn commit(&mut self, store: &mut AssetStore) -> Result<Asset> {
        let status = self.status();
        let (params, output) = match std::mem::replace(&mut self.state, FormState::Idle) {
            FormState::Succeeded { params, output } => (params, output),
            other => {
                self.state = other;
                return Err(CreaError::InvalidTransition {
                    state: status.to_string(),
                    action: "commit".to_string(),
                });
            }
        };

        let draft = match T::draft(&params, &output) {
            Ok(draft) => draft,
            Err(e) => {
                self.state = FormState::Succeeded { params, output };
                return Err(e);
            }
        };

        let asset = store.add(draft);
        tracing::info!(task = %T::KIND, asset = %asset.id(), "result committed to board");
        Ok(asset)
    }
}
