use thiserror::Error;

use crate::record::{RecordError, RecordId};
use crate::transfer::TransferError;

use super::types::{PendingSubmission, SubmissionStep, TransferSlot};

/// Problems found before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("candidate name is required")]
    EmptyName,

    #[error("job title is required")]
    EmptyTitle,

    #[error("a resume file is required")]
    MissingResume,

    #[error("resume must be a PDF document, got '{0}'")]
    UnsupportedResumeType(String),

    #[error("job description is required")]
    EmptyJobDescription,
}

/// Submission failures, one per step.
///
/// Failures after the brief exists carry its id and a
/// [`PendingSubmission`] that retries only the remaining steps.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not create brief: {source}")]
    CreateFailed { source: RecordError },

    #[error("brief {record_id} was created but the {slot} upload failed: {source}")]
    TransferFailed {
        record_id: RecordId,
        slot: TransferSlot,
        source: TransferError,
        pending: Box<PendingSubmission>,
    },

    #[error("brief {record_id} was uploaded but processing could not be started: {source}")]
    StartFailed {
        record_id: RecordId,
        source: RecordError,
        pending: Box<PendingSubmission>,
    },
}

impl SubmissionError {
    /// Id of the brief, if one was created before the failure.
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            SubmissionError::Validation(_) | SubmissionError::CreateFailed { .. } => None,
            SubmissionError::TransferFailed { record_id, .. }
            | SubmissionError::StartFailed { record_id, .. } => Some(record_id),
        }
    }

    /// The step that failed; `None` for validation failures.
    pub fn failed_step(&self) -> Option<SubmissionStep> {
        match self {
            SubmissionError::Validation(_) => None,
            SubmissionError::CreateFailed { .. } => Some(SubmissionStep::Create),
            SubmissionError::TransferFailed { slot, .. } => Some(slot.step()),
            SubmissionError::StartFailed { .. } => Some(SubmissionStep::Start),
        }
    }

    /// Whether the remaining steps can be retried without a new create.
    pub fn is_resumable(&self) -> bool {
        self.record_id().is_some()
    }

    /// Take the retry checkpoint out of the error.
    pub fn into_pending(self) -> Option<PendingSubmission> {
        match self {
            SubmissionError::TransferFailed { pending, .. }
            | SubmissionError::StartFailed { pending, .. } => Some(*pending),
            _ => None,
        }
    }
}
