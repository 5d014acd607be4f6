//! Brief submission: validate, create, upload both documents, start.

mod error;
mod orchestrator;
mod types;

pub use error::{SubmissionError, ValidationError};
pub use orchestrator::{SubmissionOrchestrator, SubmissionProgressCallback};
pub use types::{
    PendingSubmission, ResumePayload, SubmissionProgress, SubmissionRequest, SubmissionStep,
    TransferSlot,
};
