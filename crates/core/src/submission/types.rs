//! Types for the brief submission workflow.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::record::{RecordId, Subject, TransferTargets};
use crate::transfer::RESUME_CONTENT_TYPE;

use super::error::ValidationError;

/// Fallback content type for files that are not recognisably PDF.
const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Resume document to upload.
#[derive(Clone)]
pub struct ResumePayload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ResumePayload {
    pub fn new(file_name: Option<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type: content_type.into(),
            bytes,
        }
    }

    /// A PDF payload without a file name.
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self::new(None, RESUME_CONTENT_TYPE, bytes)
    }

    /// Read a resume from disk, inferring the content type from the
    /// extension or the `%PDF-` header.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let content_type = infer_content_type(path, &bytes);
        Ok(Self::new(file_name, content_type, bytes))
    }

    /// Whether the declared type is the accepted one (`application/pdf`).
    pub fn is_pdf(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(RESUME_CONTENT_TYPE))
    }
}

impl fmt::Debug for ResumePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumePayload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn infer_content_type(path: &Path, bytes: &[u8]) -> &'static str {
    let pdf_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if pdf_extension || bytes.starts_with(b"%PDF-") {
        RESUME_CONTENT_TYPE
    } else {
        UNKNOWN_CONTENT_TYPE
    }
}

/// Everything needed to submit a brief.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub subject: Subject,
    pub resume: Option<ResumePayload>,
    pub job_description: String,
}

impl SubmissionRequest {
    pub fn new(subject: Subject, resume: ResumePayload, job_description: impl Into<String>) -> Self {
        Self {
            subject,
            resume: Some(resume),
            job_description: job_description.into(),
        }
    }

    /// Check the request without touching the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subject.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.subject.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let resume = match &self.resume {
            Some(resume) if !resume.bytes.is_empty() => resume,
            _ => return Err(ValidationError::MissingResume),
        };
        if !resume.is_pdf() {
            return Err(ValidationError::UnsupportedResumeType(
                resume.content_type.clone(),
            ));
        }
        if self.job_description.trim().is_empty() {
            return Err(ValidationError::EmptyJobDescription);
        }
        Ok(())
    }
}

/// The four network steps of a submission, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStep {
    Create,
    UploadResume,
    UploadJobDescription,
    Start,
}

impl SubmissionStep {
    pub const TOTAL: usize = 4;

    /// 1-based position of the step.
    pub fn number(&self) -> usize {
        match self {
            SubmissionStep::Create => 1,
            SubmissionStep::UploadResume => 2,
            SubmissionStep::UploadJobDescription => 3,
            SubmissionStep::Start => 4,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SubmissionStep::Create => "create brief",
            SubmissionStep::UploadResume => "upload resume",
            SubmissionStep::UploadJobDescription => "upload job description",
            SubmissionStep::Start => "start processing",
        }
    }
}

impl fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Which of the two write targets a transfer was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferSlot {
    Resume,
    JobDescription,
}

impl TransferSlot {
    pub fn step(&self) -> SubmissionStep {
        match self {
            TransferSlot::Resume => SubmissionStep::UploadResume,
            TransferSlot::JobDescription => SubmissionStep::UploadJobDescription,
        }
    }
}

impl fmt::Display for TransferSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferSlot::Resume => f.write_str("resume"),
            TransferSlot::JobDescription => f.write_str("job description"),
        }
    }
}

/// Progress signal emitted after each step commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionProgress {
    pub step: SubmissionStep,
    pub completed: usize,
    pub total: usize,
    pub record_id: RecordId,
}

/// A submission interrupted after the brief was created.
///
/// Holds the targets and payloads of that one attempt so the remaining
/// steps can be retried without creating a second brief. It is handed back
/// inside the error and never retained by the orchestrator.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub(crate) record_id: RecordId,
    pub(crate) targets: TransferTargets,
    pub(crate) resume: ResumePayload,
    pub(crate) job_description: String,
    pub(crate) next_step: SubmissionStep,
}

impl PendingSubmission {
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// The step a retry will begin with.
    pub fn next_step(&self) -> SubmissionStep {
        self.next_step
    }

    pub fn targets(&self) -> &TransferTargets {
        &self.targets
    }
}
