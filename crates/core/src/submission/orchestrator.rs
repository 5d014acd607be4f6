//! Submission orchestrator implementation.
//!
//! Drives a brief through create -> upload resume -> upload job description
//! -> start. Each step waits for the previous one to succeed; a failure stops
//! the sequence and reports the step, without retries or compensating
//! deletes.

use std::sync::Arc;

use tracing::{info, warn};

use crate::record::{RecordApi, RecordId};
use crate::transfer::{PresignedTransfer, JOB_DESCRIPTION_CONTENT_TYPE, RESUME_CONTENT_TYPE};

use super::error::{SubmissionError, ValidationError};
use super::types::{
    PendingSubmission, SubmissionProgress, SubmissionRequest, SubmissionStep, TransferSlot,
};

/// Callback invoked after each step commits.
pub type SubmissionProgressCallback = Arc<dyn Fn(&SubmissionProgress) + Send + Sync>;

/// Drives the four-step submission protocol.
pub struct SubmissionOrchestrator {
    records: Arc<dyn RecordApi>,
    transfer: Arc<dyn PresignedTransfer>,
    progress_callback: Option<SubmissionProgressCallback>,
}

impl SubmissionOrchestrator {
    pub fn new(records: Arc<dyn RecordApi>, transfer: Arc<dyn PresignedTransfer>) -> Self {
        Self {
            records,
            transfer,
            progress_callback: None,
        }
    }

    /// Set a callback to observe step progress.
    pub fn with_progress_callback(mut self, callback: SubmissionProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn emit_progress(&self, step: SubmissionStep, record_id: &RecordId) {
        if let Some(ref callback) = self.progress_callback {
            callback(&SubmissionProgress {
                step,
                completed: step.number(),
                total: SubmissionStep::TOTAL,
                record_id: record_id.clone(),
            });
        }
    }

    /// Submit a brief. Returns the id of the started brief.
    ///
    /// Validation happens before any network call.
    pub async fn submit(&self, request: SubmissionRequest) -> Result<RecordId, SubmissionError> {
        request.validate()?;

        let SubmissionRequest {
            subject,
            resume,
            job_description,
        } = request;
        let resume = resume.ok_or(ValidationError::MissingResume)?;

        let created = self
            .records
            .create(&subject)
            .await
            .map_err(|source| {
                warn!("Failed to create brief for '{}': {}", subject.name, source);
                SubmissionError::CreateFailed { source }
            })?;

        info!("Created brief {}", created.id);
        self.emit_progress(SubmissionStep::Create, &created.id);

        let pending = PendingSubmission {
            record_id: created.id,
            targets: created.transfer_targets,
            resume,
            job_description,
            next_step: SubmissionStep::UploadResume,
        };

        self.resume(pending).await
    }

    /// Continue an interrupted submission from the step that failed,
    /// reusing the brief and write targets it was issued.
    pub async fn resume(
        &self,
        mut pending: PendingSubmission,
    ) -> Result<RecordId, SubmissionError> {
        if pending.next_step == SubmissionStep::UploadResume {
            let result = self
                .transfer
                .transfer(
                    &pending.targets.resume.write_url,
                    pending.resume.bytes.clone(),
                    RESUME_CONTENT_TYPE,
                )
                .await;
            if let Err(source) = result {
                warn!("Resume upload failed for brief {}: {}", pending.record_id, source);
                return Err(SubmissionError::TransferFailed {
                    record_id: pending.record_id.clone(),
                    slot: TransferSlot::Resume,
                    source,
                    pending: Box::new(pending),
                });
            }

            info!("Uploaded resume for brief {}", pending.record_id);
            pending.next_step = SubmissionStep::UploadJobDescription;
            self.emit_progress(SubmissionStep::UploadResume, &pending.record_id);
        }

        if pending.next_step == SubmissionStep::UploadJobDescription {
            let result = self
                .transfer
                .transfer(
                    &pending.targets.job_description.write_url,
                    pending.job_description.as_bytes().to_vec(),
                    JOB_DESCRIPTION_CONTENT_TYPE,
                )
                .await;
            if let Err(source) = result {
                warn!(
                    "Job description upload failed for brief {}: {}",
                    pending.record_id, source
                );
                return Err(SubmissionError::TransferFailed {
                    record_id: pending.record_id.clone(),
                    slot: TransferSlot::JobDescription,
                    source,
                    pending: Box::new(pending),
                });
            }

            info!("Uploaded job description for brief {}", pending.record_id);
            pending.next_step = SubmissionStep::Start;
            self.emit_progress(SubmissionStep::UploadJobDescription, &pending.record_id);
        }

        let result = self.records.start(&pending.record_id).await;
        if let Err(source) = result {
            warn!("Failed to start brief {}: {}", pending.record_id, source);
            return Err(SubmissionError::StartFailed {
                record_id: pending.record_id.clone(),
                source,
                pending: Box::new(pending),
            });
        }

        info!("Started processing for brief {}", pending.record_id);
        self.emit_progress(SubmissionStep::Start, &pending.record_id);

        Ok(pending.record_id)
    }
}
