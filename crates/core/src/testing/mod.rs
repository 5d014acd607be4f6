//! Testing utilities and in-memory implementations of the network traits.
//!
//! The mocks let the orchestrator and poller be exercised without a backend
//! or a storage service.
//!
//! # Example
//!
//! ```rust,ignore
//! use proofbrief_core::testing::{MockRecordApi, MockTransfer};
//!
//! let records = Arc::new(MockRecordApi::new());
//! let transfer = Arc::new(MockTransfer::new());
//!
//! // Make the resume upload fail once
//! transfer.fail_next(TransferError::Rejected { status: 403, body: String::new() }).await;
//!
//! let orchestrator = SubmissionOrchestrator::new(records.clone(), transfer.clone());
//! ```

mod mock_record_api;
mod mock_transfer;

pub use mock_record_api::{MockRecordApi, RecordedRecordCall};
pub use mock_transfer::{MockTransfer, RecordedTransfer};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::record::{Record, RecordId, RecordStatus, ResultArtifact, Subject};

    /// A brief for Jane Doe with the given status and no artifact.
    pub fn record(id: impl Into<RecordId>, status: RecordStatus) -> Record {
        Record {
            id: id.into(),
            status,
            subject: Subject::new("Jane Doe", "Engineer"),
            result_artifact: None,
            created_at: None,
        }
    }

    /// A finished brief whose artifact lives at `https://storage.test/{id}/final.json`.
    pub fn done_record(id: impl Into<RecordId>) -> Record {
        let mut record = record(id, RecordStatus::Done);
        record.result_artifact = Some(artifact(&record.id));
        record
    }

    pub fn artifact(id: &RecordId) -> ResultArtifact {
        ResultArtifact {
            key: format!("briefs/{}/final.json", id),
            url: format!("https://storage.test/briefs/{}/final.json", id),
        }
    }

    /// An analysis document in the shape the backend writes.
    pub fn analysis_json(final_score: f64, questions: usize) -> serde_json::Value {
        let screening_questions: Vec<String> = (1..=questions)
            .map(|n| format!("Screening question {}?", n))
            .collect();
        serde_json::json!({
            "summary": ["Seasoned engineer", "Strong systems background"],
            "evidence_highlights": [{
                "claim": "Led a storage migration",
                "evidence_url": "https://example.com/talk",
                "justification": "Conference talk describes the project"
            }],
            "risk_flags": ["Short tenure at last role"],
            "screening_questions": screening_questions,
            "final_score": final_score
        })
    }
}
