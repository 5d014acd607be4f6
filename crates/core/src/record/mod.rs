//! Brief records: typed access to the create / start / get / list / delete
//! endpoints of the brief API.

mod http;
mod types;
mod wire;

pub use http::HttpRecordClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when calling the brief API.
#[derive(Debug, Error)]
pub enum RecordError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Unknown id, or a brief the caller may not see (404).
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The backend refused to delete the brief (policy, not protocol).
    #[error("delete rejected ({status}): {message}")]
    DeleteRejected { status: u16, message: String },

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl RecordError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RecordError::Http(e) => e.status().map(|s| s.as_u16()),
            RecordError::NotFound(_) => Some(404),
            RecordError::DeleteRejected { status, .. } | RecordError::Api { status, .. } => {
                Some(*status)
            }
            RecordError::Parse(_) => None,
        }
    }
}

/// Lifecycle operations on briefs.
///
/// Implemented over HTTP by [`HttpRecordClient`] and in memory by
/// `testing::MockRecordApi`.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Create a brief and obtain its two write targets.
    async fn create(&self, subject: &Subject) -> Result<CreatedRecord, RecordError>;

    /// Ask the backend to begin processing an uploaded brief.
    async fn start(&self, id: &RecordId) -> Result<Ack, RecordError>;

    /// Fetch the current state of a brief.
    async fn get(&self, id: &RecordId) -> Result<Record, RecordError>;

    /// List the caller's briefs in server order (newest first).
    async fn list(&self) -> Result<Vec<RecordSummary>, RecordError>;

    /// Delete a brief. Rejection by backend policy is `RecordError::DeleteRejected`.
    async fn delete(&self, id: &RecordId) -> Result<Ack, RecordError>;
}
