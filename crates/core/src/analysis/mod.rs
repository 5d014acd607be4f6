//! Analysis results: fetching the artifact of a finished brief and
//! rendering it.

mod http;
mod render;
mod types;

pub use http::HttpResultFetcher;
pub use render::{render_report, NO_DATA};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{Record, RecordId, RecordStatus, ResultArtifact};

/// Reasons a result cannot be shown. All of them are display-level
/// failures; none of them says anything about the brief's lifecycle.
#[derive(Debug, Error)]
pub enum ResultError {
    /// The brief has not finished successfully.
    #[error("brief {id} has no result yet (status {status})")]
    NotReady { id: RecordId, status: RecordStatus },

    /// The brief is done but the backend recorded no output.
    #[error("brief {0} finished without a stored result")]
    MissingArtifact(RecordId),

    /// The storage URL answered with a non-success status.
    #[error("result artifact unavailable: HTTP {status}")]
    Unavailable { status: u16 },

    /// Artifact fetch failed before a response was received.
    #[error("result fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The artifact is not a usable result document.
    #[error("malformed result document: {0}")]
    Malformed(String),
}

/// Fetches result artifacts from their storage URL.
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Fetch and parse the artifact behind `artifact.url`.
    async fn fetch(&self, artifact: &ResultArtifact) -> Result<AnalysisResult, ResultError>;

    /// Fetch the result of a brief, checking that one should exist first.
    async fn fetch_for_record(&self, record: &Record) -> Result<AnalysisResult, ResultError> {
        if record.status != RecordStatus::Done {
            return Err(ResultError::NotReady {
                id: record.id.clone(),
                status: record.status,
            });
        }
        match &record.result_artifact {
            Some(artifact) => self.fetch(artifact).await,
            None => Err(ResultError::MissingArtifact(record.id.clone())),
        }
    }
}
