//! Direct payload writes to pre-authorized storage URLs.
//!
//! A transfer is one network write of the whole payload. There is no retry or
//! chunking here; callers decide whether to try again against the same target.

mod http;

pub use http::HttpTransferClient;

use async_trait::async_trait;
use thiserror::Error;

/// Content type the resume write URL is signed for.
pub const RESUME_CONTENT_TYPE: &str = "application/pdf";

/// Content type the job description write URL is signed for.
pub const JOB_DESCRIPTION_CONTENT_TYPE: &str = "text/plain";

/// Errors that can occur during a payload transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The destination answered with a non-success status.
    #[error("destination rejected the write: HTTP {status}")]
    Rejected { status: u16, body: String },

    /// The write never got a response.
    #[error("transfer request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransferError {
    /// HTTP status returned by the destination, if one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            TransferError::Rejected { status, .. } => Some(*status),
            TransferError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Writes a payload to a single-use write URL.
///
/// Writing the same payload to the same target twice is safe: the second
/// write overwrites the first with identical bytes.
#[async_trait]
pub trait PresignedTransfer: Send + Sync {
    async fn transfer(
        &self,
        write_url: &str,
        payload: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransferError>;
}
