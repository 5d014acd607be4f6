//! Mock presigned transfer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transfer::{PresignedTransfer, TransferError};

/// A recorded transfer attempt for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub write_url: String,
    pub payload: Vec<u8>,
    pub content_type: String,
}

/// Mock implementation of [`PresignedTransfer`].
///
/// Every attempt is recorded, including the ones made to fail.
#[derive(Debug, Default)]
pub struct MockTransfer {
    transfers: Arc<RwLock<Vec<RecordedTransfer>>>,
    /// Failures keyed by 1-based attempt number.
    failures: Arc<RwLock<HashMap<usize, TransferError>>>,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded_transfers(&self) -> Vec<RecordedTransfer> {
        self.transfers.read().await.clone()
    }

    pub async fn transfer_count(&self) -> usize {
        self.transfers.read().await.len()
    }

    /// Payload last written to `write_url`, if any.
    pub async fn payload_for(&self, write_url: &str) -> Option<Vec<u8>> {
        self.transfers
            .read()
            .await
            .iter()
            .rev()
            .find(|t| t.write_url == write_url)
            .map(|t| t.payload.clone())
    }

    /// Fail the next attempt.
    pub async fn fail_next(&self, error: TransferError) {
        let next = self.transfers.read().await.len() + 1;
        self.failures.write().await.insert(next, error);
    }

    /// Fail the `n`th attempt overall (1-based).
    pub async fn fail_nth(&self, n: usize, error: TransferError) {
        self.failures.write().await.insert(n, error);
    }
}

#[async_trait]
impl PresignedTransfer for MockTransfer {
    async fn transfer(
        &self,
        write_url: &str,
        payload: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransferError> {
        let attempt = {
            let mut transfers = self.transfers.write().await;
            transfers.push(RecordedTransfer {
                write_url: write_url.to_string(),
                payload,
                content_type: content_type.to_string(),
            });
            transfers.len()
        };

        match self.failures.write().await.remove(&attempt) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_payload_for_returns_latest_write() {
        let transfer = MockTransfer::new();
        transfer
            .transfer("https://storage.test/jd", b"first".to_vec(), "text/plain")
            .await
            .unwrap();
        transfer
            .transfer("https://storage.test/jd", b"second".to_vec(), "text/plain")
            .await
            .unwrap();

        assert_eq!(
            transfer.payload_for("https://storage.test/jd").await,
            Some(b"second".to_vec())
        );
        assert_eq!(transfer.payload_for("https://storage.test/other").await, None);
    }

    #[tokio::test]
    async fn test_failed_attempt_is_still_recorded() {
        let transfer = MockTransfer::new();
        transfer
            .fail_next(TransferError::Rejected {
                status: 403,
                body: "AccessDenied".to_string(),
            })
            .await;

        let err = transfer
            .transfer("https://storage.test/cv", b"%PDF".to_vec(), "application/pdf")
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(403));
        assert_eq!(transfer.transfer_count().await, 1);
        assert_eq!(
            transfer.payload_for("https://storage.test/cv").await,
            Some(b"%PDF".to_vec())
        );
    }
}

