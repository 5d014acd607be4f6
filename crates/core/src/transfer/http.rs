use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use super::{PresignedTransfer, TransferError};
use crate::config::ApiConfig;

/// Transfer client issuing a single `PUT` per payload.
///
/// No authorization header is attached; the write URL carries its own.
pub struct HttpTransferClient {
    client: Client,
}

impl HttpTransferClient {
    pub fn new(config: &ApiConfig) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PresignedTransfer for HttpTransferClient {
    async fn transfer(
        &self,
        write_url: &str,
        payload: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransferError> {
        debug!(
            "Transferring {} bytes ({}) to storage",
            payload.len(),
            content_type
        );

        let response = self
            .client
            .put(write_url)
            .header(CONTENT_TYPE, content_type)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
