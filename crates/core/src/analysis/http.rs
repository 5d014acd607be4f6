use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::AnalysisResult;
use super::{ResultError, ResultFetcher};
use crate::config::ApiConfig;
use crate::record::ResultArtifact;

/// Plain `GET` of the artifact URL, without an authorization header.
pub struct HttpResultFetcher {
    client: Client,
}

impl HttpResultFetcher {
    pub fn new(config: &ApiConfig) -> Result<Self, ResultError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResultFetcher for HttpResultFetcher {
    async fn fetch(&self, artifact: &ResultArtifact) -> Result<AnalysisResult, ResultError> {
        debug!("Fetching result artifact: key={}", artifact.key);

        let response = self.client.get(&artifact.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResultError::Unavailable {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        AnalysisResult::from_slice(&bytes)
    }
}
