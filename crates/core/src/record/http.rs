//! HTTP implementation of the brief API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{Ack, CreatedRecord, Record, RecordId, RecordSummary, Subject};
use super::wire::{self, CreateBriefBody, CreateResponse, RecordWire};
use super::{RecordApi, RecordError};
use crate::auth::CredentialProvider;
use crate::config::ApiConfig;

/// Collection path under the API base URL.
const BRIEFS_PATH: &str = "briefs";

/// Brief API client.
pub struct HttpRecordClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpRecordClient {
    /// Create a new client.
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, RecordError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, BRIEFS_PATH)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            BRIEFS_PATH,
            urlencoding::encode(id.as_str())
        )
    }

    /// Attach the bearer credential if one is available.
    ///
    /// Credential failures do not block the request; the backend decides.
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.current_credential().await {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(e) => {
                warn!(
                    "Credential lookup via '{}' failed, sending request unauthenticated: {}",
                    self.credentials.method_name(),
                    e
                );
                request
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> Result<T, RecordError> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| RecordError::Parse(format!("Failed to parse {} response: {}", what, e)))
    }

    async fn parse_ack(response: Response) -> Result<Ack, RecordError> {
        let body = response.text().await.unwrap_or_default();
        Ok(Ack {
            message: wire::structured_message(&body),
        })
    }

    /// Read an error response into (status, message). The message is the
    /// server's `message` field when present, the raw body otherwise.
    async fn read_error(response: Response) -> (u16, Option<String>, String) {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, wire::structured_message(&body), body)
    }

    async fn api_error(response: Response) -> RecordError {
        let (status, message, raw) = Self::read_error(response).await;
        RecordError::Api {
            status,
            message: message.unwrap_or(raw),
        }
    }
}

#[async_trait]
impl RecordApi for HttpRecordClient {
    async fn create(&self, subject: &Subject) -> Result<CreatedRecord, RecordError> {
        let url = self.collection_url();

        debug!(
            "Creating brief: name='{}', title='{}'",
            subject.name, subject.title
        );

        let request = self
            .client
            .post(&url)
            .json(&CreateBriefBody::from(subject));
        let response = self.authorize(request).await.send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let created: CreateResponse = Self::parse_json(response, "create").await?;
        Ok(created.into())
    }

    async fn start(&self, id: &RecordId) -> Result<Ack, RecordError> {
        let url = format!("{}/start", self.record_url(id));

        debug!("Starting brief: id={}", id);

        let request = self.client.put(&url);
        let response = self.authorize(request).await.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RecordError::NotFound(id.clone()));
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        Self::parse_ack(response).await
    }

    async fn get(&self, id: &RecordId) -> Result<Record, RecordError> {
        let url = self.record_url(id);

        debug!("Fetching brief: id={}", id);

        let request = self.client.get(&url);
        let response = self.authorize(request).await.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RecordError::NotFound(id.clone()));
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let record: RecordWire = Self::parse_json(response, "brief").await?;
        Ok(record.into())
    }

    async fn list(&self) -> Result<Vec<RecordSummary>, RecordError> {
        let url = self.collection_url();

        debug!("Listing briefs");

        let request = self.client.get(&url);
        let response = self.authorize(request).await.send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let records: Vec<RecordWire> = Self::parse_json(response, "list").await?;
        Ok(records.into_iter().map(RecordSummary::from).collect())
    }

    async fn delete(&self, id: &RecordId) -> Result<Ack, RecordError> {
        let url = self.record_url(id);

        debug!("Deleting brief: id={}", id);

        let request = self.client.delete(&url);
        let response = self.authorize(request).await.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RecordError::NotFound(id.clone()));
        }
        if status.is_client_error() {
            let (status, message, _) = Self::read_error(response).await;
            return Err(RecordError::DeleteRejected {
                status,
                message: message.unwrap_or_else(|| {
                    format!("The brief could not be deleted (HTTP {})", status)
                }),
            });
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        Self::parse_ack(response).await
    }
}
