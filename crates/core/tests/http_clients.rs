//! HTTP clients against the in-process fake backend.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::FakeBackend;
use proofbrief_core::auth::{EnvTokenProvider, NoCredentials, StaticTokenProvider};
use proofbrief_core::record::ResultArtifact;
use proofbrief_core::{
    CredentialProvider, HttpRecordClient, HttpResultFetcher, HttpTransferClient,
    PresignedTransfer, RecordApi, RecordError, RecordId, RecordStatus, ResultError,
    ResultFetcher, Subject, TransferError,
};

fn record_client(backend: &FakeBackend, credentials: Arc<dyn CredentialProvider>) -> HttpRecordClient {
    HttpRecordClient::new(&backend.api_config(), credentials).unwrap()
}

fn anonymous_client(backend: &FakeBackend) -> HttpRecordClient {
    record_client(backend, Arc::new(NoCredentials::new()))
}

#[tokio::test]
async fn test_create_then_get() {
    let backend = FakeBackend::start().await;
    let client = anonymous_client(&backend);

    let created = client
        .create(&Subject::new("Jane Doe", "Engineer"))
        .await
        .unwrap();
    assert!(created
        .transfer_targets
        .resume
        .storage_key
        .ends_with("resume_original.pdf"));
    assert_ne!(
        created.transfer_targets.resume.write_url,
        created.transfer_targets.job_description.write_url
    );

    let record = client.get(&created.id).await.unwrap();
    assert_eq!(record.id, created.id);
    assert_eq!(record.status, RecordStatus::Pending);
    assert_eq!(record.subject, Subject::new("Jane Doe", "Engineer"));
    assert!(record.result_artifact.is_none());
    assert!(record.created_at.is_some());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let backend = FakeBackend::start().await;
    backend.seed_brief("b-1", "Ada", "Engineer").await;
    backend.seed_brief("b-2", "Grace", "Admiral").await;
    let client = anonymous_client(&backend);

    let summaries = client.list().await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["b-2", "b-1"]);
    assert_eq!(summaries[0].subject.name, "Grace");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let backend = FakeBackend::start().await;
    let client = anonymous_client(&backend);
    let id = RecordId::new("missing");

    assert!(matches!(client.get(&id).await, Err(RecordError::NotFound(_))));
    assert!(matches!(client.start(&id).await, Err(RecordError::NotFound(_))));
    assert!(matches!(client.delete(&id).await, Err(RecordError::NotFound(_))));
}

#[tokio::test]
async fn test_create_server_error_carries_message() {
    let backend = FakeBackend::start().await;
    backend.fail_create_with(500).await;
    let client = anonymous_client(&backend);

    let err = client
        .create(&Subject::new("Jane Doe", "Engineer"))
        .await
        .unwrap_err();
    match err {
        RecordError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to create brief");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let backend = FakeBackend::start().await;
    backend.seed_brief("b-1", "Ada", "Engineer").await;
    let client = anonymous_client(&backend);
    let id = RecordId::new("b-1");

    let ack = client.delete(&id).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Brief deleted"));
    assert!(matches!(client.get(&id).await, Err(RecordError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_rejected_with_server_message() {
    let backend = FakeBackend::start().await;
    backend.seed_brief("b-1", "Ada", "Engineer").await;
    backend
        .reject_deletes_with(409, json!({"message": "Brief is still processing"}))
        .await;
    let client = anonymous_client(&backend);

    let err = client.delete(&RecordId::new("b-1")).await.unwrap_err();
    match err {
        RecordError::DeleteRejected { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Brief is still processing");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(backend.brief_count().await, 1);
}

#[tokio::test]
async fn test_delete_rejected_without_message_gets_generic_text() {
    let backend = FakeBackend::start().await;
    backend.seed_brief("b-1", "Ada", "Engineer").await;
    backend.reject_deletes_with(403, json!({"detail": 1})).await;
    let client = anonymous_client(&backend);

    let err = client.delete(&RecordId::new("b-1")).await.unwrap_err();
    assert!(matches!(
        err,
        RecordError::DeleteRejected { status: 403, ref message }
            if message == "The brief could not be deleted (HTTP 403)"
    ));
}

#[tokio::test]
async fn test_static_token_is_sent_as_bearer() {
    let backend = FakeBackend::start().await;
    let client = record_client(
        &backend,
        Arc::new(StaticTokenProvider::new("secret".to_string())),
    );

    client.list().await.unwrap();
    assert_eq!(
        backend.auth_headers().await,
        vec![Some("Bearer secret".to_string())]
    );
}

#[tokio::test]
async fn test_missing_credential_fails_open() {
    let backend = FakeBackend::start().await;
    let client = record_client(
        &backend,
        Arc::new(EnvTokenProvider::new(
            "PROOFBRIEF_IT_TOKEN_THAT_IS_NEVER_SET_9137".to_string(),
        )),
    );

    // The request still goes out, just without a header.
    client.list().await.unwrap();
    assert_eq!(backend.auth_headers().await, vec![None]);
}

#[tokio::test]
async fn test_transfer_writes_exact_content_type() {
    let backend = FakeBackend::start().await;
    let transfer = HttpTransferClient::new(&backend.api_config()).unwrap();
    let url = format!("{}/storage/jobs/j-1/jd.txt", backend.base_url);

    transfer
        .transfer(&url, b"Rust engineer wanted".to_vec(), "text/plain")
        .await
        .unwrap();

    let object = backend.object("jobs/j-1/jd.txt").await.unwrap();
    assert_eq!(object.content_type.as_deref(), Some("text/plain"));
    assert_eq!(object.body, b"Rust engineer wanted");
    // Storage writes carry no API credential.
    assert!(backend.auth_headers().await.is_empty());
}

#[tokio::test]
async fn test_transfer_rejection_keeps_body() {
    let backend = FakeBackend::start().await;
    backend.reject_storage_writes_to(".pdf").await;
    let transfer = HttpTransferClient::new(&backend.api_config()).unwrap();
    let url = format!("{}/storage/candidates/c-1/resume_original.pdf", backend.base_url);

    let err = transfer
        .transfer(&url, b"%PDF-1.7".to_vec(), "application/pdf")
        .await
        .unwrap_err();
    match err {
        TransferError::Rejected { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("AccessDenied"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_result_fetch_for_finished_brief() {
    let backend = FakeBackend::start().await;
    let client = anonymous_client(&backend);
    let created = client
        .create(&Subject::new("Jane Doe", "Engineer"))
        .await
        .unwrap();
    client.start(&created.id).await.unwrap();
    let record = client.get(&created.id).await.unwrap();
    assert_eq!(record.status, RecordStatus::Done);

    let fetcher = HttpResultFetcher::new(&backend.api_config()).unwrap();
    let result = fetcher.fetch_for_record(&record).await.unwrap();
    assert_eq!(result.final_score, Some(74.0));
    assert_eq!(result.screening_questions.len(), 4);
}

#[tokio::test]
async fn test_done_without_artifact_is_missing() {
    let backend = FakeBackend::start().await;
    backend.set_result_document(None).await;
    let client = anonymous_client(&backend);
    let created = client
        .create(&Subject::new("Jane Doe", "Engineer"))
        .await
        .unwrap();
    client.start(&created.id).await.unwrap();
    let record = client.get(&created.id).await.unwrap();

    assert_eq!(record.status, RecordStatus::Done);
    assert!(record.result_artifact.is_none());

    let fetcher = HttpResultFetcher::new(&backend.api_config()).unwrap();
    assert!(matches!(
        fetcher.fetch_for_record(&record).await,
        Err(ResultError::MissingArtifact(_))
    ));
}

#[tokio::test]
async fn test_artifact_url_not_found_is_unavailable() {
    let backend = FakeBackend::start().await;
    let fetcher = HttpResultFetcher::new(&backend.api_config()).unwrap();
    let artifact = ResultArtifact {
        key: "briefs/gone/final.json".to_string(),
        url: format!("{}/storage/briefs/gone/final.json", backend.base_url),
    };

    assert!(matches!(
        fetcher.fetch(&artifact).await,
        Err(ResultError::Unavailable { status: 404 })
    ));
}
