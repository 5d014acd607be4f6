//! Mock brief API for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::record::{
    Ack, CreatedRecord, Record, RecordApi, RecordError, RecordId, RecordStatus, RecordSummary,
    ResultArtifact, Subject, TransferTarget, TransferTargets,
};

/// A recorded API call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRecordCall {
    Create { subject: Subject },
    Start { id: RecordId },
    Get { id: RecordId },
    List,
    Delete { id: RecordId },
}

/// In-memory implementation of [`RecordApi`].
///
/// Provides controllable behavior for testing:
/// - Track calls for assertions
/// - Inject a one-shot error per operation
/// - Script the sequence of `get` responses for a brief
/// - Slow down `get` and observe how many run at once
///
/// # Example
///
/// ```rust,ignore
/// use proofbrief_core::testing::MockRecordApi;
///
/// let api = MockRecordApi::new();
/// let created = api.create(&Subject::new("Jane Doe", "Engineer")).await?;
///
/// // Second poll reports completion
/// api.push_get_response(&created.id, Ok(fixtures::record(&created.id, RecordStatus::Pending))).await;
/// api.push_get_response(&created.id, Ok(fixtures::done_record(&created.id))).await;
/// ```
pub struct MockRecordApi {
    records: Arc<RwLock<HashMap<RecordId, Record>>>,
    /// Creation order, newest last.
    order: Arc<RwLock<Vec<RecordId>>>,
    targets: Arc<RwLock<HashMap<RecordId, TransferTargets>>>,
    calls: Arc<RwLock<Vec<RecordedRecordCall>>>,
    next_create_error: Arc<RwLock<Option<RecordError>>>,
    next_start_error: Arc<RwLock<Option<RecordError>>>,
    next_delete_error: Arc<RwLock<Option<RecordError>>>,
    /// Scripted `get` responses, consumed front to back. Once empty, `get`
    /// answers from the stored record.
    get_script: Arc<RwLock<HashMap<RecordId, VecDeque<Result<Record, RecordError>>>>>,
    get_delay_ms: Arc<RwLock<u64>>,
    gets_in_flight: AtomicUsize,
    max_gets_in_flight: AtomicUsize,
}

impl Default for MockRecordApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecordApi {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            order: Arc::new(RwLock::new(Vec::new())),
            targets: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_create_error: Arc::new(RwLock::new(None)),
            next_start_error: Arc::new(RwLock::new(None)),
            next_delete_error: Arc::new(RwLock::new(None)),
            get_script: Arc::new(RwLock::new(HashMap::new())),
            get_delay_ms: Arc::new(RwLock::new(0)),
            gets_in_flight: AtomicUsize::new(0),
            max_gets_in_flight: AtomicUsize::new(0),
        }
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedRecordCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn create_count(&self) -> usize {
        self.count_calls(|c| matches!(c, RecordedRecordCall::Create { .. }))
            .await
    }

    pub async fn start_count(&self) -> usize {
        self.count_calls(|c| matches!(c, RecordedRecordCall::Start { .. }))
            .await
    }

    pub async fn get_count(&self) -> usize {
        self.count_calls(|c| matches!(c, RecordedRecordCall::Get { .. }))
            .await
    }

    async fn count_calls(&self, pred: impl Fn(&RecordedRecordCall) -> bool) -> usize {
        self.calls.read().await.iter().filter(|c| pred(c)).count()
    }

    /// Highest number of `get` calls observed running at the same time.
    pub fn max_concurrent_gets(&self) -> usize {
        self.max_gets_in_flight.load(Ordering::SeqCst)
    }

    /// Write targets issued when the brief was created.
    pub async fn issued_targets(&self, id: &RecordId) -> Option<TransferTargets> {
        self.targets.read().await.get(id).cloned()
    }

    /// Insert or replace a brief directly.
    pub async fn insert_record(&self, record: Record) {
        let id = record.id.clone();
        let mut order = self.order.write().await;
        if !order.contains(&id) {
            order.push(id.clone());
        }
        self.records.write().await.insert(id, record);
    }

    /// Move a stored brief to a new status, as the backend would.
    pub async fn set_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
        artifact: Option<ResultArtifact>,
    ) {
        if let Some(record) = self.records.write().await.get_mut(id) {
            record.status = status;
            record.result_artifact = artifact;
        }
    }

    /// Queue a response for the next unscripted `get` of `id`.
    pub async fn push_get_response(&self, id: &RecordId, response: Result<Record, RecordError>) {
        self.get_script
            .write()
            .await
            .entry(id.clone())
            .or_default()
            .push_back(response);
    }

    pub async fn set_next_create_error(&self, error: RecordError) {
        *self.next_create_error.write().await = Some(error);
    }

    pub async fn set_next_start_error(&self, error: RecordError) {
        *self.next_start_error.write().await = Some(error);
    }

    pub async fn set_next_delete_error(&self, error: RecordError) {
        *self.next_delete_error.write().await = Some(error);
    }

    /// Make every `get` take at least `delay`.
    pub async fn set_get_delay(&self, delay: Duration) {
        *self.get_delay_ms.write().await = delay.as_millis() as u64;
    }

    async fn record_call(&self, call: RecordedRecordCall) {
        self.calls.write().await.push(call);
    }

    async fn scripted_get(&self, id: &RecordId) -> Result<Record, RecordError> {
        let scripted = self
            .get_script
            .write()
            .await
            .get_mut(id)
            .and_then(|queue| queue.pop_front());
        if let Some(response) = scripted {
            return response;
        }

        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RecordError::NotFound(id.clone()))
    }
}

/// Releases the in-flight slot even when the `get` future is dropped.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordApi for MockRecordApi {
    async fn create(&self, subject: &Subject) -> Result<CreatedRecord, RecordError> {
        self.record_call(RecordedRecordCall::Create {
            subject: subject.clone(),
        })
        .await;

        if let Some(error) = self.next_create_error.write().await.take() {
            return Err(error);
        }

        let id = RecordId::new(Uuid::new_v4().to_string());
        let targets = TransferTargets {
            resume: TransferTarget {
                storage_key: format!("briefs/{}/resume.pdf", id),
                write_url: format!("https://storage.test/briefs/{}/resume.pdf?sig=r", id),
            },
            job_description: TransferTarget {
                storage_key: format!("briefs/{}/jd.txt", id),
                write_url: format!("https://storage.test/briefs/{}/jd.txt?sig=j", id),
            },
        };

        self.insert_record(Record {
            id: id.clone(),
            status: RecordStatus::Pending,
            subject: subject.clone(),
            result_artifact: None,
            created_at: Some(chrono::Utc::now()),
        })
        .await;
        self.targets
            .write()
            .await
            .insert(id.clone(), targets.clone());

        Ok(CreatedRecord {
            id,
            transfer_targets: targets,
        })
    }

    async fn start(&self, id: &RecordId) -> Result<Ack, RecordError> {
        self.record_call(RecordedRecordCall::Start { id: id.clone() })
            .await;

        if let Some(error) = self.next_start_error.write().await.take() {
            return Err(error);
        }
        if !self.records.read().await.contains_key(id) {
            return Err(RecordError::NotFound(id.clone()));
        }
        Ok(Ack {
            message: Some("processing started".to_string()),
        })
    }

    async fn get(&self, id: &RecordId) -> Result<Record, RecordError> {
        self.record_call(RecordedRecordCall::Get { id: id.clone() })
            .await;

        let now = self.gets_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_gets_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.gets_in_flight);

        let delay = *self.get_delay_ms.read().await;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.scripted_get(id).await
    }

    async fn list(&self) -> Result<Vec<RecordSummary>, RecordError> {
        self.record_call(RecordedRecordCall::List).await;

        let records = self.records.read().await;
        let order = self.order.read().await;
        Ok(order
            .iter()
            .rev()
            .filter_map(|id| records.get(id).cloned())
            .map(RecordSummary::from)
            .collect())
    }

    async fn delete(&self, id: &RecordId) -> Result<Ack, RecordError> {
        self.record_call(RecordedRecordCall::Delete { id: id.clone() })
            .await;

        if let Some(error) = self.next_delete_error.write().await.take() {
            return Err(error);
        }
        if self.records.write().await.remove(id).is_none() {
            return Err(RecordError::NotFound(id.clone()));
        }
        self.order.write().await.retain(|existing| existing != id);
        self.targets.write().await.remove(id);
        Ok(Ack::default())
    }
}
