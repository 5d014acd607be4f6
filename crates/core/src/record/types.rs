//! Types for briefs tracked by the backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a brief.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle status of a brief.
///
/// `Pending` is initial; `Done` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,
    Done,
    Error,
}

impl RecordStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Done | RecordStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "PENDING",
            RecordStatus::Done => "DONE",
            RecordStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifying metadata supplied at creation: candidate name and job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub title: String,
}

impl Subject {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}

/// Reference to the analysis output of a finished brief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultArtifact {
    /// Storage key of the artifact.
    pub key: String,
    /// Directly fetchable URL; the URL itself carries the authorization.
    pub url: String,
}

/// Full view of a brief as returned by `GET /briefs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub status: RecordStatus,
    pub subject: Subject,
    /// Only present once `status` is `Done`, and even then may be missing
    /// if the backend failed to persist the output.
    pub result_artifact: Option<ResultArtifact>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// List entry: a record without its result artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub status: RecordStatus,
    pub subject: Subject,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Record> for RecordSummary {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            status: record.status,
            subject: record.subject,
            created_at: record.created_at,
        }
    }
}

/// One-time authorization to write a single payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTarget {
    pub storage_key: String,
    pub write_url: String,
}

/// The pair of write targets issued at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTargets {
    pub resume: TransferTarget,
    pub job_description: TransferTarget,
}

/// Result of a successful create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub id: RecordId,
    pub transfer_targets: TransferTargets,
}

/// Acknowledgement of a lifecycle call (start, delete).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub message: Option<String>,
}
