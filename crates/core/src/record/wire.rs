//! JSON shapes exchanged with the brief API.
//!
//! Field names follow the documented contract (`id`, `transferTargets`,
//! `jobDescription`, `writeUrl`, `resultArtifact`); the names emitted by the
//! deployed backend (`briefId`, `uploads`, `jd`, `putUrl`, `final`) are
//! accepted as aliases.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{
    CreatedRecord, Record, RecordId, RecordStatus, RecordSummary, ResultArtifact, Subject,
    TransferTarget, TransferTargets,
};

#[derive(Debug, Serialize)]
pub(crate) struct CreateBriefBody<'a> {
    pub candidate: CandidateBody<'a>,
    pub job: JobBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CandidateBody<'a> {
    pub full_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct JobBody<'a> {
    pub title: &'a str,
}

impl<'a> From<&'a Subject> for CreateBriefBody<'a> {
    fn from(subject: &'a Subject) -> Self {
        Self {
            candidate: CandidateBody {
                full_name: &subject.name,
            },
            job: JobBody {
                title: &subject.title,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateResponse {
    #[serde(alias = "briefId")]
    pub id: String,
    #[serde(alias = "uploads")]
    pub transfer_targets: TargetsWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TargetsWire {
    pub resume: TargetWire,
    #[serde(alias = "jd")]
    pub job_description: TargetWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TargetWire {
    pub key: String,
    #[serde(alias = "putUrl")]
    pub write_url: String,
}

impl From<TargetWire> for TransferTarget {
    fn from(wire: TargetWire) -> Self {
        Self {
            storage_key: wire.key,
            write_url: wire.write_url,
        }
    }
}

impl From<CreateResponse> for CreatedRecord {
    fn from(wire: CreateResponse) -> Self {
        Self {
            id: RecordId::new(wire.id),
            transfer_targets: TransferTargets {
                resume: wire.transfer_targets.resume.into(),
                job_description: wire.transfer_targets.job_description.into(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordWire {
    #[serde(alias = "briefId")]
    pub id: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub subject: Option<Subject>,
    #[serde(default)]
    pub candidate: Option<CandidateWire>,
    #[serde(default)]
    pub job: Option<JobWire>,
    #[serde(default, rename = "final", alias = "resultArtifact")]
    pub result_artifact: Option<ResultArtifact>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateWire {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobWire {
    #[serde(default)]
    pub title: Option<String>,
}

impl RecordWire {
    fn subject(&mut self) -> Subject {
        if let Some(subject) = self.subject.take() {
            return subject;
        }
        Subject {
            name: self
                .candidate
                .take()
                .and_then(|c| c.name)
                .unwrap_or_default(),
            title: self.job.take().and_then(|j| j.title).unwrap_or_default(),
        }
    }
}

impl From<RecordWire> for Record {
    fn from(mut wire: RecordWire) -> Self {
        let subject = wire.subject();
        Self {
            id: RecordId::new(wire.id),
            status: wire.status,
            subject,
            result_artifact: wire.result_artifact,
            created_at: wire.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

impl From<RecordWire> for RecordSummary {
    fn from(wire: RecordWire) -> Self {
        Record::from(wire).into()
    }
}

/// Error body returned by the API: `{"message": ...}` or `{"error": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Extract a server-supplied message from an error body, if it has one.
pub(crate) fn structured_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Parse a display-only timestamp. Accepts RFC 3339 and naive ISO 8601
/// (assumed UTC); anything else is dropped.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
