//! Text rendering for brief records, watch updates and submission progress.

use chrono::{DateTime, Utc};

use proofbrief_core::poller::{PollerState, WatchSnapshot};
use proofbrief_core::submission::{SubmissionError, SubmissionProgress, SubmissionStep};
use proofbrief_core::{Record, RecordSummary};

const NONE: &str = "-";

fn format_created(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| NONE.to_string())
}

/// One line per committed submission step.
pub fn progress_line(progress: &SubmissionProgress) -> String {
    format!(
        "[{}/{}] {} ... ok",
        progress.completed, progress.total, progress.step
    )
}

/// Vertical card for a single brief.
pub fn record_card(record: &Record) -> String {
    let result = match &record.result_artifact {
        Some(artifact) => artifact.key.clone(),
        None => NONE.to_string(),
    };
    let rows = [
        ("Brief", record.id.to_string()),
        ("Status", record.status.to_string()),
        ("Candidate", record.subject.name.clone()),
        ("Role", record.subject.title.clone()),
        ("Created", format_created(record.created_at)),
        ("Result", result),
    ];

    rows.iter()
        .map(|(label, value)| format!("{:<10} {}", format!("{}:", label), value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Table of briefs in server order.
pub fn records_table(summaries: &[RecordSummary]) -> String {
    if summaries.is_empty() {
        return "No briefs.".to_string();
    }

    let header = ["ID", "STATUS", "CANDIDATE", "ROLE", "CREATED"];
    let rows: Vec<[String; 5]> = summaries
        .iter()
        .map(|s| {
            [
                s.id.to_string(),
                s.status.to_string(),
                s.subject.name.clone(),
                s.subject.title.clone(),
                format_created(s.created_at),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(&header.map(str::to_string))];
    lines.extend(rows.iter().map(|row| render(row)));
    lines.join("\n")
}

/// One line describing a watch update.
pub fn snapshot_line(snapshot: &WatchSnapshot) -> String {
    let status = snapshot
        .record
        .as_ref()
        .map(|r| r.status.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match (snapshot.state, &snapshot.last_error) {
        (PollerState::Idle, _) => format!("{}: waiting", snapshot.record_id),
        (PollerState::Watching, Some(error)) => format!(
            "[{}] {} (still {}, retrying)",
            snapshot.attempts, error, status
        ),
        (PollerState::Watching, None) => format!("[{}] {}", snapshot.attempts, status),
        (PollerState::Settled, _) => {
            format!("[{}] {} (settled)", snapshot.attempts, status)
        }
        (PollerState::Cancelled, _) => format!("[{}] watch cancelled", snapshot.attempts),
        (PollerState::TimedOut, _) => format!(
            "[{}] gave up waiting, last status {}",
            snapshot.attempts, status
        ),
    }
}

/// Turn a submission failure into a message that says which step failed and
/// what exists on the server as a result.
pub fn submission_failure(err: SubmissionError) -> anyhow::Error {
    let context = match (err.failed_step(), err.record_id()) {
        (None, _) => "Submission rejected before contacting the server".to_string(),
        (Some(SubmissionStep::Create), _) => "Could not create the brief".to_string(),
        (Some(step), Some(id)) => format!(
            "Brief {} exists but step {}/{} ({}) failed; retry with --retries or delete it with `proofbrief delete {}`",
            id,
            step.number(),
            SubmissionStep::TOTAL,
            step,
            id
        ),
        (Some(step), None) => format!("Submission failed at step: {}", step),
    };
    anyhow::Error::new(err).context(context)
}
