//! Plain-text rendering of an analysis result.

use std::fmt::Write;

use super::types::{AnalysisResult, MAX_SCORE};

/// Placeholder shown for every missing section or field.
pub const NO_DATA: &str = "no data";

fn section<'a, I>(out: &mut String, title: &str, lines: I, numbered: bool)
where
    I: IntoIterator<Item = &'a String>,
{
    let _ = writeln!(out, "{}:", title);
    let mut any = false;
    for (i, line) in lines.into_iter().enumerate() {
        any = true;
        if numbered {
            let _ = writeln!(out, "  {}. {}", i + 1, line);
        } else {
            let _ = writeln!(out, "  - {}", line);
        }
    }
    if !any {
        let _ = writeln!(out, "  {}", NO_DATA);
    }
}

/// Render a result as a human-readable report.
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();

    match result.final_score {
        Some(score) => {
            let _ = writeln!(out, "Score: {}/{}", score.round(), MAX_SCORE);
        }
        None => {
            let _ = writeln!(out, "Score: {}", NO_DATA);
        }
    }
    out.push('\n');

    section(&mut out, "Summary", &result.summary, false);
    out.push('\n');

    let _ = writeln!(out, "Evidence:");
    if result.evidence_highlights.is_empty() {
        let _ = writeln!(out, "  {}", NO_DATA);
    }
    for item in &result.evidence_highlights {
        let claim = if item.claim.is_empty() {
            NO_DATA
        } else {
            item.claim.as_str()
        };
        let _ = writeln!(out, "  - {}", claim);
        let _ = writeln!(
            out,
            "    source: {}",
            item.evidence_url.as_deref().unwrap_or(NO_DATA)
        );
        let _ = writeln!(
            out,
            "    why: {}",
            item.justification.as_deref().unwrap_or(NO_DATA)
        );
    }
    out.push('\n');

    section(&mut out, "Risks", &result.risk_flags, false);
    out.push('\n');

    section(
        &mut out,
        "Screening questions",
        &result.screening_questions,
        true,
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EvidenceItem;

    #[test]
    fn test_render_empty_result() {
        let report = render_report(&AnalysisResult::default());
        assert!(report.contains("Score: no data"));
        // summary, evidence, risks, questions
        assert_eq!(report.matches(NO_DATA).count(), 5);
    }

    #[test]
    fn test_render_full_result() {
        let result = AnalysisResult {
            summary: vec!["Good fit".to_string()],
            evidence_highlights: vec![EvidenceItem {
                claim: "Built a database".to_string(),
                evidence_url: Some("https://github.com/jane/db".to_string()),
                justification: None,
            }],
            risk_flags: vec!["No on-call experience".to_string()],
            screening_questions: vec!["Why Rust?".to_string(), "Hardest bug?".to_string()],
            final_score: Some(74.0),
        };

        let report = render_report(&result);
        assert!(report.contains("Score: 74/100"));
        assert!(report.contains("  - Good fit"));
        assert!(report.contains("source: https://github.com/jane/db"));
        assert!(report.contains("why: no data"));
        assert!(report.contains("  2. Hardest bug?"));
    }
}
