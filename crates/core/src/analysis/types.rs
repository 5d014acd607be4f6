//! Analysis result produced by the backend for a finished brief.
//!
//! The document is model-generated, so every field is optional and the
//! parser tolerates the shapes the model tends to emit (a single string
//! where a list was asked for, numeric strings for the score).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::ResultError;

/// Highest valid score.
pub const MAX_SCORE: f64 = 100.0;

/// One piece of evidence backing the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default)]
    pub claim: String,
    /// Where the evidence can be found (usually a URL).
    #[serde(default, alias = "source")]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
}

/// Parsed analysis output. Missing fields are empty, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "string_list")]
    pub summary: Vec<String>,
    #[serde(default, alias = "evidence", deserialize_with = "evidence_list")]
    pub evidence_highlights: Vec<EvidenceItem>,
    #[serde(default, alias = "risks", deserialize_with = "string_list")]
    pub risk_flags: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub screening_questions: Vec<String>,
    #[serde(default, alias = "score", deserialize_with = "lenient_score")]
    pub final_score: Option<f64>,
}

impl AnalysisResult {
    /// Parse and validate a result document.
    ///
    /// The top level must be a JSON object; a score outside `[0, 100]` is
    /// dropped.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ResultError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ResultError::Malformed(format!("not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(ResultError::Malformed(
                "expected a JSON object at the top level".to_string(),
            ));
        }
        let result: AnalysisResult = serde_json::from_value(value)
            .map_err(|e| ResultError::Malformed(e.to_string()))?;
        Ok(result.normalized())
    }

    fn normalized(mut self) -> Self {
        if let Some(score) = self.final_score {
            if !(0.0..=MAX_SCORE).contains(&score) {
                warn!("Discarding out-of-range analysis score: {}", score);
                self.final_score = None;
            }
        }
        self
    }

    /// True when the document carried nothing renderable.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.evidence_highlights.is_empty()
            && self.risk_flags.is_empty()
            && self.screening_questions.is_empty()
            && self.final_score.is_none()
    }
}

fn value_to_line(value: Value) -> Option<String> {
    let line = match value {
        Value::Null => return None,
        Value::String(s) => s,
        other => other.to_string(),
    };
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', '*', '•'])
        .trim_start()
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(text)) => text
            .lines()
            .map(|l| strip_bullet(l.trim()).to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_line).collect(),
        Some(other) => value_to_line(other).into_iter().collect(),
    })
}

fn evidence_list<'de, D>(deserializer: D) -> Result<Vec<EvidenceItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(single) => vec![single],
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => serde_json::from_value::<EvidenceItem>(item).ok(),
            other => value_to_line(other).map(|claim| EvidenceItem {
                claim,
                ..Default::default()
            }),
        })
        .collect())
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|score| score.is_finite()))
}
