//! Typed search and analysis entities, normalized from raw gateway payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{InsightError, Result};

/// Match certainty attached to a search result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Coerce free-form confidence text into the closed enum.
    ///
    /// Unrecognized text maps to `Low` and is logged; it never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            "low" => Confidence::Low,
            other => {
                warn!("⚠️ Unrecognized confidence '{}', treating as Low", other);
                Confidence::Low
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// One ranked match returned for a query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub video_id: String,
    pub confidence: Confidence,
    /// Match score on the percent scale (0-100)
    pub score: f64,
    pub start: f64,
    pub end: f64,
    pub video_url: Option<String>,
}

/// All results for the active query, in relevance order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    results: Vec<SearchResult>,
}

impl ResultSet {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.results.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.results.get(index)
    }

    pub fn find(&self, video_id: &str) -> Option<&SearchResult> {
        self.results.iter().find(|r| r.video_id == video_id)
    }
}

/// Deep-dive analysis for a single video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub video_id: String,
    pub analysis: String,
    pub video_url: Option<String>,
}

impl AnalysisResult {
    /// Non-blank lines of the analysis text, trimmed, in order
    pub fn paragraphs(&self) -> Vec<&str> {
        self.analysis
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchItem {
    video_id: Option<Value>,
    confidence: Option<Value>,
    score: Option<f64>,
    start: Option<f64>,
    end: Option<f64>,
    video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    analysis: Option<String>,
    video_url: Option<String>,
}

/// Clamp a wire score to `[0, 100]` and round it to two decimals.
///
/// The server reports scores as percentages; no other scale is accepted.
pub fn normalize_score(raw: f64) -> f64 {
    (raw.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

fn video_id_text(value: Option<Value>, index: usize) -> Result<String> {
    match value {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(InsightError::MalformedResponse(format!(
            "result {} has no usable video_id",
            index
        ))),
    }
}

/// Parse the body of `POST /search` into a [`ResultSet`], preserving order
pub fn parse_search_response(raw: &Value) -> Result<ResultSet> {
    let items = raw.as_array().ok_or_else(|| {
        InsightError::MalformedResponse("search response is not an array".to_string())
    })?;

    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let parsed: RawSearchItem = serde_json::from_value(item.clone()).map_err(|e| {
            InsightError::MalformedResponse(format!("result {}: {}", index, e))
        })?;

        let video_id = video_id_text(parsed.video_id, index)?;
        let (start, end) = match (parsed.start, parsed.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(InsightError::MalformedResponse(format!(
                    "result {} ({}) is missing its time range",
                    index, video_id
                )))
            }
        };
        if !(start >= 0.0 && end > start) {
            return Err(InsightError::MalformedResponse(format!(
                "result {} ({}) has invalid time range {}..{}",
                index, video_id, start, end
            )));
        }

        let confidence = match parsed.confidence {
            Some(Value::String(label)) => Confidence::from_label(&label),
            Some(Value::Null) | None => {
                warn!("⚠️ Result {} has no confidence, treating as Low", video_id);
                Confidence::Low
            }
            Some(other) => {
                warn!("⚠️ Result {} has non-text confidence {}, treating as Low", video_id, other);
                Confidence::Low
            }
        };
        let score = parsed.score.ok_or_else(|| {
            InsightError::MalformedResponse(format!("result {} ({}) has no score", index, video_id))
        })?;

        results.push(SearchResult {
            video_id,
            confidence,
            score: normalize_score(score),
            start,
            end,
            video_url: parsed.video_url.filter(|u| !u.trim().is_empty()),
        });
    }

    debug!("Parsed {} search results", results.len());
    Ok(ResultSet::new(results))
}

/// Parse the body of `GET /analyze/{video_id}`
pub fn parse_analysis_response(video_id: &str, raw: &Value) -> Result<AnalysisResult> {
    let parsed: RawAnalysis = serde_json::from_value(raw.clone())?;
    let analysis = parsed.analysis.ok_or_else(|| {
        InsightError::MalformedResponse(format!("analysis for {} has no analysis field", video_id))
    })?;

    Ok(AnalysisResult {
        video_id: video_id.to_string(),
        analysis,
        video_url: parsed.video_url.filter(|u| !u.trim().is_empty()),
    })
}
