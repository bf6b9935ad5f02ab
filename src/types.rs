//! Core data types for the themis evaluation service
//!
//! This module defines the entities that flow through a single evaluation:
//! metrics, bands, per-sub-metric scores, aggregates, and retrieved exemplars.
//! Everything here is created fresh per request and dropped with the response.

use crate::error::{Result, ThemisError};
use serde::{Deserialize, Serialize};

/// Lower bound of the documented score range
pub const SCORE_MIN: f64 = 1.0;

/// Upper bound of the documented score range
pub const SCORE_MAX: f64 = 5.0;

/// The three main metrics every evaluation aggregates into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Expected business impact of the project
    Impact,

    /// Resource investment required to deliver it
    Effort,

    /// Execution risk carried by the delivery
    Risk,
}

impl Metric {
    /// All main metrics in canonical response order
    pub const ALL: [Metric; 3] = [Metric::Impact, Metric::Effort, Metric::Risk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Impact => "impact",
            Metric::Effort => "effort",
            Metric::Risk => "risk",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categorical label derived from the overall numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    /// Map an overall score to its band under the fixed thresholds:
    /// <= 2.33 low, < 3.67 medium, else high.
    pub fn from_score(score: f64) -> Self {
        if score <= 2.33 {
            Band::Low
        } else if score < 3.67 {
            Band::Medium
        } else {
            Band::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Medium => "medium",
            Band::High => "high",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single scored sub-metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMetricScore {
    /// Catalog key (e.g. "strategic_fit")
    pub key: String,

    /// Display name (e.g. "Strategic Fit")
    pub name: String,

    /// Numeric score, always within [SCORE_MIN, SCORE_MAX]
    pub score: f64,

    /// Short justification produced by the scorer
    pub reason: String,
}

impl SubMetricScore {
    /// Construct a score, rejecting values outside the documented range.
    /// Out-of-range and non-finite scores are explicit errors, never clamped.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        score: f64,
        reason: impl Into<String>,
    ) -> Result<Self> {
        let key = key.into();
        if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
            return Err(ThemisError::InvalidScore(format!(
                "score {} for '{}' is outside {}..={}",
                score, key, SCORE_MIN, SCORE_MAX
            )));
        }

        Ok(Self {
            key,
            name: name.into(),
            score,
            reason: reason.into(),
        })
    }
}

/// One main metric with its sub-metric scores and their equal-weight mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregate {
    pub metric: Metric,

    /// Arithmetic mean of the sub-metric scores, computed at aggregation time
    pub mean: f64,

    pub submetrics: Vec<SubMetricScore>,
}

/// Complete evaluation response: the three aggregates, the overall score
/// (mean of the three metric means), and the derived band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub metrics: Vec<MetricAggregate>,
    pub overall_score: f64,
    pub band: Band,
}

/// A retrieved reference snippet used to inform a scoring call.
/// Ephemeral and request-scoped, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemplar {
    /// Where the snippet came from (file name for corpus-backed retrieval)
    pub source: String,

    /// The snippet text itself
    pub snippet: String,

    /// Cosine similarity to the query, when the retriever computes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}
