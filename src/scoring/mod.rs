//! Sub-metric scoring services
//!
//! Two variants behind one trait: a deterministic stub and an LLM-backed
//! scorer. The variant is chosen once at startup; both resolve sub-metric
//! keys against the shared prompt catalog and fail on unknown keys.

pub mod model;
pub mod stub;

pub use model::{ModelScorer, ModelScorerConfig};
pub use stub::StubScorer;

use crate::error::Result;
use crate::types::{Exemplar, SubMetricScore};
use async_trait::async_trait;

/// Scoring trait: `score` produces a score in [1,5] for one sub-metric,
/// informed by the project text and retrieved exemplars. Fails with
/// `InvalidSubMetric` for unrecognized keys.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        submetric: &str,
        project_text: &str,
        exemplars: &[Exemplar],
    ) -> Result<SubMetricScore>;

    /// Backend kind, reported by the health endpoint
    fn kind(&self) -> &'static str;
}

/// Round to two decimals, the precision scores are reported at
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
