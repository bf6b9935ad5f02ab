//! Deterministic scoring stub
//!
//! Stands in for the model-backed scorer. Derives a stable tweak from the
//! rendered prompt bytes, producing mid-band scores in 2.8..=3.2 so identical
//! requests always yield identical responses.

use crate::error::Result;
use crate::prompts;
use crate::scoring::{round2, Scorer};
use crate::types::{Exemplar, SubMetricScore};
use async_trait::async_trait;

/// Deterministic stub scorer
#[derive(Debug, Clone, Default)]
pub struct StubScorer;

impl StubScorer {
    pub fn new() -> Self {
        Self
    }
}

/// Stable tweak in 0.0..=0.4 from the first 128 prompt bytes
fn stable_tweak(prompt: &str) -> f64 {
    let sum: u32 = prompt.bytes().take(128).map(u32::from).sum();
    f64::from(sum % 9) * 0.05
}

#[async_trait]
impl Scorer for StubScorer {
    async fn score(
        &self,
        submetric: &str,
        project_text: &str,
        exemplars: &[Exemplar],
    ) -> Result<SubMetricScore> {
        let prompt = prompts::lookup(submetric)?;
        let rendered = prompt.render(project_text, exemplars);

        let score = round2(3.0 + stable_tweak(&rendered) - 0.2);

        SubMetricScore::new(
            prompt.key,
            prompt.name,
            score,
            "Deterministic stub score derived from prompt content.",
        )
    }

    fn kind(&self) -> &'static str {
        "stub"
    }
}
