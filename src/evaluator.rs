//! Request-scoped evaluation pipeline
//!
//! Wires the configured scorer and retriever together: resolve the requested
//! sub-metric selection against the catalog, retrieve exemplars and score each
//! sub-metric, then aggregate into the final result. Holds only shared
//! read-only handles, so one instance serves concurrent requests.

use crate::aggregate;
use crate::error::Result;
use crate::prompts::{self, SubMetricPrompt};
use crate::retrieval::Retriever;
use crate::scoring::Scorer;
use crate::types::{EvaluationResult, Metric, SubMetricScore};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

/// Evaluation pipeline with the startup-selected scorer and retriever injected
pub struct Evaluator {
    scorer: Arc<dyn Scorer>,
    retriever: Arc<dyn Retriever>,
    top_k: usize,
}

impl Evaluator {
    pub fn new(scorer: Arc<dyn Scorer>, retriever: Arc<dyn Retriever>, top_k: usize) -> Self {
        Self {
            scorer,
            retriever,
            top_k,
        }
    }

    /// Backend kind of the scorer in use
    pub fn scorer_kind(&self) -> &'static str {
        self.scorer.kind()
    }

    /// Backend kind of the retriever in use
    pub fn retriever_kind(&self) -> &'static str {
        self.retriever.kind()
    }

    /// Evaluate a project description.
    ///
    /// `selection` narrows scoring to the given catalog keys; `None` scores
    /// the full catalog. Unknown keys fail with `InvalidSubMetric`; a
    /// selection that leaves a main metric empty fails with
    /// `EmptyMetricDefinition`.
    pub async fn evaluate(
        &self,
        project_text: &str,
        selection: Option<&[String]>,
    ) -> Result<EvaluationResult> {
        let plan = resolve_selection(selection)?;

        let mut scores_by_metric: Vec<(Metric, Vec<SubMetricScore>)> =
            Vec::with_capacity(plan.len());

        for (metric, submetrics) in plan {
            debug!(
                "Scoring metric {} across {} sub-metrics",
                metric,
                submetrics.len()
            );

            // Sub-metrics within a metric are independent; score them concurrently
            let scores = try_join_all(
                submetrics
                    .iter()
                    .map(|prompt| self.score_one(prompt.key, project_text)),
            )
            .await?;

            scores_by_metric.push((metric, scores));
        }

        aggregate::aggregate(scores_by_metric)
    }

    /// Retrieve exemplars, then score one sub-metric with them
    async fn score_one(&self, key: &str, project_text: &str) -> Result<SubMetricScore> {
        let exemplars = self.retriever.retrieve(project_text, self.top_k).await?;
        self.scorer.score(key, project_text, &exemplars).await
    }
}

/// Resolve the requested selection into per-metric prompt lists.
///
/// Always returns all three main metrics in canonical order; with a selection
/// in play, a metric may come back empty and the aggregator rejects it.
fn resolve_selection(
    selection: Option<&[String]>,
) -> Result<Vec<(Metric, Vec<&'static SubMetricPrompt>)>> {
    // Validate every requested key up front so unknown keys fail fast
    if let Some(keys) = selection {
        for key in keys {
            prompts::lookup(key)?;
        }
    }

    let selected = |prompt: &SubMetricPrompt| match selection {
        Some(keys) => keys.iter().any(|k| k == prompt.key),
        None => true,
    };

    Ok(Metric::ALL
        .iter()
        .map(|&metric| {
            let submetrics: Vec<_> = prompts::for_metric(metric)
                .into_iter()
                .filter(|p| selected(p))
                .collect();
            (metric, submetrics)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::StubRetriever;
    use crate::scoring::StubScorer;
    use crate::types::Band;

    fn stub_evaluator() -> Evaluator {
        Evaluator::new(
            Arc::new(StubScorer::new()),
            Arc::new(StubRetriever::new()),
            3,
        )
    }

    #[tokio::test]
    async fn test_full_catalog_evaluation() {
        let evaluator = stub_evaluator();
        let result = evaluator
            .evaluate("Automate invoice matching with OCR", None)
            .await
            .unwrap();

        assert_eq!(result.metrics.len(), 3);
        assert_eq!(result.metrics[0].metric, Metric::Impact);
        assert_eq!(result.metrics[0].submetrics.len(), 3);
        assert_eq!(result.metrics[1].metric, Metric::Effort);
        assert_eq!(result.metrics[1].submetrics.len(), 3);
        assert_eq!(result.metrics[2].metric, Metric::Risk);
        assert_eq!(result.metrics[2].submetrics.len(), 4);

        // Stub scores stay mid-band, so the overall result does too
        assert_eq!(result.band, Band::Medium);

        // The overall score is the exact mean of the metric means
        let mean_of_means =
            result.metrics.iter().map(|m| m.mean).sum::<f64>() / result.metrics.len() as f64;
        assert_eq!(result.overall_score, mean_of_means);
    }

    #[tokio::test]
    async fn test_evaluation_is_deterministic() {
        let evaluator = stub_evaluator();

        let first = evaluator.evaluate("Same project text", None).await.unwrap();
        let second = evaluator.evaluate("Same project text", None).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_selection_covering_all_metrics() {
        let evaluator = stub_evaluator();
        let selection = vec![
            "strategic_fit".to_string(),
            "projected_timeline".to_string(),
            "scope_definition_risk".to_string(),
        ];

        let result = evaluator
            .evaluate("Some project", Some(&selection))
            .await
            .unwrap();

        assert_eq!(result.metrics.len(), 3);
        for aggregate in &result.metrics {
            assert_eq!(aggregate.submetrics.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_selection_leaving_a_metric_empty_fails() {
        let evaluator = stub_evaluator();
        let selection = vec!["strategic_fit".to_string(), "business_value".to_string()];

        let err = evaluator
            .evaluate("Some project", Some(&selection))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::ThemisError::EmptyMetricDefinition(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_selection_key_fails_fast() {
        let evaluator = stub_evaluator();
        let selection = vec!["market_size".to_string()];

        let err = evaluator
            .evaluate("Some project", Some(&selection))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::ThemisError::InvalidSubMetric(ref k) if k == "market_size"
        ));
    }
}
