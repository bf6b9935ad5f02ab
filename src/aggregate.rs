//! Equal-weight aggregation and banding
//!
//! Each main metric is the arithmetic mean of its sub-metric scores; the
//! overall score is the mean of the three metric means; the band follows the
//! fixed thresholds in [`Band::from_score`]. Means are computed from the
//! sub-scores at hand, never cached.

use crate::error::{Result, ThemisError};
use crate::types::{Band, EvaluationResult, Metric, MetricAggregate, SubMetricScore};

/// Aggregate per-metric sub-scores into the final evaluation result.
///
/// A metric with zero sub-metric scores is a configuration error
/// (`EmptyMetricDefinition`), never silently skipped.
pub fn aggregate(
    scores_by_metric: Vec<(Metric, Vec<SubMetricScore>)>,
) -> Result<EvaluationResult> {
    if scores_by_metric.is_empty() {
        return Err(ThemisError::EmptyMetricDefinition(
            "no metrics to aggregate".to_string(),
        ));
    }

    let mut metrics = Vec::with_capacity(scores_by_metric.len());

    for (metric, submetrics) in scores_by_metric {
        if submetrics.is_empty() {
            return Err(ThemisError::EmptyMetricDefinition(metric.to_string()));
        }

        let mean =
            submetrics.iter().map(|s| s.score).sum::<f64>() / submetrics.len() as f64;

        metrics.push(MetricAggregate {
            metric,
            mean,
            submetrics,
        });
    }

    let overall_score =
        metrics.iter().map(|m| m.mean).sum::<f64>() / metrics.len() as f64;
    let band = Band::from_score(overall_score);

    Ok(EvaluationResult {
        metrics,
        overall_score,
        band,
    })
}
