//! Themis - Project-Evaluation Scoring Service
//!
//! A web service scaffold that scores a project description across three
//! weighted main metrics (impact, effort, risk), each the equal-weight mean of
//! its sub-metrics, and returns banded results (low/medium/high).
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (Metric, Band, SubMetricScore, etc.)
//! - **Prompts**: The static sub-metric catalog and prompt templates
//! - **Scoring**: Pluggable scorer backends (deterministic stub, LLM-backed)
//! - **Retrieval**: Pluggable exemplar retrievers (stub, vector-similarity)
//! - **Evaluator**: The per-request pipeline wiring retrieval and scoring
//! - **API**: The axum HTTP surface (`POST /score`, `GET /health`)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use themis_core::{Evaluator, StubRetriever, StubScorer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let evaluator = Evaluator::new(
//!         Arc::new(StubScorer::new()),
//!         Arc::new(StubRetriever::new()),
//!         3,
//!     );
//!
//!     let result = evaluator
//!         .evaluate("Automate invoice matching with OCR", None)
//!         .await?;
//!     println!("{} -> {}", result.overall_score, result.band);
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod evaluator;
pub mod prompts;
pub mod retrieval;
pub mod scoring;
pub mod types;

// Re-export commonly used types
pub use api::{ApiServer, ApiServerConfig};
pub use config::{ScorerProvider, ThemisConfig};
pub use error::{Result, ThemisError};
pub use evaluator::Evaluator;
pub use retrieval::{Retriever, StubRetriever, VectorRetriever};
pub use scoring::{ModelScorer, ModelScorerConfig, Scorer, StubScorer};
pub use types::{
    Band, EvaluationResult, Exemplar, Metric, MetricAggregate, SubMetricScore,
};
