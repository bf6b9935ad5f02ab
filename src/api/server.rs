//! HTTP API server exposing the scoring endpoint
//!
//! Stateless request/response flow: deserialize, validate, evaluate, respond.
//! Validation failures map to 422 with field detail; configuration and
//! internal failures map to 500 with a minimal error payload.

use crate::error::ThemisError;
use crate::evaluator::Evaluator;
use crate::types::EvaluationResult;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8000).into(),
        }
    }
}

/// API server state
#[derive(Clone)]
struct AppState {
    /// Evaluation pipeline with the startup-selected backends
    evaluator: Arc<Evaluator>,
    /// Instance ID
    instance_id: String,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    evaluator: Arc<Evaluator>,
    instance_id: String,
}

impl ApiServer {
    /// Create new API server around the evaluation pipeline
    pub fn new(config: ApiServerConfig, evaluator: Arc<Evaluator>) -> Self {
        let instance_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        Self {
            config,
            evaluator,
            instance_id,
        }
    }

    /// Get instance ID
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build the router for this server (also used by integration tests)
    pub fn router(&self) -> Router {
        let state = AppState {
            evaluator: self.evaluator.clone(),
            instance_id: self.instance_id.clone(),
        };

        Router::new()
            .route("/score", post(score_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start serving
    pub async fn serve(self) -> anyhow::Result<()> {
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!(
            "API server [{}] listening on http://{}",
            self.instance_id, self.config.addr
        );

        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Score request payload
#[derive(Debug, Deserialize)]
struct ScoreRequest {
    /// Optional project identifier for logging
    #[serde(default)]
    project_name: Option<String>,

    /// Project description to evaluate (required, non-empty)
    project_text: String,

    /// Target sub-metric keys; absent means the full catalog
    #[serde(default)]
    submetrics: Option<Vec<String>>,

    /// Free-form request metadata, accepted and ignored by the scaffold
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Error payload for non-2xx responses
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

/// Wrapper mapping crate errors onto HTTP responses
#[derive(Debug)]
struct ApiError(ThemisError);

impl From<ThemisError> for ApiError {
    fn from(err: ThemisError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ThemisError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.0.kind(),
            detail: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Score handler: validate, evaluate, respond
async fn score_handler(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<EvaluationResult>, ApiError> {
    let project_text = req.project_text.trim();
    if project_text.is_empty() {
        return Err(ThemisError::Validation(
            "field 'project_text' must be a non-empty string".to_string(),
        )
        .into());
    }

    debug!(
        "Evaluating project {:?} ({} chars, metadata: {})",
        req.project_name.as_deref().unwrap_or("unnamed"),
        project_text.len(),
        req.metadata.is_some()
    );

    let result = state
        .evaluator
        .evaluate(project_text, req.submetrics.as_deref())
        .await?;

    Ok(Json(result))
}

/// Health check handler
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    instance_id: String,
    scorer: &'static str,
    retriever: &'static str,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        scorer: state.evaluator.scorer_kind(),
        retriever: state.evaluator.retriever_kind(),
    })
}
