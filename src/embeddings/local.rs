//! Local embedding service using fastembed
//!
//! Runs embedding models locally via ONNX Runtime. Models are downloaded on
//! first use into the cache directory and loaded from cache afterwards.

use crate::config::EmbeddingSettings;
use crate::embeddings::EmbeddingService;
use crate::error::{Result, ThemisError};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::{debug, info};

/// Local embedding service using fastembed
pub struct LocalEmbeddingService {
    /// The underlying fastembed model (Arc<Mutex> for thread-safe interior mutability)
    model: Arc<Mutex<TextEmbedding>>,
    /// Settings the service was built with
    settings: EmbeddingSettings,
    /// Cached dimensions
    dimensions: usize,
}

impl LocalEmbeddingService {
    /// Create a new local embedding service with the given settings.
    ///
    /// Downloads the model if not already cached, which can take a while on
    /// first startup.
    pub async fn new(settings: EmbeddingSettings) -> Result<Self> {
        settings.validate()?;

        info!(
            "Initializing local embedding service: model={}, cache={:?}",
            settings.model, settings.cache_dir
        );

        let embedding_model = model_name_to_enum(&settings.model)?;

        let show_progress = settings.show_download_progress;
        let cache_dir = settings.cache_dir.clone();
        let mut init_options = InitOptions::default();
        init_options.model_name = embedding_model;
        init_options.show_download_progress = show_progress;
        if let Some(dir) = cache_dir {
            init_options.cache_dir = dir;
        }

        // Load model in blocking task (may download if not cached)
        let model = task::spawn_blocking(move || TextEmbedding::try_new(init_options))
            .await
            .map_err(|e| ThemisError::Other(format!("Task join error: {}", e)))?
            .map_err(|e| ThemisError::Embedding(format!("Failed to load model: {}", e)))?;

        let dimensions = settings.dimensions();

        info!("Local embedding service ready: {} dimensions", dimensions);

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            settings,
            dimensions,
        })
    }

    /// Embed a batch of texts in a blocking task (fastembed is synchronous)
    async fn embed_batch_internal(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding batch of {} texts", texts.len());

        let model = Arc::clone(&self.model);
        let dimensions = self.dimensions;

        let embeddings = task::spawn_blocking(move || {
            let mut model_guard = model
                .lock()
                .map_err(|e| format!("Mutex lock failed: {}", e))?;

            model_guard
                .embed(texts, None)
                .map_err(|e| format!("Embedding generation failed: {}", e))
        })
        .await
        .map_err(|e| ThemisError::Other(format!("Task join error: {}", e)))?
        .map_err(ThemisError::Embedding)?;

        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimensions {
                return Err(ThemisError::Embedding(format!(
                    "Embedding {} has wrong dimensions: expected {}, got {}",
                    i,
                    dimensions,
                    embedding.len()
                )));
            }
        }

        Ok(embeddings)
    }
}

/// Map model name string to fastembed's EmbeddingModel enum
fn model_name_to_enum(model_name: &str) -> Result<EmbeddingModel> {
    match model_name {
        "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        "nomic-embed-text-v1.5" => Ok(EmbeddingModel::NomicEmbedTextV15),
        _ => Err(ThemisError::Config(config::ConfigError::Message(format!(
            "Unsupported embedding model: '{}'",
            model_name
        )))),
    }
}

#[async_trait]
impl EmbeddingService for LocalEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(ThemisError::Validation("Text cannot be empty".to_string()));
        }

        let texts = vec![text.to_string()];
        let mut embeddings = self.embed_batch_internal(texts).await?;

        embeddings
            .pop()
            .ok_or_else(|| ThemisError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        for (i, text) in texts.iter().enumerate() {
            if text.is_empty() {
                return Err(ThemisError::Validation(format!(
                    "Text at index {} cannot be empty",
                    i
                )));
            }
        }

        let texts_owned: Vec<String> = texts.iter().map(|s| s.to_string()).collect();

        // Process in chunks based on settings
        let batch_size = self.settings.batch_size;
        let mut all_embeddings = Vec::new();

        for chunk in texts_owned.chunks(batch_size) {
            let chunk_embeddings = self.embed_batch_internal(chunk.to_vec()).await?;
            all_embeddings.extend(chunk_embeddings);
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
