//! Configuration for the themis service
//!
//! Settings load in layers: built-in defaults, then an optional TOML file,
//! then `THEMIS_`-prefixed environment variables (`__` as section separator,
//! e.g. `THEMIS_SERVER__PORT=8080`). CLI flags override on top in main.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//!
//! [knowledge]
//! dir = "knowledge"
//! top_k = 3
//!
//! [scorer]
//! provider = "stub"
//!
//! [embedding]
//! model = "all-MiniLM-L6-v2"
//! batch_size = 16
//! ```

use crate::error::{Result, ThemisError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Complete configuration for the themis service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemisConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Knowledge corpus settings
    #[serde(default)]
    pub knowledge: KnowledgeSettings,

    /// Scorer backend settings
    #[serde(default)]
    pub scorer: ScorerSettings,

    /// Embedding backend settings
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Knowledge corpus settings
///
/// Presence of a directory with `.txt`/`.md` files selects the vector-backed
/// retriever at startup; otherwise the trivial stub is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// Knowledge corpus directory
    #[serde(default = "default_knowledge_dir")]
    pub dir: Option<PathBuf>,

    /// Exemplars retrieved per scoring call
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            dir: default_knowledge_dir(),
            top_k: default_top_k(),
        }
    }
}

/// Which scorer backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerProvider {
    /// Deterministic stub (default)
    Stub,
    /// LLM-backed scorer
    Model,
}

/// Scorer backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerSettings {
    /// Backend selection, fixed for the process lifetime
    #[serde(default = "default_provider")]
    pub provider: ScorerProvider,

    /// API key for the model provider; falls back to ANTHROPIC_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Max tokens for responses
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Temperature for sampling
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ScorerSettings {
    /// Resolve the API key from settings or environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Embedding backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Model cache directory (fastembed default when unset)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Texts embedded per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Show model download progress on first startup
    #[serde(default)]
    pub show_download_progress: bool,
}

impl EmbeddingSettings {
    /// Embedding dimensionality of the configured model
    pub fn dimensions(&self) -> usize {
        match self.model.as_str() {
            "bge-base-en-v1.5" | "nomic-embed-text-v1.5" => 768,
            // all-MiniLM and bge-small families
            _ => 384,
        }
    }

    /// Validate settings before model load
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(ThemisError::Config(config::ConfigError::Message(
                "embedding.model cannot be empty".to_string(),
            )));
        }
        if self.batch_size == 0 {
            return Err(ThemisError::Config(config::ConfigError::Message(
                "embedding.batch_size must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            cache_dir: None,
            batch_size: default_batch_size(),
            show_download_progress: false,
        }
    }
}

// Default value helpers
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_knowledge_dir() -> Option<PathBuf> {
    Some(PathBuf::from("knowledge"))
}

fn default_top_k() -> usize {
    3
}

fn default_provider() -> ScorerProvider {
    ScorerProvider::Stub
}

fn default_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_max_tokens() -> usize {
    512
}

fn default_temperature() -> f32 {
    0.1
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_batch_size() -> usize {
    16
}

impl ThemisConfig {
    /// Load configuration: defaults, optional TOML file, then THEMIS_* env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path));
            }
            None => {
                builder = builder.add_source(config::File::with_name("themis").required(false));
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("THEMIS").separator("__"));

        let cfg: ThemisConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Validate cross-field consistency
    pub fn validate(&self) -> Result<()> {
        if self.knowledge.top_k == 0 {
            return Err(ThemisError::Config(config::ConfigError::Message(
                "knowledge.top_k must be at least 1".to_string(),
            )));
        }

        if self.scorer.provider == ScorerProvider::Model
            && self.scorer.resolve_api_key().is_none()
        {
            return Err(ThemisError::Config(config::ConfigError::Message(
                "scorer.provider = \"model\" requires scorer.api_key or ANTHROPIC_API_KEY"
                    .to_string(),
            )));
        }

        self.embedding.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ThemisConfig::default();

        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.knowledge.dir, Some(PathBuf::from("knowledge")));
        assert_eq!(cfg.knowledge.top_k, 3);
        assert_eq!(cfg.scorer.provider, ScorerProvider::Stub);
        assert_eq!(cfg.embedding.model, "all-MiniLM-L6-v2");
        assert_eq!(cfg.embedding.batch_size, 16);

        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: ThemisConfig = toml::from_str(
            r#"
            [server]
            port = 9100

            [knowledge]
            top_k = 5
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.knowledge.top_k, 5);
        assert_eq!(cfg.scorer.provider, ScorerProvider::Stub);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut cfg = ThemisConfig::default();
        cfg.knowledge.top_k = 0;

        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_model_provider_requires_api_key() {
        let mut cfg = ThemisConfig::default();
        cfg.scorer.provider = ScorerProvider::Model;
        cfg.scorer.api_key = None;

        if env::var("ANTHROPIC_API_KEY").is_err() {
            assert!(cfg.validate().is_err());
        }

        cfg.scorer.api_key = Some("sk-ant-test".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_embedding_dimensions() {
        let mut settings = EmbeddingSettings::default();
        assert_eq!(settings.dimensions(), 384);

        settings.model = "bge-base-en-v1.5".to_string();
        assert_eq!(settings.dimensions(), 768);
    }

    #[test]
    fn test_embedding_validate() {
        let mut settings = EmbeddingSettings::default();
        assert!(settings.validate().is_ok());

        settings.batch_size = 0;
        assert!(settings.validate().is_err());
    }
}
