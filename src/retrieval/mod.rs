//! Exemplar retrieval backing the scoring path
//!
//! Two variants behind one trait: a trivial stub and a vector-similarity
//! retriever over a preloaded knowledge corpus. The variant is chosen once at
//! startup and injected into the request-handling path.

pub mod stub;
pub mod vector;

pub use stub::StubRetriever;
pub use vector::VectorRetriever;

use crate::error::Result;
use crate::types::Exemplar;
use async_trait::async_trait;

/// Retrieval trait: `retrieve` returns up to `k` exemplars relevant to the
/// project text, ordered by descending similarity.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, project_text: &str, k: usize) -> Result<Vec<Exemplar>>;

    /// Backend kind, reported by the health endpoint
    fn kind(&self) -> &'static str;
}
