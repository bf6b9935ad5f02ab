//! Trivial retrieval stub
//!
//! Returns a fixed exemplar sequence (empty by default). Used when no
//! knowledge corpus is configured; scoring must still succeed with it.

use crate::error::Result;
use crate::retrieval::Retriever;
use crate::types::Exemplar;
use async_trait::async_trait;

/// Retriever stub returning a fixed (default empty) exemplar sequence
#[derive(Debug, Clone, Default)]
pub struct StubRetriever {
    fixed: Vec<Exemplar>,
}

impl StubRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub that always returns the given exemplars (truncated to k)
    pub fn with_fixed(fixed: Vec<Exemplar>) -> Self {
        Self { fixed }
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, _project_text: &str, k: usize) -> Result<Vec<Exemplar>> {
        Ok(self.fixed.iter().take(k).cloned().collect())
    }

    fn kind(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_by_default() {
        let retriever = StubRetriever::new();
        let exemplars = retriever.retrieve("some project", 3).await.unwrap();
        assert!(exemplars.is_empty());
    }

    #[tokio::test]
    async fn test_fixed_exemplars_truncated_to_k() {
        let fixed = vec![
            Exemplar {
                source: "a.md".to_string(),
                snippet: "first".to_string(),
                similarity: None,
            },
            Exemplar {
                source: "b.md".to_string(),
                snippet: "second".to_string(),
                similarity: None,
            },
        ];

        let retriever = StubRetriever::with_fixed(fixed);
        let exemplars = retriever.retrieve("some project", 1).await.unwrap();

        assert_eq!(exemplars.len(), 1);
        assert_eq!(exemplars[0].source, "a.md");
    }
}
