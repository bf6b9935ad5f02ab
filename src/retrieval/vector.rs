//! Vector-similarity retrieval over a knowledge corpus
//!
//! The corpus is a flat directory of `.txt`/`.md` files, embedded once during
//! startup into an immutable in-memory index. Each request embeds the query
//! and ranks the corpus by cosine similarity.

use crate::embeddings::{cosine_similarity, EmbeddingService};
use crate::error::{Result, ThemisError};
use crate::retrieval::Retriever;
use crate::types::Exemplar;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Longest snippet returned to a scoring call
const SNIPPET_MAX_CHARS: usize = 800;

/// One embedded corpus document
struct KnowledgeDoc {
    source: String,
    text: String,
    embedding: Vec<f32>,
}

/// Similarity-backed retriever over a startup-embedded corpus.
/// Read-only after construction; shared freely across requests.
pub struct VectorRetriever {
    embedder: Arc<dyn EmbeddingService>,
    corpus: Vec<KnowledgeDoc>,
}

impl VectorRetriever {
    /// Embed the given documents and build the index.
    /// `docs` is (source, text) pairs as returned by [`load_knowledge_dir`].
    pub async fn new(
        docs: Vec<(String, String)>,
        embedder: Arc<dyn EmbeddingService>,
    ) -> Result<Self> {
        if docs.is_empty() {
            return Err(ThemisError::Embedding(
                "Cannot build a vector retriever from an empty corpus".to_string(),
            ));
        }

        let texts: Vec<&str> = docs.iter().map(|(_, text)| text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        let corpus: Vec<KnowledgeDoc> = docs
            .into_iter()
            .zip(embeddings)
            .map(|((source, text), embedding)| KnowledgeDoc {
                source,
                text,
                embedding,
            })
            .collect();

        info!(
            "Knowledge index built: {} documents, model {}",
            corpus.len(),
            embedder.model_name()
        );

        Ok(Self { embedder, corpus })
    }

    /// Number of indexed documents
    pub fn corpus_len(&self) -> usize {
        self.corpus.len()
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, project_text: &str, k: usize) -> Result<Vec<Exemplar>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(project_text).await?;
        let ranked = rank(&query, &self.corpus, k);

        debug!("Retrieved {} exemplars for query", ranked.len());

        Ok(ranked
            .into_iter()
            .map(|(idx, similarity)| {
                let doc = &self.corpus[idx];
                Exemplar {
                    source: doc.source.clone(),
                    snippet: truncate_snippet(&doc.text),
                    similarity: Some(similarity),
                }
            })
            .collect())
    }

    fn kind(&self) -> &'static str {
        "vector"
    }
}

/// Rank corpus documents by cosine similarity to the query, descending,
/// keeping at most k.
fn rank(query: &[f32], corpus: &[KnowledgeDoc], k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = corpus
        .iter()
        .enumerate()
        .map(|(i, doc)| (i, cosine_similarity(query, &doc.embedding)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Truncate a document to snippet length on a char boundary
fn truncate_snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    text.chars().take(SNIPPET_MAX_CHARS).collect()
}

/// Load the knowledge corpus: non-recursive scan for `.txt`/`.md` files,
/// sorted by file name so the index order is stable across restarts.
pub fn load_knowledge_dir(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut docs = Vec::new();

    if !dir.is_dir() {
        return Ok(docs);
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("txt") | Some("md")
                )
        })
        .collect();
    entries.sort();

    for path in entries {
        let text = std::fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            continue;
        }

        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        docs.push((source, text));
    }

    debug!("Loaded {} knowledge documents from {:?}", docs.len(), dir);

    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn doc(source: &str, embedding: Vec<f32>) -> KnowledgeDoc {
        KnowledgeDoc {
            source: source.to_string(),
            text: format!("{} body", source),
            embedding,
        }
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let corpus = vec![
            doc("orthogonal", vec![0.0, 1.0, 0.0]),
            doc("exact", vec![1.0, 0.0, 0.0]),
            doc("close", vec![0.9, 0.1, 0.0]),
        ];
        let query = vec![1.0, 0.0, 0.0];

        let ranked = rank(&query, &corpus, 3);

        assert_eq!(ranked.len(), 3);
        assert_eq!(corpus[ranked[0].0].source, "exact");
        assert_eq!(corpus[ranked[1].0].source, "close");
        assert_eq!(corpus[ranked[2].0].source, "orthogonal");
        assert!(ranked[0].1 >= ranked[1].1 && ranked[1].1 >= ranked[2].1);
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let corpus = vec![
            doc("a", vec![1.0, 0.0]),
            doc("b", vec![0.5, 0.5]),
            doc("c", vec![0.0, 1.0]),
        ];
        let query = vec![1.0, 0.0];

        let ranked = rank(&query, &corpus, 2);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_truncate_snippet() {
        let short = "short text";
        assert_eq!(truncate_snippet(short), short);

        let long = "x".repeat(SNIPPET_MAX_CHARS + 100);
        assert_eq!(truncate_snippet(&long).chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn test_load_knowledge_dir_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("beta.txt"), "beta content").unwrap();
        fs::write(temp_dir.path().join("alpha.md"), "alpha content").unwrap();
        fs::write(temp_dir.path().join("skipped.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("empty.md"), "   \n").unwrap();

        let docs = load_knowledge_dir(temp_dir.path()).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "alpha.md");
        assert_eq!(docs[0].1, "alpha content");
        assert_eq!(docs[1].0, "beta.txt");
    }

    #[test]
    fn test_load_knowledge_dir_missing_is_empty() {
        let docs = load_knowledge_dir(Path::new("/nonexistent/knowledge")).unwrap();
        assert!(docs.is_empty());
    }
}
