// Index module
// Builds the persisted vector index from the corpus, or loads it when present

pub mod vector_store;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::CorpusError;
use crate::config::Config;
use crate::corpus::{self, chunking};
use crate::embeddings::Embedder;

pub use vector_store::{SearchResult, VectorStore};

/// Embedding record stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Unique identifier for this embedding.
    pub id: String,
    /// The embedding vector for the chunk content.
    pub vector: Vec<f32>,
    /// Provenance and content of the chunk this embedding represents.
    pub metadata: ChunkMetadata,
}

/// Chunk provenance stored alongside its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name of the source document.
    pub source_file: String,
    /// 1-based page number for PDF sources.
    pub page: Option<u32>,
    /// Position of the chunk in corpus order.
    pub chunk_index: u32,
    /// The chunk text itself.
    pub content: String,
    /// Timestamp when this embedding was created.
    pub created_at: String,
}

/// Builds and loads the persisted chunk index.
pub struct Indexer<'a> {
    config: &'a Config,
    embedder: &'a dyn Embedder,
}

impl<'a> Indexer<'a> {
    #[inline]
    pub fn new(config: &'a Config, embedder: &'a dyn Embedder) -> Self {
        Self { config, embedder }
    }

    /// Return the persisted index, building it first if none exists. A store
    /// that already holds chunks is reused as-is; the corpus is not re-read
    /// and nothing is written.
    #[inline]
    pub async fn ensure_index(&self) -> Result<VectorStore> {
        let store = VectorStore::new(self.config).await?;

        let existing = store.count_chunks().await?;
        if existing > 0 {
            info!("Loaded persisted index with {} chunks", existing);
            return Ok(store);
        }

        self.build_into(&store).await?;
        Ok(store)
    }

    /// Discard any persisted index and build a fresh one from the current
    /// corpus.
    #[inline]
    pub async fn rebuild(&self) -> Result<VectorStore> {
        let store = VectorStore::new(self.config).await?;
        store.clear().await?;
        self.build_into(&store).await?;
        Ok(store)
    }

    async fn build_into(&self, store: &VectorStore) -> Result<()> {
        let documents_dir = self.config.documents_dir();
        let pages = corpus::load_corpus(&documents_dir)?;

        let chunks = chunking::chunk_corpus(&pages, &self.config.chunking);
        if chunks.is_empty() {
            return Err(CorpusError::Corpus(format!(
                "No indexable documents found in {}",
                documents_dir.display()
            ))
            .into());
        }

        info!(
            "Indexing {} chunks from {} source pages with model {}",
            chunks.len(),
            pages.len(),
            self.embedder.model_name()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .context("Failed to embed corpus chunks")?;

        let created_at = Utc::now().to_rfc3339();
        let records: Vec<EmbeddingRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, vector)| EmbeddingRecord {
                id: Uuid::new_v4().to_string(),
                vector,
                metadata: ChunkMetadata {
                    source_file: chunk.source_file,
                    page: chunk.page,
                    chunk_index: chunk.chunk_index as u32,
                    content: chunk.content,
                    created_at: created_at.clone(),
                },
            })
            .collect();

        store.store_batch(records).await?;

        info!("Index build complete");
        Ok(())
    }
}
