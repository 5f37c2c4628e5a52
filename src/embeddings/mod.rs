// Embedding generation module
// The Embedder trait is the substitution seam for tests and alternate backends

pub mod ollama;

use anyhow::Result;

/// A text-embedding backend. The same embedder instance must be used for
/// index construction and query embedding; vectors from different models are
/// not comparable.
pub trait Embedder: Send + Sync {
    /// Embed a single text, returning one vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed multiple texts, returning one vector per input in order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Name of the underlying embedding model.
    fn model_name(&self) -> &str;
}
