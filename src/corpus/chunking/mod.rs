//! Length-based text chunking with overlap. Splitting is measured purely in
//! characters; boundaries prefer paragraph breaks, then line breaks, then
//! whitespace within the window.


use serde::{Deserialize, Serialize};

use crate::corpus::DocumentPage;

/// Chunking parameters, measured in characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters of trailing context carried into the next chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

/// A bounded span of source document text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub content: String,
    /// File name of the source document.
    pub source_file: String,
    /// 1-based page number for PDF sources.
    pub page: Option<u32>,
    /// Position of this chunk in corpus order.
    pub chunk_index: usize,
}

/// Chunk every page of the corpus, assigning global chunk indices in corpus
/// order. Deterministic for a fixed corpus and configuration.
#[inline]
pub fn chunk_corpus(pages: &[DocumentPage], config: &ChunkingConfig) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();

    for page in pages {
        for content in split_text(&page.text, config.chunk_size, config.chunk_overlap) {
            let chunk_index = chunks.len();
            chunks.push(DocumentChunk {
                content,
                source_file: page.source_file.clone(),
                page: page.page,
                chunk_index,
            });
        }
    }

    chunks
}

/// Split text into chunks of at most `chunk_size` characters, each starting
/// `overlap` characters before the previous chunk's end.
#[inline]
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    // Byte offset of every char boundary, including the end of the string.
    let boundaries: Vec<usize> = trimmed
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(trimmed.len()))
        .collect();
    let total_chars = boundaries.len() - 1;

    if total_chars <= chunk_size {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let window_end = (start + chunk_size).min(total_chars);
        let cut = if window_end == total_chars {
            total_chars
        } else {
            find_cut(trimmed, &boundaries, start, window_end)
        };

        let piece = trimmed[boundaries[start]..boundaries[cut]].trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if cut == total_chars {
            break;
        }

        // Overlap backtracks from the cut, but must always advance.
        start = cut.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Pick a split position inside the window `[start, window_end)`, preferring
/// a paragraph break, then a line break, then whitespace, each searched in
/// the second half of the window so chunks stay near the target size. Falls
/// back to a hard cut at the window end.
fn find_cut(text: &str, boundaries: &[usize], start: usize, window_end: usize) -> usize {
    let window_chars = window_end - start;
    let min_cut = start + window_chars / 2;

    let mut paragraph = None;
    let mut line = None;
    let mut space = None;

    for pos in (min_cut..window_end).rev() {
        let ch_start = boundaries[pos];
        let ch = text[ch_start..boundaries[pos + 1]]
            .chars()
            .next()
            .unwrap_or(' ');

        if ch == '\n' {
            if line.is_none() {
                line = Some(pos);
            }
            if paragraph.is_none() && pos > 0 && text[..ch_start].ends_with('\n') {
                paragraph = Some(pos);
                break;
            }
        } else if ch.is_whitespace() && space.is_none() {
            space = Some(pos);
        }
    }

    paragraph.or(line).or(space).unwrap_or(window_end)
}
