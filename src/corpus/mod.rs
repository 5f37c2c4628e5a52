// Corpus loading module
// Reads the configured documents directory into per-page source text


pub mod chunking;
pub mod pdf;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::CorpusError;

/// One unit of extracted source text: a whole `.txt` file, or a single page
/// of a `.pdf` file.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    /// File name of the source document, without directory components.
    pub source_file: String,
    /// 1-based page number for PDF sources; `None` for plain text files.
    pub page: Option<u32>,
    pub text: String,
}

/// Load every supported document in `dir` (non-recursive). Files are
/// processed in name order so repeated loads see the corpus identically.
/// Any unreadable or unparseable file aborts the whole load.
#[inline]
pub fn load_corpus(dir: &Path) -> Result<Vec<DocumentPage>> {
    if !dir.is_dir() {
        return Err(CorpusError::Corpus(format!(
            "Documents directory does not exist: {}",
            dir.display()
        ))
        .into());
    }

    let mut paths: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read documents directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to enumerate documents in: {}", dir.display()))?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut pages = Vec::new();
    for path in paths {
        let source_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("txt") => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read text file: {}", path.display()))?;
                debug!("Loaded text file {} ({} chars)", source_file, text.len());
                pages.push(DocumentPage {
                    source_file,
                    page: None,
                    text,
                });
            }
            Some("pdf") => {
                let extracted = pdf::extract_pages(&path)?;
                debug!("Loaded PDF {} ({} pages)", source_file, extracted.len());
                for (page_number, text) in extracted {
                    pages.push(DocumentPage {
                        source_file: source_file.clone(),
                        page: Some(page_number),
                        text,
                    });
                }
            }
            _ => {
                debug!("Skipping unsupported file: {}", path.display());
            }
        }
    }

    info!(
        "Loaded corpus from {}: {} pages of source text",
        dir.display(),
        pages.len()
    );

    Ok(pages)
}
