//! PDF text extraction built on lopdf. Pulls the text-showing operators out
//! of each page's content stream.

#[cfg(test)]
mod tests;

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::CorpusError;

/// Extract the text of every page of a PDF, as `(page_number, text)` pairs
/// with 1-based page numbers. Pages with no text are omitted; a document
/// yielding no text at all is an error.
#[inline]
pub fn extract_pages(path: &Path) -> Result<Vec<(u32, String)>> {
    let doc = lopdf::Document::load(path).map_err(|e| {
        CorpusError::Corpus(format!("Failed to load PDF {}: {}", path.display(), e))
    })?;

    let mut pages = Vec::new();

    for (index, page_id) in doc.page_iter().enumerate() {
        let page_number = (index + 1) as u32;
        let content = doc.get_page_content(page_id).map_err(|e| {
            CorpusError::Corpus(format!(
                "Failed to read page {} of {}: {}",
                page_number,
                path.display(),
                e
            ))
        })?;

        let text = clean_text(&extract_text_from_content(&content));
        if !text.is_empty() {
            pages.push((page_number, text));
        }
    }

    if pages.is_empty() {
        return Err(CorpusError::Corpus(format!(
            "No text content extracted from PDF: {}",
            path.display()
        ))
        .into());
    }

    debug!(
        "Extracted {} text pages from {}",
        pages.len(),
        path.display()
    );

    Ok(pages)
}

/// Walk a page content stream and collect text from BT/ET blocks.
fn extract_text_from_content(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_text = String::new();

    for line in content_str.lines() {
        let trimmed = line.trim();

        if trimmed == "BT" {
            in_text_block = true;
            continue;
        }

        if trimmed == "ET" {
            in_text_block = false;
            if !current_text.is_empty() {
                text.push_str(&current_text);
                text.push(' ');
                current_text.clear();
            }
            continue;
        }

        if in_text_block {
            if let Some(text_content) = extract_text_from_operator(trimmed) {
                current_text.push_str(&text_content);
            }
        }
    }

    text
}

/// Extract text from a single `Tj`, `'`, `"`, or `TJ` operator line.
fn extract_text_from_operator(line: &str) -> Option<String> {
    if line.ends_with("Tj") || line.ends_with('\'') || line.ends_with('"') {
        if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
            if start < end {
                return Some(decode_pdf_string(&line[start + 1..end]));
            }
        }
    }

    // [(text) num (text) num] TJ arrays
    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut in_paren = false;
        let mut current = String::new();

        for ch in line.chars() {
            match ch {
                '(' => {
                    in_paren = true;
                }
                ')' => {
                    in_paren = false;
                    result.push_str(&decode_pdf_string(&current));
                    current.clear();
                }
                _ if in_paren => {
                    current.push(ch);
                }
                _ => {}
            }
        }

        if !result.is_empty() {
            return Some(result);
        }
    }

    None
}

/// Decode PDF literal-string escapes.
fn decode_pdf_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('(') => result.push('('),
                Some(')') => result.push(')'),
                Some(c) => result.push(c),
                None => {}
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Collapse runs of whitespace and strip BOM artifacts.
fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{FEFF}', "")
}
