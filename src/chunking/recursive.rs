//! Recursive character splitting.
//!
//! Text is cut on the coarsest separator present (paragraph, line, word,
//! character); pieces still longer than the window are cut again with the
//! next finer separator. Small pieces are then merged back into windows of
//! at most `chunk_size` characters, each window repeating up to
//! `chunk_overlap` characters from the end of the previous one.

use super::{Chunker, ChunkingConfig, TextChunk};
use crate::document::PageText;
use crate::error::Result;
use std::collections::VecDeque;

/// Separators tried in order, coarsest first. The empty separator splits into characters.
const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Recursive character text splitter.
pub struct RecursiveSplitter {
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new() -> Self {
        Self::with_separators(DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_separators(separators: Vec<String>) -> Self {
        Self { separators }
    }

    /// Split a single text into trimmed, non-empty windows.
    pub fn split_text(&self, text: &str, config: &ChunkingConfig) -> Vec<String> {
        self.split_recursive(text, &self.separators, config)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    fn split_recursive(
        &self,
        text: &str,
        separators: &[String],
        config: &ChunkingConfig,
    ) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut fitting: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                final_chunks.extend(merge_pieces(&fitting, config));
                fitting.clear();
            }

            if finer.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, finer, config));
            }
        }

        if !fitting.is_empty() {
            final_chunks.extend(merge_pieces(&fitting, config));
        }

        final_chunks
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for RecursiveSplitter {
    fn chunk(&self, pages: &[PageText], config: &ChunkingConfig) -> Result<Vec<TextChunk>> {
        config.validate()?;

        let mut chunks = Vec::new();
        for page in pages {
            for content in self.split_text(&page.text, config) {
                chunks.push(TextChunk {
                    content,
                    source: page.source.clone(),
                    page_number: page.page_number,
                    order: chunks.len(),
                });
            }
        }

        Ok(chunks)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, keeping it at the start of the following piece.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Merge small pieces into windows with overlap.
fn merge_pieces(pieces: &[&str], config: &ChunkingConfig) -> Vec<String> {
    let mut windows = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
        let len = char_len(piece);

        if total + len > config.chunk_size && !current.is_empty() {
            if let Some(window) = join_window(&current) {
                windows.push(window);
            }

            // Drop from the front until what remains fits as overlap.
            while total > config.chunk_overlap || (total > 0 && total + len > config.chunk_size) {
                match current.pop_front() {
                    Some(first) => total -= char_len(first),
                    None => break,
                }
            }
        }

        current.push_back(piece);
        total += len;
    }

    if let Some(window) = join_window(&current) {
        windows.push(window);
    }

    windows
}

fn join_window(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
