//! Markdown documentation loader.
//!
//! Walks a directory for `.md`/`.markdown` files and cuts each into passages
//! with `text-splitter`'s `MarkdownSplitter`, which prefers heading, block and
//! paragraph boundaries before falling back to sentences and words.

use std::fs;
use std::path::{Path, PathBuf};

use docbot_core::error::RetrievalError;
use docbot_core::retriever::Document;
use text_splitter::{ChunkConfig, ChunkConfigError, MarkdownSplitter};
use tracing::{debug, warn};

/// Load every markdown file under `dir` as a list of passages.
///
/// Each passage's `source` is the file path relative to `dir`. Files that
/// cannot be read are skipped with a warning.
pub fn load_markdown_dir(
    dir: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Document>, RetrievalError> {
    if !dir.is_dir() {
        return Err(RetrievalError::LoadFailed {
            path: dir.display().to_string(),
            reason: "not a directory".into(),
        });
    }

    // Validate the splitter settings once, before touching any file.
    ChunkConfig::new(chunk_size.max(1))
        .with_overlap(chunk_overlap)
        .map_err(|e| RetrievalError::LoadFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

    let mut files = Vec::new();
    collect_markdown_files(dir, &mut files)?;
    files.sort();

    let mut documents = Vec::new();
    for path in files {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Skipping unreadable documentation file"
                );
                continue;
            }
        };

        let source = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        let passages = split_passages(&text, chunk_size, chunk_overlap).map_err(|e| {
            RetrievalError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        debug!(source = %source, passages = passages.len(), "Loaded documentation file");
        documents.extend(passages.into_iter().map(|p| Document::new(p, source.clone())));
    }

    Ok(documents)
}

fn collect_markdown_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RetrievalError> {
    let entries = fs::read_dir(dir).map_err(|e| RetrievalError::LoadFailed {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_markdown_files(&path, out)?;
        } else if is_markdown(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
}

/// Split `text` into heading-aware passages of at most `chunk_size` characters.
///
/// Consecutive passages share up to `chunk_overlap` characters. Fails when
/// the overlap is not smaller than the chunk size.
pub fn split_passages(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<String>, ChunkConfigError> {
    let config = ChunkConfig::new(chunk_size.max(1)).with_overlap(chunk_overlap)?;
    let splitter = MarkdownSplitter::new(config);

    Ok(splitter
        .chunks(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect())
}
