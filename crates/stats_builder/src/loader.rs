//! Input discovery and document loading.
//!
//! Inputs may be files or directories; directories contribute their `*.json`
//! entries (non-recursive, sorted by file name). A file that cannot be read
//! or parsed is reported and skipped.

use anyhow::{Context, Result};
use cricket_core::{sort_canonical, MatchDocument};
use std::fs;
use std::path::{Path, PathBuf};

/// Load counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files: u32,
    pub documents: u32,
    pub failed: u32,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Expand `inputs` into a flat file list, keeping argument order.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("Failed to read input directory: {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_json(path))
                .collect();
            entries.sort();
            files.extend(entries);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Documents of a single file.
pub fn load_file(path: &Path) -> Result<Vec<MatchDocument>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read match file: {}", path.display()))?;
    MatchDocument::parse_all(&text, &file_stem(path))
        .with_context(|| format!("Failed to parse match file: {}", path.display()))
}

/// Load every input and return the documents in canonical processing order.
pub fn load_documents(inputs: &[PathBuf]) -> Result<(Vec<MatchDocument>, LoadStats)> {
    let files = collect_inputs(inputs)?;
    let mut stats = LoadStats::default();
    let mut documents = Vec::new();

    for path in &files {
        stats.files += 1;
        match load_file(path) {
            Ok(docs) => {
                log::debug!("{}: {} document(s)", path.display(), docs.len());
                stats.documents += docs.len() as u32;
                documents.extend(docs);
            }
            Err(e) => {
                stats.failed += 1;
                log::warn!("Skipping {}: {e:#}", path.display());
            }
        }
    }

    sort_canonical(&mut documents);
    Ok((documents, stats))
}
