//! Reference extractor: ranks units by how early their keys are consumed
//! in a wider corpus.
//!
//! The corpus is every readable file under the configured roots, markup
//! artifacts included. A single global position, composed from the
//! deterministic file visitation index and the in-file line number, makes
//! all occurrences comparable across the whole scan. Per-file extraction
//! is pure and runs in parallel; the merge is `min()` per unit, so merge
//! order never affects the result.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::graph::KeyIndex;
use crate::scanner::{ScanWarning, SourceUnit};
use crate::tokens;

/// Sentinel priority for units whose keys are never referenced outside
/// their own file. Larger than any real position.
pub const NEVER_REFERENCED: u64 = u64::MAX;

/// Unit id -> smallest external-reference position.
#[derive(Debug, Clone, Default)]
pub struct PriorityIndex {
    map: FxHashMap<String, u64>,
}

impl PriorityIndex {
    /// Priority of a unit; [`NEVER_REFERENCED`] when no external file
    /// mentions any of its keys.
    pub fn priority(&self, unit: &str) -> u64 {
        self.map.get(unit).copied().unwrap_or(NEVER_REFERENCED)
    }

    pub(crate) fn record_min(&mut self, unit: &str, position: u64) {
        self.map
            .entry(unit.to_string())
            .and_modify(|p| *p = (*p).min(position))
            .or_insert(position);
    }
}

/// Scan corpus roots for literal occurrences of known entity keys.
///
/// A reference found inside the declaring unit's own file does not count.
/// Missing corpus roots are fatal; unreadable individual files are skipped
/// with a warning.
pub fn build_priority_index(
    roots: &[PathBuf],
    units: &[SourceUnit],
    keys: &KeyIndex,
) -> Result<(PriorityIndex, Vec<ScanWarning>)> {
    let mut warnings = Vec::new();
    let files = collect_corpus_files(roots, &mut warnings)?;
    debug!(files = files.len(), "corpus scan starting");

    // Canonical path of the file that declares each key's owner, for the
    // self-reference exclusion.
    let declaring_path: FxHashMap<PathBuf, &str> = units
        .iter()
        .map(|u| (canonical(&u.path), u.id.as_str()))
        .collect();

    let per_file: Vec<std::result::Result<Vec<(String, u64)>, ScanWarning>> = files
        .par_iter()
        .enumerate()
        .map(|(file_idx, path)| {
            let content = fs::read_to_string(path).map_err(|err| ScanWarning {
                path: path.clone(),
                message: format!("unreadable corpus file: {err}"),
            })?;
            Ok(extract_file_references(
                file_idx as u64,
                path,
                &content,
                keys,
                &declaring_path,
            ))
        })
        .collect();

    let mut index = PriorityIndex::default();
    for item in per_file {
        match item {
            Ok(hits) => {
                for (unit, position) in hits {
                    index.record_min(&unit, position);
                }
            }
            Err(warning) => warnings.push(warning),
        }
    }

    Ok((index, warnings))
}

/// All files under the corpus roots, deduplicated and in sorted order so
/// the global position counter is reproducible.
fn collect_corpus_files(
    roots: &[PathBuf],
    warnings: &mut Vec<ScanWarning>,
) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for root in roots {
        if root.is_file() {
            files.insert(canonical(root));
            continue;
        }
        if !root.is_dir() {
            return Err(ResolveError::MissingCorpusPath(root.clone()));
        }
        for entry in WalkBuilder::new(root).build() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|t| t.is_file()) {
                        files.insert(canonical(entry.path()));
                    }
                }
                Err(err) => warnings.push(ScanWarning {
                    path: root.clone(),
                    message: format!("corpus walk error: {err}"),
                }),
            }
        }
    }
    Ok(files.into_iter().collect())
}

fn extract_file_references(
    file_idx: u64,
    path: &Path,
    content: &str,
    keys: &KeyIndex,
    declaring_path: &FxHashMap<PathBuf, &str>,
) -> Vec<(String, u64)> {
    let own_unit = declaring_path.get(&canonical(path)).copied();
    let mut minima: FxHashMap<&str, u64> = FxHashMap::default();

    for (line_no, line) in content.lines().enumerate() {
        let position = (file_idx << 32) | (line_no as u64 + 1);
        for literal in tokens::all_quoted(line) {
            let Some(owner) = keys.owner(literal) else {
                continue;
            };
            if own_unit == Some(owner) {
                continue;
            }
            minima
                .entry(owner)
                .and_modify(|p| *p = (*p).min(position))
                .or_insert(position);
        }
    }

    minima.into_iter().map(|(u, p)| (u.to_string(), p)).collect()
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
