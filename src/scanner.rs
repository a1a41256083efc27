//! Source unit scanner.
//!
//! Enumerates declarative source files under a target directory and
//! extracts, per file: at most one declared entity key (`_name`) and any
//! number of dependency references (`_inherit` in single or list form,
//! `_inherits` dict parents, `comodel_name=` field relations).
//!
//! Files are discovered with the `ignore` walker, parsed in parallel with
//! rayon, and merged in sorted-path order so the outcome is identical for
//! identical snapshots. Unreadable files are skipped and recorded as
//! warnings; the scan continues.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ResolveError, Result};
use crate::graph::KeyIndex;
use crate::tokens;

/// Scanner configuration. What counts as a declarative source file is a
/// deployment decision, not a resolver invariant.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extension of declarative source units (without the dot).
    pub extension: String,
    /// Aggregator/bootstrap file names excluded from scanning.
    pub exclude_files: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            exclude_files: vec!["__init__.py".to_string(), "__manifest__.py".to_string()],
        }
    }
}

/// One dependency reference extracted from a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReference {
    /// Target entity key.
    pub key: String,
    /// Whether the reference came from a list-valued declaration.
    pub from_list: bool,
}

/// One scanned source unit.
#[derive(Debug, Clone, Serialize)]
pub struct SourceUnit {
    /// Stable identifier: path relative to the scan root, extension stripped.
    pub id: String,
    /// Absolute or root-relative path of the file on disk.
    pub path: PathBuf,
    /// Declared entity key, if the unit declares one.
    pub key: Option<String>,
    /// Dependency references, self-references already dropped.
    pub deps: Vec<DependencyReference>,
}

/// Non-fatal problem encountered while scanning.
#[derive(Debug, Clone, Serialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Result of a source-directory scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Units in sorted-path order.
    pub units: Vec<SourceUnit>,
    /// Entity key to owning unit, first declaration wins.
    pub key_index: KeyIndex,
    /// Per-file problems that did not stop the scan.
    pub warnings: Vec<ScanWarning>,
}

/// Scan a source directory for entity declarations.
///
/// A missing or non-directory root is fatal; everything file-level is
/// recovered locally and surfaced through [`ScanOutcome::warnings`].
pub fn scan_source_dir(root: &Path, config: &ScanConfig) -> Result<ScanOutcome> {
    if !root.is_dir() {
        return Err(ResolveError::MissingSourceDir(root.to_path_buf()));
    }

    let mut warnings = Vec::new();
    let mut files = collect_source_files(root, config, &mut warnings);
    files.sort();
    debug!(files = files.len(), root = %root.display(), "source scan starting");

    let parsed: Vec<std::result::Result<SourceUnit, ScanWarning>> = files
        .par_iter()
        .map(|path| match fs::read_to_string(path) {
            Ok(content) => Ok(parse_unit(root, path, &content)),
            Err(err) => Err(ScanWarning {
                path: path.clone(),
                message: format!("unreadable source file: {err}"),
            }),
        })
        .collect();

    let mut units = Vec::with_capacity(parsed.len());
    for item in parsed {
        match item {
            Ok(unit) => units.push(unit),
            Err(warning) => {
                warn!(path = %warning.path.display(), "{}", warning.message);
                warnings.push(warning);
            }
        }
    }

    // Ownership is first-seen in sorted-path order; duplicates keep the
    // original owner and contribute no edges for that key.
    let mut key_index = KeyIndex::new();
    for unit in &units {
        if let Some(ref key) = unit.key {
            if !key_index.declare(key, &unit.id) {
                warn!(
                    key = %key,
                    unit = %unit.id,
                    owner = key_index.owner(key).unwrap_or("?"),
                    "duplicate entity key declaration ignored"
                );
            }
        }
    }

    Ok(ScanOutcome {
        units,
        key_index,
        warnings,
    })
}

fn collect_source_files(
    root: &Path,
    config: &ScanConfig,
    warnings: &mut Vec<ScanWarning>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let ext_ok = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(&config.extension));
                let name_excluded = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| config.exclude_files.iter().any(|x| x == n));
                if ext_ok && !name_excluded {
                    files.push(path.to_path_buf());
                }
            }
            Err(err) => {
                warnings.push(ScanWarning {
                    path: root.to_path_buf(),
                    message: format!("walk error: {err}"),
                });
            }
        }
    }
    files
}

/// Unit identifier: root-relative path, extension stripped, `/` separators.
pub(crate) fn unit_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel.with_extension("");
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn parse_unit(root: &Path, path: &Path, content: &str) -> SourceUnit {
    let mut key: Option<String> = None;
    let mut deps: Vec<DependencyReference> = Vec::new();

    for line in content.lines() {
        if let Some(value) = tokens::directive_value(line, "_name") {
            if key.is_none() {
                key = tokens::first_quoted(value).map(String::from);
            }
        } else if let Some(value) = tokens::directive_value(line, "_inherit") {
            let from_list = tokens::is_list_form(value);
            for k in tokens::all_quoted(value) {
                deps.push(DependencyReference {
                    key: k.to_string(),
                    from_list,
                });
            }
        } else if let Some(value) = tokens::directive_value(line, "_inherits") {
            // Dict form: parent keys are dotted entity keys, values are
            // plain field names.
            for k in tokens::all_quoted(value) {
                if k.contains('.') {
                    deps.push(DependencyReference {
                        key: k.to_string(),
                        from_list: true,
                    });
                }
            }
        } else if let Some(k) = tokens::keyword_value(line, "comodel_name") {
            deps.push(DependencyReference {
                key: k.to_string(),
                from_list: false,
            });
        }
    }

    // The key may appear after an _inherit of the same key, so
    // self-references are filtered once the whole unit is parsed.
    if let Some(ref own) = key {
        deps.retain(|d| &d.key != own);
    }

    SourceUnit {
        id: unit_id(root, path),
        path: path.to_path_buf(),
        key,
        deps,
    }
}
