//! modorder - deterministic initialization-order resolver for declarative
//! entity modules.
//!
//! Given a directory of source units that each declare a uniquely keyed
//! entity and reference other entities (inheritance or field relations),
//! the resolver computes a safe initialization order, enumerates circular
//! dependencies in full, and ranks otherwise-unconstrained units by how
//! early their keys are consumed in a wider corpus.
//!
//! # Pipeline
//!
//! Scan -> Extract References -> Build Graph -> Detect Cycles -> Order ->
//! Emit. The two scanning passes are data-parallel internally and merge
//! with commutative operations, so every run over an unchanged snapshot
//! produces byte-identical output. Nothing persists between runs.
//!
//! # Quick start
//!
//! ```no_run
//! use modorder::{resolve, ResolveOptions};
//!
//! let options = ResolveOptions::new("./models");
//! let resolution = resolve(&options)?;
//! for id in &resolution.result.order {
//!     println!("{id}");
//! }
//! # Ok::<(), modorder::ResolveError>(())
//! ```

pub mod cycles;
pub mod emit;
pub mod error;
pub mod graph;
pub mod order;
pub mod refindex;
pub mod scanner;
pub mod tokens;

use std::path::{Path, PathBuf};

use tracing::info;

pub use crate::cycles::{CycleConfig, CycleReport};
pub use crate::error::{ResolveError, Result};
pub use crate::graph::{DependencyGraph, KeyIndex};
pub use crate::order::OrderingResult;
pub use crate::refindex::{PriorityIndex, NEVER_REFERENCED};
pub use crate::scanner::{ScanConfig, ScanWarning, SourceUnit};

/// Everything one resolver invocation needs; no hidden configuration.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Directory holding the declarative source units.
    pub source_dir: PathBuf,
    /// Extra corpus roots scanned for reference priority. The source
    /// directory itself is always part of the corpus.
    pub corpus: Vec<PathBuf>,
    /// Unit ids forced to the front of the output, literally.
    pub pins: Vec<String>,
    /// Source scanner configuration.
    pub scan: ScanConfig,
    /// Cycle enumeration cap.
    pub cycles: CycleConfig,
}

impl ResolveOptions {
    pub fn new(source_dir: impl AsRef<Path>) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            corpus: Vec::new(),
            pins: Vec::new(),
            scan: ScanConfig::default(),
            cycles: CycleConfig::default(),
        }
    }
}

/// One full resolver run: ordering plus the diagnostics gathered on the way.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Ordering, cycle list, fallback set, partial/truncated flags.
    pub result: OrderingResult,
    /// Non-fatal per-file problems from both scanning passes.
    pub warnings: Vec<ScanWarning>,
    /// Number of source units scanned.
    pub unit_count: usize,
    /// Number of dependency edges in the graph.
    pub edge_count: usize,
}

/// Run the whole pipeline over the current file-tree snapshot.
///
/// Pure function of its input snapshot: identical inputs give identical
/// results, and no state crosses invocations.
pub fn resolve(options: &ResolveOptions) -> Result<Resolution> {
    let scan = scanner::scan_source_dir(&options.source_dir, &options.scan)?;
    info!(
        units = scan.units.len(),
        keys = scan.key_index.len(),
        "source scan complete"
    );

    let mut corpus_roots = vec![options.source_dir.clone()];
    corpus_roots.extend(options.corpus.iter().cloned());
    let (priorities, mut ref_warnings) =
        refindex::build_priority_index(&corpus_roots, &scan.units, &scan.key_index)?;

    let graph = DependencyGraph::build(&scan.units, &scan.key_index);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "dependency graph built"
    );

    let cycle_report = cycles::find_cycles(&graph, &options.cycles);
    if cycle_report.has_cycles() {
        info!(
            cycles = cycle_report.cycles.len(),
            nodes = cycle_report.cyclic_nodes.len(),
            "circular dependencies detected"
        );
    }

    let result = order::topo_order(&graph, &priorities, &options.pins, cycle_report);

    let mut warnings = scan.warnings;
    warnings.append(&mut ref_warnings);

    Ok(Resolution {
        result,
        warnings,
        unit_count: scan.units.len(),
        edge_count: graph.edge_count(),
    })
}
