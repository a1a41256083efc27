//! Dependency graph construction from scanned source units.
//!
//! The graph's nodes are source-unit identifiers; a directed edge
//! `base -> dependent` means the base unit must initialize first.
//! Dependency keys are resolved through an explicit [`KeyIndex`] that is
//! threaded through every call, so the builder holds no hidden state and
//! can be exercised directly in tests.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::scanner::SourceUnit;

/// Entity key to owning-unit mapping, first declaration wins.
///
/// Rebuilt fresh for every run from the scanned units; later duplicate
/// declarations of a key never displace the original owner.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    map: FxHashMap<String, String>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `unit` as the owner of `key` unless the key already has one.
    /// Returns false when the key was already claimed.
    pub fn declare(&mut self, key: &str, unit: &str) -> bool {
        if self.map.contains_key(key) {
            return false;
        }
        self.map.insert(key.to_string(), unit.to_string());
        true
    }

    /// Owning unit id for a key, if the key was declared by any scanned unit.
    pub fn owner(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Directed dependency graph with per-node indegree counts.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Node names (index -> unit id).
    nodes: Vec<String>,
    /// Unit id to index mapping.
    index: FxHashMap<String, usize>,
    /// Adjacency: base index -> set of dependent indices.
    edges: FxHashMap<usize, FxHashSet<usize>>,
    /// Number of distinct predecessors per node.
    indegree: Vec<usize>,
}

impl DependencyGraph {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
            edges: FxHashMap::default(),
            indegree: Vec::new(),
        }
    }

    /// Build the graph for a set of scanned units.
    ///
    /// Every unit becomes a node even with zero edges. Each dependency is
    /// resolved to its owning unit through `keys`; unresolved keys impose
    /// no constraint and are dropped, as are edges a unit would draw to
    /// itself through a key it owns.
    pub fn build(units: &[SourceUnit], keys: &KeyIndex) -> Self {
        let mut graph = Self::new();

        for unit in units {
            graph.add_node(&unit.id);
        }

        for unit in units {
            let to = graph.index[&unit.id];
            for dep in &unit.deps {
                let Some(owner) = keys.owner(&dep.key) else {
                    debug!(key = %dep.key, unit = %unit.id, "dependency key has no known owner, dropped");
                    continue;
                };
                if owner == unit.id {
                    continue;
                }
                // Owners always come from scanned units, so the node exists.
                let from = graph.index[owner];
                graph.add_edge(from, to);
            }
        }

        graph
    }

    fn add_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(id.to_string());
        self.index.insert(id.to_string(), idx);
        self.indegree.push(0);
        idx
    }

    /// Add an edge from base to dependent. Duplicate edges between the
    /// same pair coalesce; indegree counts distinct predecessors only.
    fn add_edge(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        if self.edges.entry(from).or_default().insert(to) {
            self.indegree[to] += 1;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|e| e.len()).sum()
    }

    pub fn node_name(&self, idx: usize) -> &str {
        &self.nodes[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn indegree(&self, idx: usize) -> usize {
        self.indegree[idx]
    }

    /// Successor indices of a node in ascending order. Sorted so every
    /// traversal over the graph is reproducible.
    pub fn sorted_successors(&self, idx: usize) -> Vec<usize> {
        let mut succ: Vec<usize> = self
            .edges
            .get(&idx)
            .map(|e| e.iter().copied().collect())
            .unwrap_or_default();
        succ.sort_unstable();
        succ
    }

    /// Full adjacency in sorted form, index-aligned with nodes.
    pub fn sorted_adjacency(&self) -> Vec<Vec<usize>> {
        (0..self.nodes.len())
            .map(|i| self.sorted_successors(i))
            .collect()
    }
}
