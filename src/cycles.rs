//! Simple-cycle enumeration over the dependency graph.
//!
//! Callers need every cycle listed, not just a yes/no, so this is a
//! Johnson-style enumeration: for each start node, restrict the graph to
//! the strongly connected component containing it among the not-yet-used
//! nodes, then walk circuits with a blocked set. Enumeration stops at a
//! configurable cap; whatever was found up to that point is returned with
//! a `truncated` flag. Cycles are reported, never broken or resolved.

use std::collections::BTreeSet;

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::warn;

use crate::graph::DependencyGraph;

/// Cycle detector configuration.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Maximum number of cycles to enumerate before giving up.
    pub max_cycles: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self { max_cycles: 500 }
    }
}

/// Everything the detector learned about cycles in one graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// Each cycle as an ordered unit-id loop, rotated to start at its
    /// smallest id. The list itself is sorted for reproducible output.
    pub cycles: Vec<Vec<String>>,
    /// Union of all nodes appearing in any reported cycle.
    pub cyclic_nodes: BTreeSet<String>,
    /// True when enumeration hit the cap and stopped early.
    pub truncated: bool,
}

impl CycleReport {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Enumerate all simple cycles of `graph`, up to `config.max_cycles`.
pub fn find_cycles(graph: &DependencyGraph, config: &CycleConfig) -> CycleReport {
    let n = graph.node_count();
    let adjacency = graph.sorted_adjacency();

    let mut search = CircuitSearch {
        adjacency: &adjacency,
        scc: FixedBitSet::with_capacity(n),
        start: 0,
        blocked: FixedBitSet::with_capacity(n),
        block_lists: vec![FxHashSet::default(); n],
        stack: Vec::new(),
        found: Vec::new(),
        max_cycles: config.max_cycles,
        truncated: false,
    };

    for start in 0..n {
        if search.truncated {
            break;
        }
        // Only the SCC containing `start` among nodes >= start can hold a
        // cycle whose smallest index is `start`.
        let Some(component) = scc_containing(&adjacency, start) else {
            continue;
        };
        search.scc.clear();
        for &v in &component {
            search.scc.insert(v);
        }
        search.start = start;
        search.blocked.clear();
        for list in &mut search.block_lists {
            list.clear();
        }
        search.circuit(start);
    }

    if search.truncated {
        warn!(
            cap = config.max_cycles,
            "cycle enumeration truncated at cap; report is partial"
        );
    }

    let mut cycles: Vec<Vec<String>> = search
        .found
        .iter()
        .map(|cycle| {
            cycle
                .iter()
                .map(|&i| graph.node_name(i).to_string())
                .collect::<Vec<_>>()
        })
        .map(|c| rotate_to_smallest(&c))
        .collect();
    cycles.sort();

    let cyclic_nodes: BTreeSet<String> = cycles.iter().flatten().cloned().collect();

    CycleReport {
        cycles,
        cyclic_nodes,
        truncated: search.truncated,
    }
}

/// Rotate a cycle so its lexicographically smallest id comes first,
/// making the representation canonical across enumeration orders.
fn rotate_to_smallest(cycle: &[String]) -> Vec<String> {
    let Some(pivot) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    cycle[pivot..]
        .iter()
        .chain(cycle[..pivot].iter())
        .cloned()
        .collect()
}

struct CircuitSearch<'g> {
    adjacency: &'g [Vec<usize>],
    /// Membership of the component currently being searched.
    scc: FixedBitSet,
    start: usize,
    blocked: FixedBitSet,
    block_lists: Vec<FxHashSet<usize>>,
    stack: Vec<usize>,
    found: Vec<Vec<usize>>,
    max_cycles: usize,
    truncated: bool,
}

impl CircuitSearch<'_> {
    fn circuit(&mut self, v: usize) -> bool {
        let mut found = false;
        self.stack.push(v);
        self.blocked.insert(v);

        let successors: Vec<usize> = self.adjacency[v]
            .iter()
            .copied()
            .filter(|&w| self.scc.contains(w))
            .collect();

        for &w in &successors {
            if self.found.len() >= self.max_cycles {
                self.truncated = true;
                break;
            }
            if w == self.start {
                self.found.push(self.stack.clone());
                found = true;
            } else if !self.blocked.contains(w) && self.circuit(w) {
                found = true;
            }
        }

        if found {
            self.unblock(v);
        } else {
            for &w in &successors {
                self.block_lists[w].insert(v);
            }
        }

        self.stack.pop();
        found
    }

    fn unblock(&mut self, v: usize) {
        self.blocked.set(v, false);
        let pending: Vec<usize> = self.block_lists[v].drain().collect();
        for w in pending {
            if self.blocked.contains(w) {
                self.unblock(w);
            }
        }
    }
}

/// Strongly connected component containing `start`, restricted to nodes
/// with index >= `start`. Returns None when that component is trivial.
///
/// Iterative Tarjan to avoid recursion depth issues on long chains.
fn scc_containing(adjacency: &[Vec<usize>], start: usize) -> Option<Vec<usize>> {
    let n = adjacency.len();
    let mut indices: Vec<Option<u32>> = vec![None; n];
    let mut lowlinks: Vec<u32> = vec![0; n];
    let mut on_stack = FixedBitSet::with_capacity(n);
    let mut scc_stack: Vec<usize> = Vec::new();
    let mut counter: u32 = 0;
    let mut result: Option<Vec<usize>> = None;

    // Work item: (node, position of next successor to examine).
    let mut frames: Vec<(usize, usize)> = vec![(start, 0)];

    while let Some(&(v, next)) = frames.last() {
        if next == 0 {
            indices[v] = Some(counter);
            lowlinks[v] = counter;
            counter += 1;
            scc_stack.push(v);
            on_stack.insert(v);
        }

        let mut child = None;
        let mut pos = next;
        while pos < adjacency[v].len() {
            let w = adjacency[v][pos];
            pos += 1;
            if w < start {
                continue;
            }
            if indices[w].is_none() {
                child = Some(w);
                break;
            }
            if on_stack.contains(w) {
                lowlinks[v] = lowlinks[v].min(indices[w].unwrap_or(0));
            }
        }

        if let Some(frame) = frames.last_mut() {
            frame.1 = pos;
        }
        if let Some(w) = child {
            frames.push((w, 0));
            continue;
        }

        frames.pop();
        if lowlinks[v] == indices[v].unwrap_or(0) {
            let mut component = Vec::new();
            loop {
                let w = scc_stack.pop().unwrap_or(v);
                on_stack.set(w, false);
                component.push(w);
                if w == v {
                    break;
                }
            }
            if component.contains(&start) && component.len() > 1 {
                component.sort_unstable();
                result = Some(component);
            }
        }
        if let Some(&(parent, _)) = frames.last() {
            lowlinks[parent] = lowlinks[parent].min(lowlinks[v]);
        }
    }

    result
}
