//! Prioritized topological ordering.
//!
//! Kahn's algorithm over the dependency graph with a custom tie-break:
//! among ready nodes, the lowest `(priority, identifier)` pair goes first,
//! where priority comes from the reference extractor. Nodes that never
//! become ready (members of cycles, and anything downstream of them) are
//! appended in alphabetical order and the result is flagged partial.
//! Pinned nodes are re-staged to the front literally; a pin that violates
//! a dependency is the caller's responsibility.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use crate::cycles::CycleReport;
use crate::graph::DependencyGraph;
use crate::refindex::PriorityIndex;

/// Final ordering plus everything a caller needs to judge it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderingResult {
    /// Every node exactly once, initialization order.
    pub order: Vec<String>,
    /// All cycles the detector enumerated.
    pub cycles: Vec<Vec<String>>,
    /// Nodes that could not be placed by the topological phase.
    pub fallback_nodes: BTreeSet<String>,
    /// True when cycle enumeration hit its cap.
    pub truncated: bool,
    /// True when any node needed the alphabetical fallback.
    pub partial: bool,
}

/// Order the graph's nodes.
///
/// Deterministic for identical `(graph, priorities, pins)` inputs: the
/// ready set is a heap over `(priority, identifier)` and the fallback
/// group is sorted alphabetically.
pub fn topo_order(
    graph: &DependencyGraph,
    priorities: &PriorityIndex,
    pins: &[String],
    cycle_report: CycleReport,
) -> OrderingResult {
    let n = graph.node_count();
    let mut indegree: Vec<usize> = (0..n).map(|i| graph.indegree(i)).collect();
    let mut placed = vec![false; n];
    let mut order: Vec<String> = Vec::with_capacity(n);

    // Min-heap on (priority, identifier); the node index rides along.
    let mut ready: BinaryHeap<Reverse<(u64, String, usize)>> = (0..n)
        .filter(|&i| indegree[i] == 0)
        .map(|i| {
            let name = graph.node_name(i).to_string();
            Reverse((priorities.priority(&name), name, i))
        })
        .collect();

    while let Some(Reverse((_, name, idx))) = ready.pop() {
        placed[idx] = true;
        order.push(name);
        for succ in graph.sorted_successors(idx) {
            indegree[succ] -= 1;
            if indegree[succ] == 0 {
                let succ_name = graph.node_name(succ).to_string();
                ready.push(Reverse((
                    priorities.priority(&succ_name),
                    succ_name,
                    succ,
                )));
            }
        }
    }

    // Whatever never reached indegree zero sits on a cycle or behind one.
    let mut fallback: Vec<String> = (0..n)
        .filter(|&i| !placed[i])
        .map(|i| graph.node_name(i).to_string())
        .collect();
    fallback.sort();
    let fallback_nodes: BTreeSet<String> = fallback.iter().cloned().collect();
    let partial = !fallback.is_empty();
    order.extend(fallback);

    let order = restage_pins(order, pins);

    debug_assert_eq!(order.len(), n, "ordering must cover every node");
    debug_assert!(
        order.iter().collect::<BTreeSet<_>>().len() == n,
        "ordering must not repeat nodes"
    );

    OrderingResult {
        order,
        cycles: cycle_report.cycles,
        fallback_nodes,
        truncated: cycle_report.truncated,
        partial,
    }
}

/// Move pinned nodes to the front, preserving relative order within the
/// pinned group and within the remainder. Applied literally: no
/// dependency checking, per the documented caller contract.
fn restage_pins(order: Vec<String>, pins: &[String]) -> Vec<String> {
    if pins.is_empty() {
        return order;
    }
    let pin_set: BTreeSet<&str> = pins.iter().map(String::as_str).collect();
    for pin in &pin_set {
        if !order.iter().any(|id| id == pin) {
            warn!(pin = %pin, "pinned node is not part of the scanned corpus, ignored");
        }
    }

    let (pinned, rest): (Vec<String>, Vec<String>) = order
        .into_iter()
        .partition(|id| pin_set.contains(id.as_str()));
    let mut staged = pinned;
    staged.extend(rest);
    staged
}
