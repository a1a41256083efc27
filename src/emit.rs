//! Pure formatting of ordering results. No I/O and no algorithmic
//! content; writing the output anywhere is the caller's concern.

use crate::order::OrderingResult;

/// Format the final sequence, one initialization statement per line,
/// preceded by an explanatory `#` header.
pub fn format_order(result: &OrderingResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# initialization order ({} units)\n",
        result.order.len()
    ));
    if result.partial {
        out.push_str(&format!(
            "# partial: {} units in or behind dependency cycles, appended alphabetically\n",
            result.fallback_nodes.len()
        ));
    }
    if result.truncated {
        out.push_str("# cycle enumeration truncated at the configured cap\n");
    }
    for id in &result.order {
        out.push_str(id);
        out.push('\n');
    }
    out
}

/// Format detected cycles: a leading count, then one arrow-joined chain
/// per cycle, closed back on its first node.
pub fn format_cycles(cycles: &[Vec<String>], truncated: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} cycles\n", cycles.len()));
    if truncated {
        out.push_str("# enumeration truncated at the configured cap\n");
    }
    for cycle in cycles {
        let mut chain = cycle.join(" -> ");
        if let Some(first) = cycle.first() {
            chain.push_str(" -> ");
            chain.push_str(first);
        }
        out.push_str(&chain);
        out.push('\n');
    }
    out
}
