//! End-to-end pipeline tests over real file-tree fixtures.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use modorder::{emit, resolve, ResolveOptions};

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// base declares m.base; child depends on it; orphan stands alone.
fn base_child_orphan() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "base.py", "_name = 'm.base'\n");
    write(
        tmp.path(),
        "child.py",
        "_name = 'm.child'\n_inherit = 'm.base'\n",
    );
    write(tmp.path(), "orphan.py", "_name = 'm.orphan'\n");
    tmp
}

#[test]
fn end_to_end_priority_ranks_referenced_units_first() {
    let tmp = base_child_orphan();
    // An external artifact mentions m.base before m.orphan, so among
    // otherwise-unconstrained nodes orphan still outranks the never
    // referenced child.
    write(
        tmp.path(),
        "views.xml",
        "<record ref=\"m.base\"/>\n<record ref=\"m.orphan\"/>\n",
    );

    let resolution = resolve(&ResolveOptions::new(tmp.path())).unwrap();
    assert_eq!(resolution.result.order, vec!["base", "orphan", "child"]);
    assert!(!resolution.result.partial);
    assert!(resolution.result.cycles.is_empty());
}

#[test]
fn end_to_end_all_sentinels_fall_back_to_identifiers() {
    let tmp = base_child_orphan();

    let resolution = resolve(&ResolveOptions::new(tmp.path())).unwrap();
    // child is referenced by nothing and neither is orphan, so once base
    // is placed the tie between them is purely alphabetical. child always
    // follows base either way.
    assert_eq!(resolution.result.order, vec!["base", "child", "orphan"]);
    let base = resolution.result.order.iter().position(|i| i == "base");
    let child = resolution.result.order.iter().position(|i| i == "child");
    assert!(base < child);
}

#[test]
fn identical_snapshots_give_byte_identical_output() {
    let tmp = base_child_orphan();
    write(tmp.path(), "views.xml", "<field name=\"m.base\"/>\n");

    let options = ResolveOptions::new(tmp.path());
    let first = resolve(&options).unwrap();
    let second = resolve(&options).unwrap();

    assert_eq!(
        emit::format_order(&first.result),
        emit::format_order(&second.result)
    );
    assert_eq!(
        emit::format_cycles(&first.result.cycles, first.result.truncated),
        emit::format_cycles(&second.result.cycles, second.result.truncated)
    );
}

#[test]
fn output_is_a_valid_topological_order_of_the_acyclic_subgraph() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.py", "_name = 'm.a'\n");
    write(tmp.path(), "b.py", "_name = 'm.b'\n_inherit = 'm.a'\n");
    write(
        tmp.path(),
        "c.py",
        "_name = 'm.c'\n_inherit = ['m.a', 'm.b']\n",
    );
    write(tmp.path(), "d.py", "_name = 'm.d'\n_inherit = 'm.c'\n");

    let resolution = resolve(&ResolveOptions::new(tmp.path())).unwrap();
    let pos = |id: &str| {
        resolution
            .result
            .order
            .iter()
            .position(|i| i == id)
            .unwrap()
    };
    assert!(pos("a") < pos("b"));
    assert!(pos("a") < pos("c"));
    assert!(pos("b") < pos("c"));
    assert!(pos("c") < pos("d"));
    assert_eq!(resolution.result.order.len(), 4);
    assert_eq!(resolution.unit_count, 4);
}

#[test]
fn cyclic_units_are_reported_and_appended_alphabetically() {
    let tmp = TempDir::new().unwrap();
    // a -> b -> c -> a plus the unrelated chain d -> e.
    write(tmp.path(), "a.py", "_name = 'm.a'\n_inherit = 'm.c'\n");
    write(tmp.path(), "b.py", "_name = 'm.b'\n_inherit = 'm.a'\n");
    write(tmp.path(), "c.py", "_name = 'm.c'\n_inherit = 'm.b'\n");
    write(tmp.path(), "d.py", "_name = 'm.d'\n");
    write(tmp.path(), "e.py", "_name = 'm.e'\n_inherit = 'm.d'\n");

    let resolution = resolve(&ResolveOptions::new(tmp.path())).unwrap();
    assert_eq!(resolution.result.order, vec!["d", "e", "a", "b", "c"]);
    assert_eq!(resolution.result.cycles, vec![vec!["a", "b", "c"]]);
    assert!(resolution.result.partial);
}

#[test]
fn self_looping_unit_is_clean() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "selfy.py",
        "_name = 'm.selfy'\n_inherit = 'm.selfy'\n",
    );

    let resolution = resolve(&ResolveOptions::new(tmp.path())).unwrap();
    assert_eq!(resolution.edge_count, 0);
    assert!(resolution.result.cycles.is_empty());
    assert_eq!(resolution.result.order, vec!["selfy"]);
}

#[test]
fn pins_restage_the_front_of_the_order() {
    let tmp = base_child_orphan();

    let mut options = ResolveOptions::new(tmp.path());
    options.pins = vec!["child".to_string()];
    let resolution = resolve(&options).unwrap();
    // Literal pin contract: child jumps ahead of its own base.
    assert_eq!(resolution.result.order[0], "child");
    assert_eq!(resolution.result.order.len(), 3);
}

#[test]
fn unreadable_files_warn_but_do_not_stop_the_run() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "good.py", "_name = 'm.good'\n");
    fs::write(tmp.path().join("broken.py"), [0xE2, 0x80, 0xFF]).unwrap();

    let resolution = resolve(&ResolveOptions::new(tmp.path())).unwrap();
    assert_eq!(resolution.result.order, vec!["good"]);
    assert!(!resolution.warnings.is_empty());
}

#[test]
fn missing_source_dir_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let gone = tmp.path().join("absent");
    assert!(resolve(&ResolveOptions::new(&gone)).is_err());
}
