//! Tests for traversals over a loaded component map

use depgraph_graph::{
    expand_closure, find_entry_points, find_entry_points_with_marker, load,
    order_dependency_first, ComponentGraph, ComponentMap,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// A graph file as written by another tool: minimal records, a cycle
/// between `svc.a` and `svc.b`, and a module-prefixed edge.
const GRAPH: &str = r#"{
  "svc.main": {
    "id": "svc.main",
    "component_type": "function",
    "file_path": "/p/svc.py",
    "relative_path": "svc.py",
    "depends_on": ["svc.a", "svc.Config"]
  },
  "svc.a": {
    "id": "svc.a",
    "component_type": "function",
    "file_path": "/p/svc.py",
    "relative_path": "svc.py",
    "depends_on": ["svc.b"]
  },
  "svc.b": {
    "id": "svc.b",
    "component_type": "function",
    "file_path": "/p/svc.py",
    "relative_path": "svc.py",
    "depends_on": ["svc.a", "svc.helpers_missing"]
  },
  "svc.Config": {
    "id": "svc.Config",
    "component_type": "class",
    "file_path": "/p/svc.py",
    "relative_path": "svc.py",
    "depends_on": ["svc.Config.load"],
    "source_code": "class Config"
  },
  "svc.Config.load": {
    "id": "svc.Config.load",
    "component_type": "method",
    "file_path": "/p/svc.py",
    "relative_path": "svc.py"
  },
  "worker.domain_main": {
    "id": "worker.domain_main",
    "component_type": "function",
    "file_path": "/p/worker.py",
    "relative_path": "worker.py",
    "depends_on": ["svc.main"]
  }
}"#;

fn load_fixture() -> ComponentMap {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("graph.json");
    std::fs::write(&path, GRAPH).unwrap();
    load(&path).unwrap()
}

fn ids(components: Vec<&depgraph_graph::Component>) -> Vec<&str> {
    components.into_iter().map(|c| c.id.as_str()).collect()
}

#[test]
fn test_load_fills_defaults() {
    let map = load_fixture();
    let load_method = &map["svc.Config.load"];
    assert!(load_method.depends_on.is_empty());
    assert_eq!(load_method.start_line, 0);
    assert!(!load_method.has_docstring);
    assert_eq!(load_method.owner_id(), Some("svc.Config"));
}

#[test]
fn test_entry_points() {
    let map = load_fixture();
    // svc.main has a dependent, so only the worker qualifies
    assert_eq!(find_entry_points(&map), vec!["worker.domain_main"]);
    assert!(find_entry_points_with_marker(&map, "nothing").is_empty());
}

#[test]
fn test_closure_expands_through_cycle() {
    let map = load_fixture();
    assert_eq!(
        ids(expand_closure(&map, "worker.domain_main")),
        vec![
            "worker.domain_main",
            "svc.main",
            "svc.Config",
            "svc.Config.load",
            "svc.a",
            "svc.b",
        ]
    );
    assert_eq!(ids(expand_closure(&map, "svc.b")), vec!["svc.b", "svc.a"]);
}

#[test]
fn test_dependency_first_order_covers_everything_once() {
    let map = load_fixture();
    let order = order_dependency_first(&map);

    assert_eq!(
        order,
        vec![
            "svc.Config.load",
            "svc.Config",
            "svc.b",
            "svc.a",
            "svc.main",
            "worker.domain_main",
        ]
    );

    let position = |id: &str| order.iter().position(|o| o == id).unwrap();
    assert!(position("svc.Config.load") < position("svc.Config"));
    assert!(position("svc.main") < position("worker.domain_main"));
}

#[test]
fn test_component_graph_view() {
    let map = load_fixture();
    let graph = ComponentGraph::from_components(&map);

    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 6);
    assert_eq!(graph.dependents("svc.a").unwrap(), vec!["svc.b", "svc.main"]);
    assert_eq!(graph.cycles(), vec![vec!["svc.a", "svc.b"]]);
    assert_eq!(graph.entry_points("main"), find_entry_points(&map));
}
