use crate::builder::ComponentMap;
use crate::config::DEFAULT_ENTRY_MARKER;
use depgraph_extractor::Component;
use std::collections::HashSet;

/// Entry points named after the default marker (`main`)
pub fn find_entry_points(components: &ComponentMap) -> Vec<String> {
    find_entry_points_with_marker(components, DEFAULT_ENTRY_MARKER)
}

/// Components with at least one dependency, no dependents, and an id that
/// contains `marker` (case-insensitive). Sorted by id.
pub fn find_entry_points_with_marker(components: &ComponentMap, marker: &str) -> Vec<String> {
    let depended_on: HashSet<&str> = components
        .values()
        .flat_map(|c| c.depends_on.iter())
        .filter(|target| components.contains_key(target.as_str()))
        .map(String::as_str)
        .collect();

    let marker = marker.to_lowercase();
    components
        .values()
        .filter(|c| !c.depends_on.is_empty() && !depended_on.contains(c.id.as_str()))
        .filter(|c| c.id.to_lowercase().contains(&marker))
        .map(|c| c.id.clone())
        .collect()
}

/// Every component id with its dependencies before it.
///
/// Depth-first post-order over ids in sorted order. Dependencies outside the
/// map are ignored; on a cycle, the component first reached is emitted after
/// the rest of the cycle.
pub fn order_dependency_first(components: &ComponentMap) -> Vec<String> {
    let mut order = Vec::with_capacity(components.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for start in components.keys() {
        // (id, whether its dependencies were already pushed)
        let mut stack: Vec<(&str, bool)> = vec![(start.as_str(), false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id.to_string());
                continue;
            }
            if !seen.insert(id) {
                continue;
            }
            stack.push((id, true));
            let Some(component) = components.get(id) else {
                continue;
            };
            for dep in component.depends_on.iter().rev() {
                if components.contains_key(dep.as_str()) && !seen.contains(dep.as_str()) {
                    stack.push((dep.as_str(), false));
                }
            }
        }
    }

    order
}

/// A component and everything it depends on, transitively.
///
/// Pre-order, each component once, dependencies visited in sorted order.
/// Unknown ids (the start included) contribute nothing.
pub fn expand_closure<'a>(components: &'a ComponentMap, id: &str) -> Vec<&'a Component> {
    let mut result = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack = vec![id];

    while let Some(current) = stack.pop() {
        let Some(component) = components.get(current) else {
            continue;
        };
        if !seen.insert(component.id.as_str()) {
            continue;
        }
        result.push(component);
        for dep in component.depends_on.iter().rev() {
            if !seen.contains(dep.as_str()) {
                stack.push(dep.as_str());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph_extractor::ComponentKind;
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &[&str])]) -> ComponentMap {
        edges
            .iter()
            .map(|(id, deps)| {
                let component = Component {
                    id: id.to_string(),
                    kind: ComponentKind::Function,
                    file_path: String::new(),
                    relative_path: String::new(),
                    depends_on: deps.iter().map(|d| d.to_string()).collect(),
                    source_code: String::new(),
                    start_line: 1,
                    end_line: 1,
                    has_docstring: false,
                    docstring: String::new(),
                };
                (id.to_string(), component)
            })
            .collect()
    }

    fn ids(components: Vec<&Component>) -> Vec<&str> {
        components.into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn entry_points_need_outgoing_edges_no_dependents_and_marker() {
        let map = graph(&[
            ("app.main", &["app.run"]),
            ("app.run", &["app.util"]),
            ("app.util", &[]),
            ("app.Main_Loop", &["external.mod.x"]),
            ("app.orphan", &["app.util"]),
            ("app.lonely_main", &[]),
        ]);

        assert_eq!(find_entry_points(&map), vec!["app.Main_Loop", "app.main"]);
        assert_eq!(find_entry_points_with_marker(&map, "ORPHAN"), vec!["app.orphan"]);
    }

    #[test]
    fn ordering_puts_dependencies_first() {
        let map = graph(&[
            ("m.a", &["m.b", "m.c"]),
            ("m.b", &["m.c", "ext.x"]),
            ("m.c", &[]),
            ("m.d", &[]),
        ]);
        assert_eq!(order_dependency_first(&map), vec!["m.c", "m.b", "m.a", "m.d"]);
    }

    #[test]
    fn ordering_terminates_on_cycles() {
        let map = graph(&[("m.a", &["m.b"]), ("m.b", &["m.c"]), ("m.c", &["m.a"])]);
        assert_eq!(order_dependency_first(&map), vec!["m.c", "m.b", "m.a"]);

        let self_loop = graph(&[("m.f", &["m.f"])]);
        assert_eq!(order_dependency_first(&self_loop), vec!["m.f"]);
    }

    #[test]
    fn closure_is_preorder_and_visits_each_once() {
        let map = graph(&[
            ("m.a", &["m.b", "m.c"]),
            ("m.b", &["m.d", "m.a"]),
            ("m.c", &["m.d", "ext.y"]),
            ("m.d", &["m.b"]),
        ]);
        assert_eq!(ids(expand_closure(&map, "m.a")), vec!["m.a", "m.b", "m.d", "m.c"]);
        assert_eq!(ids(expand_closure(&map, "m.c")), vec!["m.c", "m.d", "m.b", "m.a"]);
        assert!(expand_closure(&map, "m.missing").is_empty());
    }
}
