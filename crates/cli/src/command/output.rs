use depgraph_graph::{
    find_entry_points_with_marker, Component, ComponentGraph, ComponentKind, ComponentMap,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One line of `depgraph closure`
pub struct ClosureEntry<'a>(&'a Component);

impl<'a> From<&'a Component> for ClosureEntry<'a> {
    fn from(component: &'a Component) -> Self {
        Self(component)
    }
}

impl fmt::Display for ClosureEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        write!(
            f,
            "{} ({}) {}:{}-{}",
            c.id, c.kind, c.relative_path, c.start_line, c.end_line
        )
    }
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub components: usize,
    pub by_kind: BTreeMap<ComponentKind, usize>,
    pub edges: usize,
    /// Edges whose target is a component
    pub component_edges: usize,
    pub documented: usize,
    pub entry_points: Vec<String>,
    pub cycles: Vec<Vec<String>>,
}

impl StatsOutput {
    pub fn collect(components: &ComponentMap, view: &ComponentGraph, marker: &str) -> Self {
        let mut by_kind: BTreeMap<ComponentKind, usize> =
            ComponentKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for component in components.values() {
            *by_kind.entry(component.kind).or_default() += 1;
        }

        Self {
            components: components.len(),
            by_kind,
            edges: components.values().map(|c| c.depends_on.len()).sum(),
            component_edges: view.edge_count(),
            documented: components.values().filter(|c| c.has_docstring).count(),
            entry_points: find_entry_points_with_marker(components, marker),
            cycles: view
                .cycles()
                .into_iter()
                .map(|group| group.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }
}

impl fmt::Display for StatsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Components: {}", self.components)?;
        for (kind, count) in &self.by_kind {
            writeln!(f, "  {kind}: {count}")?;
        }
        writeln!(
            f,
            "Edges: {} ({} to components)",
            self.edges, self.component_edges
        )?;
        writeln!(f, "Documented: {}", self.documented)?;
        writeln!(f, "Entry points: {}", self.entry_points.len())?;
        for id in &self.entry_points {
            writeln!(f, "  {id}")?;
        }
        writeln!(f, "Cycles: {}", self.cycles.len())?;
        for group in &self.cycles {
            writeln!(f, "  {}", group.join(" <-> "))?;
        }
        Ok(())
    }
}
