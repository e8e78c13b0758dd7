use crate::builder::ComponentMap;
use crate::error::{GraphError, Result};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// Node weight of a [`ComponentGraph`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    pub id: String,
    /// All dependencies, module-prefixed ones included
    pub dependency_count: usize,
}

/// Directed graph over component ids.
///
/// Only edges between components are materialized; module-prefixed
/// dependencies count towards `dependency_count` but have no node.
#[derive(Debug, Clone, Default)]
pub struct ComponentGraph {
    graph: DiGraph<ComponentNode, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl ComponentGraph {
    pub fn from_components(components: &ComponentMap) -> Self {
        let mut graph = DiGraph::with_capacity(components.len(), 0);
        let mut nodes = HashMap::with_capacity(components.len());

        for component in components.values() {
            let idx = graph.add_node(ComponentNode {
                id: component.id.clone(),
                dependency_count: component.depends_on.len(),
            });
            nodes.insert(component.id.clone(), idx);
        }
        for component in components.values() {
            let from = nodes[&component.id];
            for dep in &component.depends_on {
                if let Some(&to) = nodes.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        log::debug!(
            "Component graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Self { graph, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.nodes.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&ComponentNode> {
        self.graph.node_weight(idx)
    }

    /// Components `id` depends on
    pub fn dependencies(&self, id: &str) -> Result<Vec<&str>> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Components depending on `id`
    pub fn dependents(&self, id: &str) -> Result<Vec<&str>> {
        self.neighbors(id, Direction::Incoming)
    }

    pub fn in_degree(&self, id: &str) -> Result<usize> {
        Ok(self.dependents(id)?.len())
    }

    pub fn out_degree(&self, id: &str) -> Result<usize> {
        Ok(self.dependencies(id)?.len())
    }

    /// Same selection as [`crate::find_entry_points_with_marker`]
    pub fn entry_points(&self, marker: &str) -> Vec<&str> {
        let marker = marker.to_lowercase();
        let mut found: Vec<&str> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .filter_map(|idx| self.graph.node_weight(idx))
            .filter(|node| node.dependency_count > 0 && node.id.to_lowercase().contains(&marker))
            .map(|node| node.id.as_str())
            .collect();
        found.sort_unstable();
        found
    }

    /// Groups of mutually dependent components: strongly connected
    /// components with more than one member, plus self-referencing ones.
    /// Ids are sorted within and across groups.
    pub fn cycles(&self) -> Vec<Vec<&str>> {
        let mut groups: Vec<Vec<&str>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&idx| self.graph.contains_edge(idx, idx))
            })
            .map(|scc| {
                let mut ids: Vec<&str> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx))
                    .map(|node| node.id.as_str())
                    .collect();
                ids.sort_unstable();
                ids
            })
            .collect();
        groups.sort();
        groups
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Result<Vec<&str>> {
        let idx = self
            .find_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let mut ids: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n))
            .map(|node| node.id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
