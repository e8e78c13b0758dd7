mod output;

use anyhow::{bail, Context, Result};
use depgraph_graph::{
    expand_closure, find_entry_points_with_marker, load, order_dependency_first, save,
    ComponentGraph, ComponentMap, GraphBuilder, GraphConfig,
};
use output::{ClosureEntry, StatsOutput};
use std::path::Path;

/// `--config` when given, otherwise `depgraph.toml` under `project_root`
fn load_config(explicit: Option<&Path>, project_root: Option<&Path>) -> Result<GraphConfig> {
    match (explicit, project_root) {
        (Some(path), _) => GraphConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        (None, Some(root)) => GraphConfig::load_from_project(root)
            .with_context(|| format!("Failed to load config from {}", root.display())),
        (None, None) => Ok(GraphConfig::default()),
    }
}

fn load_graph(path: &Path) -> Result<ComponentMap> {
    load(path).with_context(|| format!("Failed to load graph {}", path.display()))
}

pub fn build(repo: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config, Some(repo))?;
    let (components, report) = GraphBuilder::new(config)
        .build_with_report(repo)
        .with_context(|| format!("Failed to build graph for {}", repo.display()))?;

    save(&components, output)
        .with_context(|| format!("Failed to save graph to {}", output.display()))?;

    println!("Components: {}", report.components);
    println!(
        "Files: {} parsed, {} skipped",
        report.files_parsed,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.relative_path, skipped.reason);
    }
    println!(
        "Edges: {} ({} class-method, {} guessed)",
        report.edges,
        report.class_method_edges,
        report.guessed_edges()
    );
    println!("Saved graph to {}", output.display());
    Ok(())
}

pub fn entrypoints(graph: &Path, marker: Option<&str>, config: Option<&Path>) -> Result<()> {
    let components = load_graph(graph)?;
    let marker = match marker {
        Some(marker) => marker.to_string(),
        None => load_config(config, None)?.entry_marker,
    };

    for id in find_entry_points_with_marker(&components, &marker) {
        println!("{id}");
    }
    Ok(())
}

pub fn closure(graph: &Path, id: &str, json: bool) -> Result<()> {
    let components = load_graph(graph)?;
    if !components.contains_key(id) {
        bail!("Component not found: {id}");
    }

    let closure = expand_closure(&components, id);
    if json {
        println!("{}", serde_json::to_string_pretty(&closure)?);
        return Ok(());
    }
    for component in closure {
        println!("{}", ClosureEntry::from(component));
    }
    Ok(())
}

pub fn order(graph: &Path) -> Result<()> {
    let components = load_graph(graph)?;
    for id in order_dependency_first(&components) {
        println!("{id}");
    }
    Ok(())
}

pub fn stats(graph: &Path, json: bool, config: Option<&Path>) -> Result<()> {
    let components = load_graph(graph)?;
    let config = load_config(config, None)?;
    let view = ComponentGraph::from_components(&components);
    let stats = StatsOutput::collect(&components, &view, &config.entry_marker);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{stats}");
    }
    Ok(())
}
