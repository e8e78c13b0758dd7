use crate::config::GraphConfig;
use crate::error::Result;
use crate::imports::ImportBindings;
use crate::resolver::{Candidates, ReferenceResolver, Resolution};
use depgraph_extractor::{extract_components, Component, ComponentKind, SourceFile};
use depgraph_indexer::{ModuleIndex, SourceEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Component id -> component. Ordered, so every traversal is deterministic.
pub type ComponentMap = BTreeMap<String, Component>;

/// A file left out of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: String,
}

/// Candidates kept and dropped by the edge filter for one resolution rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub kept: usize,
    pub dropped: usize,
}

/// Outcome of one build
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub files_scanned: usize,
    pub files_parsed: usize,
    pub skipped: Vec<SkippedFile>,
    pub components: usize,
    /// Components whose id was defined again later and replaced
    pub redefined: usize,
    pub edges: usize,
    pub class_method_edges: usize,
    pub resolutions: BTreeMap<Resolution, FilterCounts>,
}

impl BuildReport {
    /// Kept candidates that came from the same-module guess
    pub fn guessed_edges(&self) -> usize {
        self.resolutions
            .iter()
            .filter(|(resolution, _)| resolution.is_guess())
            .map(|(_, counts)| counts.kept)
            .sum()
    }
}

/// Builds the dependency graph of a project.
///
/// Pass one indexes every module path; pass two extracts and resolves each
/// file while its syntax tree is alive. Edges are filtered once all
/// components are known.
pub struct GraphBuilder {
    config: GraphConfig,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Build the component map of the project at `root`
    pub fn build(&self, root: impl AsRef<Path>) -> Result<ComponentMap> {
        self.build_with_report(root).map(|(components, _)| components)
    }

    /// Build the component map and report what was skipped and filtered.
    ///
    /// Fails only when the root cannot be walked; unreadable or unparsable
    /// files are logged and skipped.
    pub fn build_with_report(&self, root: impl AsRef<Path>) -> Result<(ComponentMap, BuildReport)> {
        let index = ModuleIndex::build_with_config(root, &self.config.scan)?;
        let mut report = BuildReport {
            files_scanned: index.entries().len(),
            ..BuildReport::default()
        };

        let mut resolved: BTreeMap<String, (Component, Candidates)> = BTreeMap::new();
        for entry in index.entries() {
            let extracted = match self.analyse_file(entry, &index) {
                Ok(extracted) => extracted,
                Err(e) => {
                    log::warn!("Skipping {}: {e}", entry.relative_path);
                    report.skipped.push(SkippedFile {
                        relative_path: entry.relative_path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            report.files_parsed += 1;

            for (component, candidates) in extracted {
                if let Some((previous, _)) =
                    resolved.insert(component.id.clone(), (component, candidates))
                {
                    log::debug!(
                        "{} redefined; keeping the later definition ({} replaced)",
                        previous.id,
                        previous.relative_path
                    );
                    report.redefined += 1;
                }
            }
        }

        let known: Vec<String> = resolved.keys().cloned().collect();
        let mut components = ComponentMap::new();
        for (id, (mut component, candidates)) in resolved {
            for (target, resolution) in candidates {
                let counts = report.resolutions.entry(resolution).or_default();
                if is_valid_target(&target, &known, &index) {
                    component.depends_on.insert(target);
                    counts.kept += 1;
                } else {
                    counts.dropped += 1;
                }
            }
            components.insert(id, component);
        }

        report.class_method_edges = add_class_method_edges(&mut components);
        report.components = components.len();
        report.edges = components.values().map(|c| c.depends_on.len()).sum();

        log::info!(
            "Built dependency graph: {} components, {} edges ({} of {} files skipped)",
            report.components,
            report.edges,
            report.skipped.len(),
            report.files_scanned
        );

        Ok((components, report))
    }

    fn analyse_file(
        &self,
        entry: &SourceEntry,
        index: &ModuleIndex,
    ) -> depgraph_extractor::Result<Vec<(Component, Candidates)>> {
        let file = SourceFile::read(entry)?;
        let bindings = ImportBindings::collect(&file, index);
        let resolver = ReferenceResolver::new(&file, &bindings, index, &self.config);

        Ok(extract_components(&file)
            .into_iter()
            .map(|extracted| {
                let candidates = resolver.resolve(extracted.node);
                (extracted.into_component(), candidates)
            })
            .collect())
    }
}

/// Build the graph of the project at `root` with default settings
pub fn build(root: impl AsRef<Path>) -> Result<ComponentMap> {
    GraphBuilder::default().build(root)
}

/// An edge survives when it names a component or starts with a module path
fn is_valid_target(target: &str, known: &[String], index: &ModuleIndex) -> bool {
    if known.binary_search_by(|id| id.as_str().cmp(target)).is_ok() {
        return true;
    }
    let head = target.split('.').next().unwrap_or(target);
    index.contains(head)
}

/// Link every class to its methods, constructor excepted. Returns the number
/// of edges added.
pub fn add_class_method_edges(components: &mut ComponentMap) -> usize {
    let links: Vec<(String, String)> = components
        .values()
        .filter(|c| c.kind == ComponentKind::Method && c.name() != CONSTRUCTOR)
        .filter_map(|method| {
            let owner = method.owner_id()?;
            let class = components.get(owner)?;
            (class.kind == ComponentKind::Class).then(|| (owner.to_string(), method.id.clone()))
        })
        .collect();

    let mut added = 0;
    for (class_id, method_id) in links {
        if let Some(class) = components.get_mut(&class_id) {
            if class.depends_on.insert(method_id) {
                added += 1;
            }
        }
    }
    added
}

const CONSTRUCTOR: &str = "__init__";
