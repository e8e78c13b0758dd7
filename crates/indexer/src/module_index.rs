use crate::error::{IndexerError, Result};
use crate::scanner::{FileScanner, ScanConfig, SOURCE_EXTENSION};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// A source file discovered under the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the project root, using the platform separator
    pub relative_path: String,
    /// Dotted module path, e.g. `pkg/sub/mod.py` -> `pkg.sub.mod`
    pub module_path: String,
}

/// The set of module paths of a project, computed once per build.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    root: PathBuf,
    entries: Vec<SourceEntry>,
    modules: BTreeSet<String>,
}

impl ModuleIndex {
    pub fn build(root: impl AsRef<Path>) -> Result<Self> {
        Self::build_with_config(root, &ScanConfig::default())
    }

    pub fn build_with_config(root: impl AsRef<Path>, config: &ScanConfig) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| {
            IndexerError::InvalidPath(format!("{}: {e}", root.display()))
        })?;

        let files = FileScanner::with_config(&root, config.clone()).scan()?;

        let mut entries = Vec::with_capacity(files.len());
        let mut modules = BTreeSet::new();
        for path in files {
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };
            let module_path = module_path_for(relative);
            let relative_path = relative.to_string_lossy().into_owned();
            modules.insert(module_path.clone());
            entries.push(SourceEntry {
                path,
                relative_path,
                module_path,
            });
        }

        log::info!(
            "Indexed {} modules under {}",
            modules.len(),
            root.display()
        );

        Ok(Self {
            root,
            entries,
            modules,
        })
    }

    /// Build an index from module paths alone (no files on disk).
    pub fn from_modules<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: PathBuf::new(),
            entries: Vec::new(),
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files in scan order
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn modules(&self) -> &BTreeSet<String> {
        &self.modules
    }

    pub fn contains(&self, module_path: &str) -> bool {
        self.modules.contains(module_path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Convert a root-relative file path into a dotted module path.
///
/// Separators become dots and the source extension is dropped; package
/// initializers keep their name (`pkg/__init__.py` -> `pkg.__init__`).
pub fn module_path_for(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let joined = parts.join(".");
    let suffix = format!(".{SOURCE_EXTENSION}");
    match joined.strip_suffix(&suffix) {
        Some(stripped) => stripped.to_string(),
        None => joined,
    }
}
