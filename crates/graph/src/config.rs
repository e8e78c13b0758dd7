use crate::error::{GraphError, Result};
use crate::imports::STANDARD_MODULES;
use depgraph_extractor::Language;
use depgraph_indexer::ScanConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File looked up at the project root when no config path is given
pub const CONFIG_FILE_NAME: &str = "depgraph.toml";

/// Default entry-point naming marker
pub const DEFAULT_ENTRY_MARKER: &str = "main";

/// Build and query settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Entry points must contain this marker (case-insensitive)
    #[serde(default = "default_entry_marker")]
    pub entry_marker: String,

    /// Receiver names never resolved as references
    #[serde(default = "default_receiver_names")]
    pub receiver_names: Vec<String>,

    /// Extra standard-library modules, on top of the built-in list
    #[serde(default)]
    pub standard_modules: Vec<String>,

    #[serde(default)]
    pub scan: ScanConfig,
}

fn default_entry_marker() -> String {
    DEFAULT_ENTRY_MARKER.to_string()
}

fn default_receiver_names() -> Vec<String> {
    Language::Python
        .receiver_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            entry_marker: default_entry_marker(),
            receiver_names: default_receiver_names(),
            standard_modules: Vec::new(),
            scan: ScanConfig::default(),
        }
    }
}

impl GraphConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| GraphError::Config {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load `depgraph.toml` from the project root, or defaults when absent
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Whether `module` names a standard-library package
    pub fn is_standard_module(&self, module: &str) -> bool {
        STANDARD_MODULES.contains(&module) || self.standard_modules.iter().any(|m| m == module)
    }

    pub fn is_receiver(&self, name: &str) -> bool {
        self.receiver_names.iter().any(|r| r == name)
    }
}
