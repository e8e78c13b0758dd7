use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of the source files the scanner collects.
pub const SOURCE_EXTENSION: &str = "py";

/// Directory walking options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names that are never descended into (matched against the
    /// final path component, e.g. `.venv` or `build`).
    pub exclude_dirs: Vec<String>,

    /// Skip files matched by `.gitignore` / `.ignore` rules.
    pub respect_gitignore: bool,
}

/// Collects source files under a project root in a stable order.
///
/// Directory entries are sorted by file name at every level, so two scans of
/// the same tree yield the same sequence on every platform.
pub struct FileScanner {
    root: PathBuf,
    config: ScanConfig,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_config(root, ScanConfig::default())
    }

    pub fn with_config(root: impl AsRef<Path>, config: ScanConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the root for source files.
    ///
    /// Unreadable entries below the root are logged and skipped; only a
    /// failure to read the root itself is an error.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                self.root.display()
            )));
        }

        let files = if self.config.respect_gitignore {
            self.scan_gitignore_aware()?
        } else {
            self.scan_all()?
        };

        log::debug!(
            "Scanned {} source files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    fn scan_all(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !self.is_excluded_dir(entry.file_name())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };

            if entry.file_type().is_file() && is_source_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn scan_gitignore_aware(&self) -> Result<Vec<PathBuf>> {
        let exclude_dirs = self.config.exclude_dirs.clone();
        let walker = ignore::WalkBuilder::new(&self.root)
            .hidden(false)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                entry.depth() == 0
                    || !is_dir
                    || !exclude_dirs
                        .iter()
                        .any(|name| OsStr::new(name) == entry.file_name())
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == Some(0) => return Err(err.into()),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };

            let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
            if is_file && is_source_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn is_excluded_dir(&self, name: &OsStr) -> bool {
        self.config
            .exclude_dirs
            .iter()
            .any(|excluded| OsStr::new(excluded) == name)
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(SOURCE_EXTENSION))
}
