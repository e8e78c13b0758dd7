//! # depgraph indexer
//!
//! Enumerates the source files of a project and maps each one to its dotted
//! module path.
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (sorted, optionally .gitignore aware)
//!     │      └─> *.py files
//!     │
//!     └──> Module Index
//!            └─> {relative path, module path} per file + module set
//! ```
//!
//! The module set is computed once per build and is read-only afterwards:
//! import resolution uses it to decide whether a dotted prefix names a module
//! of this project.

mod error;
mod module_index;
mod scanner;

pub use error::{IndexerError, Result};
pub use module_index::{module_path_for, ModuleIndex, SourceEntry};
pub use scanner::{FileScanner, ScanConfig, SOURCE_EXTENSION};
