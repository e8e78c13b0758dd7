//! # depgraph graph
//!
//! Static dependency graph of a Python project: which classes, functions,
//! methods and module-level assignments reference which others.
//!
//! ## Architecture
//!
//! ```text
//! Project root
//!     │
//!     ├──> Module Index (every *.py file -> dotted module path)
//!     │
//!     ├──> per file, while its syntax tree is alive
//!     │      ├─ Component Extractor (classes, methods, functions, assignments)
//!     │      ├─ Import Bindings (direct, from, relative, implicit package)
//!     │      └─ Reference Resolver (names + attribute chains -> candidates)
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Keep candidates naming a component or a module prefix
//!     │      └─ Link classes to their methods (constructor excepted)
//!     │
//!     └──> Component map (id -> Component)
//!            ├─ save / load (JSON, atomic write)
//!            ├─ entry points, dependency-first order, closure
//!            └─ ComponentGraph (petgraph view: degrees, cycles)
//! ```
//!
//! The graph is not guaranteed to be acyclic; every traversal owns its own
//! visited set and terminates on cycles.

mod algo;
mod builder;
mod builtins;
mod config;
mod error;
mod graph;
mod imports;
mod resolver;
mod store;

pub use algo::{
    expand_closure, find_entry_points, find_entry_points_with_marker, order_dependency_first,
};
pub use builder::{
    add_class_method_edges, build, BuildReport, ComponentMap, FilterCounts, GraphBuilder,
    SkippedFile,
};
pub use builtins::{is_builtin, BUILTIN_NAMES};
pub use config::{GraphConfig, CONFIG_FILE_NAME, DEFAULT_ENTRY_MARKER};
pub use error::{GraphError, Result};
pub use graph::{ComponentGraph, ComponentNode};
pub use imports::{resolve_absolute, resolve_relative, FromImport, ImportBindings, STANDARD_MODULES, WILDCARD};
pub use resolver::{Candidates, ReferenceResolver, Resolution};
pub use store::{load, save};

pub use depgraph_extractor::{Component, ComponentKind};
