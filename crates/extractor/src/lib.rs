//! # depgraph extractor
//!
//! Turns one parsed Python file into its components.
//!
//! ```text
//! SourceEntry (from the module index)
//!     │
//!     ├──> SourceFile (read, decode, tree-sitter parse)
//!     │      └─ syntax errors reject the whole file
//!     │
//!     └──> Component Extractor
//!            ├─ class       -> `class Name` stub + one method per direct def
//!            ├─ function    -> top-level def / async def
//!            └─ assignment  -> one per simple name target
//! ```
//!
//! [`ExtractedComponent`] borrows the file's syntax tree and is used only
//! while that file is being analysed. [`Component`] is the owned, persisted
//! record that survives the pass.

mod component;
mod docstring;
mod error;
mod extractor;
mod language;
mod source;

pub use component::{Component, ComponentKind};
pub use docstring::{docstring_of, string_literal_value};
pub use error::{ExtractError, Result};
pub use extractor::{assignment_targets, extract_components, ExtractedComponent};
pub use language::Language;
pub use source::SourceFile;
