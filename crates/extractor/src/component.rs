use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of a code component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Class,
    Function,
    Method,
    Assignment,
}

impl ComponentKind {
    pub const ALL: [Self; 4] = [Self::Class, Self::Function, Self::Method, Self::Assignment];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::Assignment => "assignment",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, analyzable unit of a project.
///
/// This is the persisted form: it carries no syntax tree and serializes to
/// one record of the graph file. Field order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// `<module_path>.<qualified_name>`, unique within a project
    pub id: String,

    #[serde(rename = "component_type")]
    pub kind: ComponentKind,

    pub file_path: String,

    pub relative_path: String,

    /// Component ids (or module-prefixed names) this unit references
    #[serde(default)]
    pub depends_on: BTreeSet<String>,

    /// Verbatim source; classes only carry a `class Name` stub
    #[serde(default)]
    pub source_code: String,

    /// 1-based
    #[serde(default)]
    pub start_line: usize,

    #[serde(default)]
    pub end_line: usize,

    #[serde(default)]
    pub has_docstring: bool,

    #[serde(default)]
    pub docstring: String,
}

impl Component {
    /// Unqualified name (last dotted segment of the id)
    pub fn name(&self) -> &str {
        self.id.rsplit('.').next().unwrap_or(&self.id)
    }

    /// Id of the enclosing class for methods
    pub fn owner_id(&self) -> Option<&str> {
        match self.kind {
            ComponentKind::Method => self.id.rsplit_once('.').map(|(owner, _)| owner),
            _ => None,
        }
    }

    pub fn line_count(&self) -> usize {
        if self.end_line >= self.start_line && self.start_line > 0 {
            self.end_line - self.start_line + 1
        } else {
            0
        }
    }
}
