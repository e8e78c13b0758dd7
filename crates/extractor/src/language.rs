use crate::error::{ExtractError, Result};
use std::path::Path;

/// Source language of a scanned file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" => Self::Python,
            _ => Self::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Unknown => "unknown",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Self::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            Self::Unknown => Err(ExtractError::unsupported_language(self.as_str())),
        }
    }

    /// Names bound to the receiver of a method (`self`, `cls`)
    pub fn receiver_names(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["self", "cls"],
            Self::Unknown => &[],
        }
    }
}
