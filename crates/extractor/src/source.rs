use crate::error::{ExtractError, Result};
use crate::language::Language;
use depgraph_indexer::SourceEntry;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// A parsed source file.
///
/// Owns the text and its syntax tree for the duration of one file's pass;
/// nothing derived from the tree may outlive it.
pub struct SourceFile {
    pub file_path: String,
    pub relative_path: String,
    pub module_path: String,
    pub language: Language,
    text: String,
    tree: Tree,
}

impl SourceFile {
    /// Read and parse a scanned file.
    ///
    /// Fails on unreadable files, undecodable bytes and syntax errors.
    pub fn read(entry: &SourceEntry) -> Result<Self> {
        let bytes = std::fs::read(&entry.path)?;
        let file_path = entry.path.to_string_lossy().into_owned();
        let text = String::from_utf8(bytes).map_err(|source| ExtractError::Decode {
            path: file_path.clone(),
            source,
        })?;

        Self::parse(
            text,
            file_path,
            entry.relative_path.clone(),
            entry.module_path.clone(),
        )
    }

    /// Parse in-memory text as a file of the given module.
    pub fn parse(
        text: impl Into<String>,
        file_path: impl Into<String>,
        relative_path: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Result<Self> {
        let text = text.into();
        let file_path = file_path.into();
        let language = Language::from_path(Path::new(&file_path));
        let ts_lang = language.tree_sitter_language()?;

        let mut parser = Parser::new();
        parser
            .set_language(&ts_lang)
            .map_err(|e| ExtractError::parser(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| ExtractError::parser(format!("Failed to parse {file_path}")))?;

        if tree.root_node().has_error() {
            let (line, column) = first_error_position(tree.root_node()).unwrap_or((1, 1));
            return Err(ExtractError::Syntax {
                path: file_path,
                line,
                column,
            });
        }

        Ok(Self {
            file_path,
            relative_path: relative_path.into(),
            module_path: module_path.into(),
            language,
            text,
            tree,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Verbatim text of a node of this file
    pub fn node_text(&self, node: Node<'_>) -> &str {
        &self.text[node.start_byte()..node.end_byte()]
    }
}

/// 1-based (line, column) of the first error or missing node
fn first_error_position(node: Node<'_>) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return Some((pos.row + 1, pos.column + 1));
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_position(child) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_python() {
        let file = SourceFile::parse("def f():\n    return 1\n", "m.py", "m.py", "m").unwrap();
        assert_eq!(file.root().kind(), "module");
        assert_eq!(file.module_path, "m");
    }

    #[test]
    fn parse_reports_syntax_errors_with_position() {
        let err = SourceFile::parse("x = 1\ndef broken(:\n", "m.py", "m.py", "m")
            .err()
            .expect("syntax error");
        match err {
            ExtractError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_rejects_non_python_paths() {
        let err = SourceFile::parse("fn main() {}", "main.rs", "main.rs", "main")
            .err()
            .expect("unsupported");
        assert!(matches!(err, ExtractError::UnsupportedLanguage(_)));
    }
}
