use crate::component::{Component, ComponentKind};
use crate::docstring::docstring_of;
use crate::source::SourceFile;
use std::collections::BTreeSet;
use tree_sitter::Node;

/// A component together with the syntax subtree it was extracted from.
///
/// Only valid while its [`SourceFile`] is alive; resolution runs during the
/// same file pass, after which only `component` survives.
#[derive(Debug, Clone)]
pub struct ExtractedComponent<'tree> {
    pub component: Component,
    /// Subtree analysed for references. For decorated definitions this is the
    /// `decorated_definition`, so decorators count as references.
    pub node: Node<'tree>,
}

impl ExtractedComponent<'_> {
    pub fn kind(&self) -> ComponentKind {
        self.component.kind
    }

    pub fn into_component(self) -> Component {
        self.component
    }
}

/// Extract the components of one parsed file, in source order.
///
/// Classes are extracted wherever they are defined (inside `try`, `if` or a
/// function body too) with their directly defined methods. Functions and
/// plain assignments are extracted only at module top level; anything else
/// stays part of its enclosing component.
pub fn extract_components(file: &SourceFile) -> Vec<ExtractedComponent<'_>> {
    let mut out = Vec::new();
    let root = file.root();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let scope = definition_scope(node);
        let top_level = scope.parent() == Some(root);
        match node.kind() {
            "class_definition" => extract_class(file, node, scope, &mut out),
            "function_definition" if top_level => out.push(function_component(
                file,
                node,
                scope,
                file.module_path.clone(),
                ComponentKind::Function,
            )),
            "expression_statement" if top_level => extract_assignments(file, node, &mut out),
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    log::debug!(
        "Extracted {} components from {}",
        out.len(),
        file.relative_path
    );
    out
}

/// The `decorated_definition` wrapping `definition`, or `definition` itself
fn definition_scope(definition: Node<'_>) -> Node<'_> {
    definition
        .parent()
        .filter(|parent| parent.kind() == "decorated_definition")
        .unwrap_or(definition)
}

fn extract_class<'t>(
    file: &'t SourceFile,
    class: Node<'t>,
    scope: Node<'t>,
    out: &mut Vec<ExtractedComponent<'t>>,
) {
    let Some(name) = field_text(file, class, "name") else {
        return;
    };
    let class_id = format!("{}.{name}", file.module_path);
    let body = class.child_by_field_name("body");
    let docstring = body.and_then(|b| docstring_of(b, file.text()));

    out.push(ExtractedComponent {
        component: new_component(
            file,
            class_id.clone(),
            ComponentKind::Class,
            format!("class {name}"),
            class,
            docstring,
        ),
        node: scope,
    });

    let Some(body) = body else {
        return;
    };
    let mut cursor = body.walk();
    for item in body.named_children(&mut cursor) {
        let (definition, method_scope) = match item.kind() {
            "function_definition" => (item, item),
            "decorated_definition" => match item.child_by_field_name("definition") {
                Some(def) if def.kind() == "function_definition" => (def, item),
                _ => continue,
            },
            _ => continue,
        };
        out.push(function_component(
            file,
            definition,
            method_scope,
            class_id.clone(),
            ComponentKind::Method,
        ));
    }
}

fn function_component<'t>(
    file: &'t SourceFile,
    function: Node<'t>,
    scope: Node<'t>,
    owner: String,
    kind: ComponentKind,
) -> ExtractedComponent<'t> {
    let name = field_text(file, function, "name").unwrap_or("<anonymous>");
    let docstring = function
        .child_by_field_name("body")
        .and_then(|body| docstring_of(body, file.text()));

    ExtractedComponent {
        component: new_component(
            file,
            format!("{owner}.{name}"),
            kind,
            file.node_text(function).to_string(),
            function,
            docstring,
        ),
        node: scope,
    }
}

fn extract_assignments<'t>(
    file: &'t SourceFile,
    statement: Node<'t>,
    out: &mut Vec<ExtractedComponent<'t>>,
) {
    let mut cursor = statement.walk();
    for expr in statement.named_children(&mut cursor) {
        if expr.kind() != "assignment" {
            continue;
        }
        for target in assignment_targets(file, expr) {
            out.push(ExtractedComponent {
                component: new_component(
                    file,
                    format!("{}.{target}", file.module_path),
                    ComponentKind::Assignment,
                    file.node_text(statement).to_string(),
                    statement,
                    None,
                ),
                node: statement,
            });
        }
    }
}

/// Simple name targets of a plain (non-annotated) assignment, chained
/// assignments included: `a = b = 1` binds `a` and `b`.
pub fn assignment_targets<'t>(file: &'t SourceFile, assignment: Node<'t>) -> Vec<&'t str> {
    let mut targets = Vec::new();
    let mut current = Some(assignment);

    while let Some(node) = current.filter(|n| n.kind() == "assignment") {
        if node.child_by_field_name("type").is_some() {
            break;
        }
        if let Some(left) = node.child_by_field_name("left") {
            if left.kind() == "identifier" {
                targets.push(file.node_text(left));
            }
        }
        current = node.child_by_field_name("right");
    }

    targets
}

fn new_component(
    file: &SourceFile,
    id: String,
    kind: ComponentKind,
    source_code: String,
    span: Node<'_>,
    docstring: Option<String>,
) -> Component {
    Component {
        id,
        kind,
        file_path: file.file_path.clone(),
        relative_path: file.relative_path.clone(),
        depends_on: BTreeSet::new(),
        source_code,
        start_line: span.start_position().row + 1,
        end_line: span.end_position().row + 1,
        has_docstring: docstring.is_some(),
        docstring: docstring.unwrap_or_default(),
    }
}

fn field_text<'t>(file: &'t SourceFile, node: Node<'t>, field: &str) -> Option<&'t str> {
    node.child_by_field_name(field).map(|n| file.node_text(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(code: &str) -> SourceFile {
        SourceFile::parse(code, "/repo/pkg/mod.py", "pkg/mod.py", "pkg.mod").unwrap()
    }

    fn summary(file: &SourceFile) -> Vec<(String, ComponentKind)> {
        extract_components(file)
            .into_iter()
            .map(|c| (c.component.id, c.component.kind))
            .collect()
    }

    #[test]
    fn class_yields_stub_and_direct_methods() {
        let file = parse(
            "class C(Base):\n    \"\"\"A class.\"\"\"\n    def __init__(self):\n        self.x = 1\n\n    async def run(self):\n        def inner():\n            pass\n        return inner\n",
        );

        let components = extract_components(&file);
        let ids: Vec<&str> = components.iter().map(|c| c.component.id.as_str()).collect();
        assert_eq!(ids, vec!["pkg.mod.C", "pkg.mod.C.__init__", "pkg.mod.C.run"]);

        let class = &components[0].component;
        assert_eq!(class.kind, ComponentKind::Class);
        assert_eq!(class.source_code, "class C");
        assert!(class.has_docstring);
        assert_eq!(class.docstring, "A class.");
        assert_eq!((class.start_line, class.end_line), (1, 9));

        let run = &components[2].component;
        assert_eq!(run.kind, ComponentKind::Method);
        assert!(run.source_code.starts_with("async def run(self):"));
        assert_eq!((run.start_line, run.end_line), (6, 9));
    }

    #[test]
    fn only_top_level_functions_and_assignments_are_extracted() {
        let file = parse(
            "import os\n\nLIMIT = 10\na = b = 2\nx, y = 1, 2\ntyped: int = 3\n\ndef outer():\n    nested = 1\n    def inner():\n        pass\n\nif __name__ == '__main__':\n    def hidden():\n        pass\n",
        );

        assert_eq!(
            summary(&file),
            vec![
                ("pkg.mod.LIMIT".to_string(), ComponentKind::Assignment),
                ("pkg.mod.a".to_string(), ComponentKind::Assignment),
                ("pkg.mod.b".to_string(), ComponentKind::Assignment),
                ("pkg.mod.outer".to_string(), ComponentKind::Function),
            ]
        );
    }

    #[test]
    fn assignment_source_is_the_whole_statement() {
        let file = parse("CONFIG = {\n    'a': 1,\n}\n");
        let components = extract_components(&file);
        let config = &components[0].component;
        assert_eq!(config.source_code, "CONFIG = {\n    'a': 1,\n}");
        assert_eq!((config.start_line, config.end_line), (1, 3));
        assert!(!config.has_docstring);
    }

    #[test]
    fn decorated_definitions_keep_decorators_in_scope_only() {
        let file = parse("@register\ndef handler():\n    'Handle.'\n    return 1\n");
        let components = extract_components(&file);
        let handler = &components[0];

        assert_eq!(handler.component.id, "pkg.mod.handler");
        assert!(handler.component.source_code.starts_with("def handler"));
        assert_eq!(handler.component.start_line, 2);
        assert_eq!(handler.node.kind(), "decorated_definition");
        assert_eq!(handler.component.docstring, "Handle.");
    }

    #[test]
    fn classes_are_extracted_at_any_depth() {
        let file = parse(
            "try:\n    import fast\nexcept ImportError:\n    class Fallback:\n        def run(self):\n            pass\n\ndef factory():\n    @dataclass\n    class Local:\n        def get(self):\n            def helper():\n                pass\n\nclass Outer:\n    class Inner:\n        pass\n",
        );

        assert_eq!(
            summary(&file),
            vec![
                ("pkg.mod.Fallback".to_string(), ComponentKind::Class),
                ("pkg.mod.Fallback.run".to_string(), ComponentKind::Method),
                ("pkg.mod.factory".to_string(), ComponentKind::Function),
                ("pkg.mod.Local".to_string(), ComponentKind::Class),
                ("pkg.mod.Local.get".to_string(), ComponentKind::Method),
                ("pkg.mod.Outer".to_string(), ComponentKind::Class),
                ("pkg.mod.Inner".to_string(), ComponentKind::Class),
            ]
        );

        let components = extract_components(&file);
        let local = &components[3];
        assert_eq!(local.node.kind(), "decorated_definition");
        assert_eq!(local.component.source_code, "class Local");
        assert_eq!(local.component.start_line, 10);
    }

    #[test]
    fn docstring_requires_leading_string_statement() {
        let file = parse(
            "def a():\n    # comment first\n    \"\"\"Doc.\"\"\"\n\ndef b():\n    x = 1\n    \"\"\"Not doc.\"\"\"\n\ndef c():\n    f\"{x}\"\n",
        );
        let components = extract_components(&file);
        let docs: Vec<(bool, &str)> = components
            .iter()
            .map(|c| (c.component.has_docstring, c.component.docstring.as_str()))
            .collect();
        assert_eq!(docs, vec![(true, "Doc."), (false, ""), (false, "")]);
    }
}
