use crate::builtins::is_builtin;
use crate::config::GraphConfig;
use crate::imports::ImportBindings;
use depgraph_extractor::SourceFile;
use depgraph_indexer::ModuleIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tree_sitter::Node;

/// How a dependency candidate was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Bare name bound by `from module import name` of a project module
    FromImport,
    /// `alias.attr` where `alias` is a direct import of a project module
    ModuleAlias,
    /// `module.name` where `module` is a from-import key that imports `name`
    ModuleMember,
    /// Unbound bare name assumed to live in the current module
    SameModule,
}

impl Resolution {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FromImport => "from_import",
            Self::ModuleAlias => "module_alias",
            Self::ModuleMember => "module_member",
            Self::SameModule => "same_module",
        }
    }

    /// Guessed rather than backed by an import
    pub const fn is_guess(self) -> bool {
        matches!(self, Self::SameModule)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw dependency names of one component, each with the rule that produced it
pub type Candidates = BTreeMap<String, Resolution>;

/// Turns the references inside a component's subtree into dependency names.
pub struct ReferenceResolver<'a> {
    file: &'a SourceFile,
    bindings: &'a ImportBindings,
    index: &'a ModuleIndex,
    config: &'a GraphConfig,
}

enum Visit<'t> {
    Load(Node<'t>),
    Target(Node<'t>),
    /// Inside a `case` pattern: captures bind, class and value patterns load
    Pattern(Node<'t>),
}

#[derive(Default)]
struct Walk {
    locals: HashSet<String>,
    candidates: Candidates,
}

impl Walk {
    fn add(&mut self, target: String, resolution: Resolution) {
        self.candidates.entry(target).or_insert(resolution);
    }
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        file: &'a SourceFile,
        bindings: &'a ImportBindings,
        index: &'a ModuleIndex,
        config: &'a GraphConfig,
    ) -> Self {
        Self {
            file,
            bindings,
            index,
            config,
        }
    }

    /// Walk `scope` in source order and collect candidate dependencies.
    ///
    /// Parameters of the component's own function are locals from the start.
    /// Names bound by plain assignments become locals as they are encountered
    /// and are ignored from then on. Parameters of nested functions and
    /// lambdas are not tracked.
    pub fn resolve(&self, scope: Node<'_>) -> Candidates {
        let mut walk = Walk::default();
        let own_params = own_function(scope).and_then(|f| f.child_by_field_name("parameters"));
        if let Some(params) = own_params {
            walk.locals
                .extend(parameter_names(params).map(|n| self.file.node_text(n).to_string()));
        }
        let mut stack = vec![Visit::Load(scope)];

        while let Some(visit) = stack.pop() {
            let next = match visit {
                Visit::Load(node) => self.visit_load(node, &mut walk),
                Visit::Target(node) => visit_target(node),
                Visit::Pattern(node) => self.visit_pattern(node, &mut walk),
            };
            stack.extend(next.into_iter().rev());
        }

        walk.candidates
    }

    fn visit_load<'t>(&self, node: Node<'t>, walk: &mut Walk) -> Vec<Visit<'t>> {
        match node.kind() {
            "identifier" => {
                self.add_name(self.file.node_text(node), walk);
                Vec::new()
            }
            "attribute" => {
                self.add_attribute(node, walk);
                loads(node.child_by_field_name("object"))
            }
            "assignment" => {
                if node.child_by_field_name("type").is_none() {
                    if let Some(left) = node.child_by_field_name("left") {
                        if left.kind() == "identifier" {
                            walk.locals.insert(self.file.node_text(left).to_string());
                        }
                    }
                }
                children(node, &["left"])
            }
            "augmented_assignment" | "for_statement" | "for_in_clause" => {
                children(node, &["left"])
            }
            "named_expression" => children(node, &["name"]),
            "keyword_argument" => loads(node.child_by_field_name("value")),
            "function_definition" | "lambda" => ["parameters", "return_type", "body"]
                    .iter()
                    .filter_map(|field| node.child_by_field_name(field))
                    .map(Visit::Load)
                    .collect(),
            "parameters" | "lambda_parameters" => parameter_loads(node),
            "class_definition" => ["superclasses", "body"]
                .iter()
                .filter_map(|field| node.child_by_field_name(field))
                .map(Visit::Load)
                .collect(),
            "string" => named_children(node)
                .into_iter()
                .filter(|part| part.kind() == "interpolation")
                .map(Visit::Load)
                .collect(),
            "interpolation" => loads(node.child_by_field_name("expression")),
            "delete_statement" => named_children(node).into_iter().map(Visit::Target).collect(),
            "import_statement"
            | "import_from_statement"
            | "future_import_statement"
            | "global_statement"
            | "nonlocal_statement"
            | "comment" => Vec::new(),
            "case_pattern" => vec![Visit::Pattern(node)],
            _ => children(node, &[]),
        }
    }

    fn add_name(&self, name: &str, walk: &mut Walk) {
        if is_builtin(name) || self.config.is_receiver(name) || walk.locals.contains(name) {
            return;
        }

        for import in self.bindings.from_imports() {
            if self.is_standard(&import.module) {
                continue;
            }
            if import.binds(name) && self.index.contains(&import.module) {
                walk.add(format!("{}.{name}", import.module), Resolution::FromImport);
                return;
            }
        }

        walk.add(
            format!("{}.{name}", self.bindings.module_path()),
            Resolution::SameModule,
        );
    }

    fn visit_pattern<'t>(&self, node: Node<'t>, walk: &mut Walk) -> Vec<Visit<'t>> {
        match node.kind() {
            // a lone name captures; `a.b` is a value pattern
            "dotted_name" => {
                let parts = self.dotted_parts(node);
                if parts.len() > 1 {
                    self.add_dotted(&parts, walk);
                }
                Vec::new()
            }
            "class_pattern" => {
                let mut children = named_children(node).into_iter().peekable();
                if let Some(class) = children.next_if(|n| n.kind() == "dotted_name") {
                    self.add_dotted(&self.dotted_parts(class), walk);
                }
                children.map(Visit::Pattern).collect()
            }
            "identifier" => Vec::new(),
            _ => named_children(node).into_iter().map(Visit::Pattern).collect(),
        }
    }

    /// A dotted reference outside an expression: the chain plus its root name
    fn add_dotted(&self, parts: &[&str], walk: &mut Walk) {
        let Some(&root) = parts.first() else {
            return;
        };
        if parts.len() > 1 {
            self.add_chain(parts, walk);
        }
        self.add_name(root, walk);
    }

    fn add_attribute(&self, node: Node<'_>, walk: &mut Walk) {
        if let Some(parts) = self.attribute_chain(node) {
            self.add_chain(&parts, walk);
        }
    }

    /// Attribute chain `parts[0].parts[1]...` rooted at a name
    fn add_chain(&self, parts: &[&str], walk: &mut Walk) {
        let root = parts[0];
        if walk.locals.contains(root) || self.config.is_receiver(root) {
            return;
        }

        if let Some((module, rest)) = self.bindings.module_prefix(parts) {
            if self.is_standard(module) {
                return;
            }
            if let Some(member) = parts.get(rest) {
                if self.index.contains(module) {
                    walk.add(format!("{module}.{member}"), Resolution::ModuleAlias);
                }
            }
            return;
        }

        if let Some(import) = self.bindings.from_import(root) {
            if self.is_standard(root) {
                return;
            }
            if let Some(member) = parts.get(1) {
                if import.binds(member) {
                    walk.add(format!("{root}.{member}"), Resolution::ModuleMember);
                }
            }
        }
    }

    /// `a.b.c` -> `["a", "b", "c"]`; `None` unless the chain is rooted at a name
    fn attribute_chain(&self, node: Node<'_>) -> Option<Vec<&'a str>> {
        let mut parts = Vec::new();
        let mut current = node;
        while current.kind() == "attribute" {
            parts.push(self.file.node_text(current.child_by_field_name("attribute")?));
            current = current.child_by_field_name("object")?;
        }
        if current.kind() != "identifier" {
            return None;
        }
        parts.push(self.file.node_text(current));
        parts.reverse();
        Some(parts)
    }

    /// `a.b.c` written as a `dotted_name` -> `["a", "b", "c"]`
    fn dotted_parts(&self, node: Node<'_>) -> Vec<&'a str> {
        named_children(node)
            .into_iter()
            .filter(|part| part.kind() == "identifier")
            .map(|part| self.file.node_text(part))
            .collect()
    }

    fn is_standard(&self, module: &str) -> bool {
        let top = module.split('.').next().unwrap_or(module);
        self.config.is_standard_module(top)
    }
}

fn visit_target(node: Node<'_>) -> Vec<Visit<'_>> {
    match node.kind() {
        "identifier" => Vec::new(),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
        | "list" | "parenthesized_expression" | "as_pattern_target" | "list_splat_pattern"
        | "list_splat" => named_children(node).into_iter().map(Visit::Target).collect(),
        _ => vec![Visit::Load(node)],
    }
}

/// The function a component scope defines, if any
fn own_function(scope: Node<'_>) -> Option<Node<'_>> {
    match scope.kind() {
        "function_definition" => Some(scope),
        "decorated_definition" => scope
            .child_by_field_name("definition")
            .filter(|definition| definition.kind() == "function_definition"),
        _ => None,
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

fn loads(node: Option<Node<'_>>) -> Vec<Visit<'_>> {
    node.into_iter().map(Visit::Load).collect()
}

/// Named children in order; `alias` fields, the listed fields and anything
/// right after an `as` keyword are binding targets, the rest are loads.
fn children<'t>(node: Node<'t>, target_fields: &[&str]) -> Vec<Visit<'t>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return out;
    }

    let mut after_as = false;
    loop {
        let child = cursor.node();
        if child.is_named() {
            let is_target = after_as
                || cursor
                    .field_name()
                    .is_some_and(|field| field == "alias" || target_fields.contains(&field));
            out.push(if is_target {
                Visit::Target(child)
            } else {
                Visit::Load(child)
            });
            after_as = false;
        } else {
            after_as = child.kind() == "as";
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    out
}

/// Identifier nodes bound by a parameter list
fn parameter_names<'t>(params: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    named_children(params).into_iter().filter_map(|param| match param.kind() {
        "identifier" => Some(param),
        "default_parameter" | "typed_default_parameter" => param
            .child_by_field_name("name")
            .filter(|name| name.kind() == "identifier"),
        "typed_parameter" => param.named_child(0).and_then(bound_identifier),
        "list_splat_pattern" | "dictionary_splat_pattern" => bound_identifier(param),
        _ => None,
    })
}

fn bound_identifier(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "identifier" => Some(node),
        "list_splat_pattern" | "dictionary_splat_pattern" => {
            node.named_child(0).filter(|n| n.kind() == "identifier")
        }
        _ => None,
    }
}

/// Annotations and default values of a parameter list
fn parameter_loads(params: Node<'_>) -> Vec<Visit<'_>> {
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                out.extend(
                    ["type", "value"]
                        .iter()
                        .filter_map(|field| param.child_by_field_name(field))
                        .map(Visit::Load),
                );
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph_extractor::extract_components;
    use pretty_assertions::assert_eq;

    const MODULES: &[&str] = &["pkg.a", "pkg.b", "pkg.main", "pkg.util.helpers", "lib"];

    /// Candidates of every component of `code`, parsed as `pkg.main`
    fn resolve_all(code: &str) -> BTreeMap<String, Vec<(String, Resolution)>> {
        let file = SourceFile::parse(code, "/repo/pkg/main.py", "pkg/main.py", "pkg.main").unwrap();
        let index = ModuleIndex::from_modules(MODULES.iter().copied());
        let config = GraphConfig::default();
        let bindings = ImportBindings::collect(&file, &index);
        let resolver = ReferenceResolver::new(&file, &bindings, &index, &config);

        extract_components(&file)
            .into_iter()
            .map(|extracted| {
                let found = resolver.resolve(extracted.node).into_iter().collect();
                (extracted.component.id, found)
            })
            .collect()
    }

    fn deps(code: &str, id: &str) -> Vec<String> {
        resolve_all(code)
            .remove(id)
            .unwrap_or_default()
            .into_iter()
            .map(|(target, _)| target)
            .collect()
    }

    #[test]
    fn from_imported_names_resolve_to_their_module() {
        let found = resolve_all("from pkg.a import helper\n\ndef main():\n    helper()\n");
        assert_eq!(
            found["pkg.main.main"],
            vec![("pkg.a.helper".to_string(), Resolution::FromImport)]
        );
    }

    #[test]
    fn builtins_receivers_and_locals_are_ignored() {
        let code = "def run(self, item, *rest, flag=DEFAULT, **extra):\n    total = len(item)\n    print(total, rest, extra, flag)\n    return cls\n";
        assert_eq!(deps(code, "pkg.main.run"), vec!["pkg.main.DEFAULT"]);
    }

    #[test]
    fn unbound_names_fall_back_to_current_module() {
        let found = resolve_all("def f():\n    return g() + CONST\n");
        assert_eq!(
            found["pkg.main.f"],
            vec![
                ("pkg.main.CONST".to_string(), Resolution::SameModule),
                ("pkg.main.g".to_string(), Resolution::SameModule),
            ]
        );
    }

    #[test]
    fn locals_only_apply_after_their_assignment() {
        let code = "def f():\n    use(value)\n    value = 1\n    return value\n";
        assert_eq!(deps(code, "pkg.main.f"), vec!["pkg.main.use", "pkg.main.value"]);
    }

    #[test]
    fn attribute_chains_through_module_aliases() {
        let code = "import pkg.b as b\nimport pkg.util.helpers\nimport os\n\ndef f():\n    b.Thing.method()\n    pkg.util.helpers.tool()\n    os.path.join('a')\n";
        let found = resolve_all(code);
        let chained: Vec<(String, Resolution)> = found["pkg.main.f"]
            .iter()
            .filter(|(_, r)| *r == Resolution::ModuleAlias)
            .cloned()
            .collect();
        assert_eq!(
            chained,
            vec![
                ("pkg.b.Thing".to_string(), Resolution::ModuleAlias),
                ("pkg.util.helpers.tool".to_string(), Resolution::ModuleAlias),
            ]
        );
        // roots of chains are also bare-name loads
        assert!(found["pkg.main.f"].contains(&("pkg.main.os".to_string(), Resolution::SameModule)));
    }

    #[test]
    fn attribute_on_from_import_module_key() {
        let code = "from lib import Widget\n\ndef f():\n    return lib.Widget()\n";
        let found = resolve_all(code);
        assert!(found["pkg.main.f"].contains(&("lib.Widget".to_string(), Resolution::ModuleMember)));
    }

    #[test]
    fn aliased_from_imports_bind_the_local_name() {
        let code = "from .a import helper as h\n\ndef f():\n    h()\n    helper()\n";
        assert_eq!(deps(code, "pkg.main.f"), vec!["pkg.a.h", "pkg.main.helper"]);
    }

    #[test]
    fn nested_parameters_do_not_hide_outer_names() {
        let code = "CONFIG = 1\n\ndef outer():\n    def inner(CONFIG):\n        return CONFIG\n    apply(lambda CONFIG: CONFIG)\n    return CONFIG\n";
        assert_eq!(
            deps(code, "pkg.main.outer"),
            vec!["pkg.main.CONFIG", "pkg.main.apply"]
        );

        let code = "def helper():\n    pass\n\nclass C:\n    def a(self, helper):\n        return helper\n\n    def b(self):\n        return helper()\n";
        let found = resolve_all(code);
        assert!(found["pkg.main.C"].contains(&("pkg.main.helper".to_string(), Resolution::SameModule)));
        assert!(found["pkg.main.C.a"].is_empty());
        assert_eq!(deps(code, "pkg.main.C.b"), vec!["pkg.main.helper"]);
    }

    #[test]
    fn case_patterns_reference_classes_and_values() {
        let code = "from pkg.a import Point\nimport pkg.b as b\n\ndef f(value):\n    match value:\n        case Point(x=0, y=limit):\n            return 1\n        case b.Shape.CIRCLE:\n            return 2\n        case [first, *rest]:\n            return 3\n";
        assert_eq!(
            deps(code, "pkg.main.f"),
            vec!["pkg.a.Point", "pkg.b.Shape", "pkg.main.b"]
        );
    }

    #[test]
    fn class_scope_covers_bases_decorators_and_methods() {
        let code = "from pkg.a import Base, register\n\n@register\nclass C(Base):\n    def go(self):\n        return self.helper() + other()\n";
        let found = resolve_all(code);
        let class: Vec<&str> = found["pkg.main.C"].iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(class, vec!["pkg.a.Base", "pkg.a.register", "pkg.main.other"]);
        let method: Vec<&str> = found["pkg.main.C.go"].iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(method, vec!["pkg.main.other"]);
    }

    #[test]
    fn binding_positions_are_not_references() {
        let code = "def f(items):\n    for x in items:\n        pass\n    with open_it() as handle:\n        pass\n    try:\n        pass\n    except Oops as err:\n        pass\n    if (n := count()):\n        pass\n    call(key=val)\n    total += 1\n    import json\n    global G\n";
        assert_eq!(
            deps(code, "pkg.main.f"),
            vec![
                "pkg.main.Oops",
                "pkg.main.call",
                "pkg.main.count",
                "pkg.main.open_it",
                "pkg.main.val",
            ]
        );
    }

    #[test]
    fn fstring_interpolations_are_references() {
        let code = "def f():\n    return f\"{render(x)} done\" + 'plain {y}'\n";
        assert_eq!(deps(code, "pkg.main.f"), vec!["pkg.main.render", "pkg.main.x"]);
    }

    #[test]
    fn assignment_components_resolve_their_value() {
        let code = "from pkg.a import make\nSETTINGS = make(DEBUG)\n";
        assert_eq!(
            deps(code, "pkg.main.SETTINGS"),
            vec!["pkg.a.make", "pkg.main.DEBUG"]
        );
    }
}
