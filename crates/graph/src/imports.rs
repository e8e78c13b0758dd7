use depgraph_extractor::SourceFile;
use depgraph_indexer::ModuleIndex;
use std::collections::{BTreeMap, BTreeSet};
use tree_sitter::Node;

/// Top-level standard-library packages never linked into the graph.
pub const STANDARD_MODULES: &[&str] = &[
    "abc",
    "argparse",
    "array",
    "asyncio",
    "base64",
    "collections",
    "copy",
    "csv",
    "datetime",
    "enum",
    "functools",
    "glob",
    "io",
    "itertools",
    "json",
    "logging",
    "math",
    "os",
    "pathlib",
    "random",
    "re",
    "shutil",
    "string",
    "sys",
    "time",
    "typing",
    "uuid",
    "warnings",
    "xml",
];

/// Name recorded for `from m import *`
pub const WILDCARD: &str = "*";

/// Names imported from one resolved module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromImport {
    /// Absolute module path (or the verbatim text when unresolved)
    pub module: String,
    /// Names bound in the importing file; `from m import f as g` binds `g`
    pub names: BTreeSet<String>,
}

impl FromImport {
    pub fn binds(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_wildcard(&self) -> bool {
        self.names.contains(WILDCARD)
    }
}

/// Import bindings of a single file.
///
/// Recomputed for every file; bindings never leak across files.
#[derive(Debug, Clone, Default)]
pub struct ImportBindings {
    module_path: String,
    /// Local identifier -> module as written (`import x`, `import x as y`)
    direct: BTreeMap<String, String>,
    /// Modules of unaliased `import a.b`
    dotted: BTreeSet<String>,
    /// In order of first appearance
    from_imports: Vec<FromImport>,
}

impl ImportBindings {
    /// Collect every import statement of the file, nested ones included.
    pub fn collect(file: &SourceFile, index: &ModuleIndex) -> Self {
        let mut bindings = Self {
            module_path: file.module_path.clone(),
            ..Self::default()
        };

        let mut stack = vec![file.root()];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "import_statement" => bindings.add_import(file, node),
                "import_from_statement" => bindings.add_from_import(file, node, index),
                _ => {
                    let mut cursor = node.walk();
                    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        log::debug!(
            "{}: {} direct imports, {} from-imports",
            bindings.module_path,
            bindings.direct.len(),
            bindings.from_imports.len()
        );
        bindings
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Module bound to a local identifier by a direct import
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.direct.get(name).map(String::as_str)
    }

    pub fn direct_imports(&self) -> &BTreeMap<String, String> {
        &self.direct
    }

    pub fn from_imports(&self) -> &[FromImport] {
        &self.from_imports
    }

    /// From-import recorded under exactly this module key
    pub fn from_import(&self, module: &str) -> Option<&FromImport> {
        self.from_imports.iter().find(|imp| imp.module == module)
    }

    /// Module prefix of an attribute chain rooted at a direct-import alias.
    ///
    /// Returns the resolved module and the index of the chain segment naming
    /// a member of it; an index past the end means the chain names no member.
    /// `import pkg.mod` followed by `pkg.mod.f` yields `("pkg.mod", 2)`;
    /// `import pkg.mod as m` followed by `m.f` yields `("pkg.mod", 1)`.
    pub fn module_prefix(&self, parts: &[&str]) -> Option<(&str, usize)> {
        for len in (2..parts.len()).rev() {
            if let Some(module) = self.dotted.get(&parts[..len].join(".")) {
                return Some((module.as_str(), len));
            }
        }

        let module = self.alias(parts.first()?)?;
        let segments: Vec<&str> = module.split('.').collect();
        if segments.len() > 1 && segments[0] == parts[0] {
            // unaliased `import a.b`: the chain has to spell the module out
            let spelled = parts.iter().zip(&segments).all(|(p, s)| p == s);
            let member = if spelled { segments.len() } else { parts.len() };
            return Some((module, member));
        }
        Some((module, 1))
    }

    fn add_import(&mut self, file: &SourceFile, node: Node<'_>) {
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            match name.kind() {
                "dotted_name" => {
                    let written = dotted_text(file, name);
                    let identifier = written.split('.').next().unwrap_or(&written).to_string();
                    if written.contains('.') {
                        self.dotted.insert(written.clone());
                    }
                    self.direct.insert(identifier, written);
                }
                "aliased_import" => {
                    let (Some(module), Some(alias)) = (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ) else {
                        continue;
                    };
                    self.direct
                        .insert(file.node_text(alias).to_string(), dotted_text(file, module));
                }
                _ => {}
            }
        }
    }

    fn add_from_import(&mut self, file: &SourceFile, node: Node<'_>, index: &ModuleIndex) {
        let Some(module_name) = node.child_by_field_name("module_name") else {
            return;
        };

        let module = match module_name.kind() {
            "relative_import" => {
                let mut level = 0;
                let mut suffix = None;
                let mut cursor = module_name.walk();
                for part in module_name.named_children(&mut cursor) {
                    match part.kind() {
                        "import_prefix" => {
                            level = file.node_text(part).chars().filter(|c| *c == '.').count();
                        }
                        "dotted_name" => suffix = Some(dotted_text(file, part)),
                        _ => {}
                    }
                }
                resolve_relative(level, suffix.as_deref(), &self.module_path)
            }
            _ => resolve_absolute(&dotted_text(file, module_name), &self.module_path, index),
        };

        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "wildcard_import" {
                names.push(WILDCARD.to_string());
            }
        }
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            match name.kind() {
                "dotted_name" => names.push(dotted_text(file, name)),
                "aliased_import" => {
                    if let Some(alias) = name.child_by_field_name("alias") {
                        names.push(file.node_text(alias).to_string());
                    }
                }
                _ => {}
            }
        }

        let entry = match self.from_imports.iter().position(|imp| imp.module == module) {
            Some(pos) => &mut self.from_imports[pos],
            None => {
                self.from_imports.push(FromImport {
                    module,
                    names: BTreeSet::new(),
                });
                let last = self.from_imports.len() - 1;
                &mut self.from_imports[last]
            }
        };
        entry.names.extend(names);
    }
}

/// Resolve an absolute module reference made from `current_module`.
///
/// A known module is used as-is. Otherwise the parent packages of the current
/// module are tried as prefixes, innermost first; the first known candidate
/// wins. Unresolvable names are kept verbatim.
pub fn resolve_absolute(module: &str, current_module: &str, index: &ModuleIndex) -> String {
    if index.contains(module) {
        return module.to_string();
    }

    let current: Vec<&str> = current_module.split('.').collect();
    let mut parent = &current[..current.len().saturating_sub(1)];
    while !parent.is_empty() {
        let candidate = format!("{}.{module}", parent.join("."));
        if index.contains(&candidate) {
            return candidate;
        }
        parent = &parent[..parent.len() - 1];
    }

    module.to_string()
}

/// Resolve `from <dots><suffix> import ...` made from `current_module`.
///
/// `level` trailing segments are stripped from the current module path and
/// the suffix, if any, is appended. The result is kept even when it is not a
/// known module.
pub fn resolve_relative(level: usize, suffix: Option<&str>, current_module: &str) -> String {
    let current: Vec<&str> = current_module.split('.').collect();
    let mut base: Vec<&str> = current[..current.len().saturating_sub(level)].to_vec();
    if let Some(suffix) = suffix {
        base.extend(suffix.split('.'));
    }

    if base.is_empty() {
        suffix.unwrap_or_default().to_string()
    } else {
        base.join(".")
    }
}

fn dotted_text(file: &SourceFile, node: Node<'_>) -> String {
    if node.kind() != "dotted_name" {
        return file.node_text(node).to_string();
    }
    let mut cursor = node.walk();
    let parts: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|part| part.kind() == "identifier")
        .map(|part| file.node_text(part))
        .collect();
    parts.join(".")
}
