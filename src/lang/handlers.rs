//! Per-language handler hooks consumed by the analyzer.
//!
//! A handler is a small capability set, not a class hierarchy: the trait's
//! default method bodies are the fallback behavior, and each language
//! overrides only the hooks where its grammar deviates. The effective
//! handler is therefore always `default ⊕ specific`.

use std::collections::{HashMap, HashSet};

use tree_sitter::Node;

use crate::graph::{NodeKind, Parameter};

/// Per-file state computed once before the definition pass.
#[derive(Debug, Default)]
pub struct FileState {
    /// Class-like names that occur more than once in the file. Members of
    /// these classes are skipped: their qualified ids would silently alias
    /// two distinct classes.
    pub duplicate_classes: HashSet<String>,
}

/// Outcome of [`LanguageHandler::process_complex_symbol`].
pub enum ComplexOutcome {
    /// Not a class member; the analyzer takes the normal naming path.
    NotComplex,
    /// Member of a duplicated class or an anonymous container; drop it.
    Skip,
    /// Class member: use this qualified name (`Class.member`) and kind.
    Member { qualified: String, kind: NodeKind },
}

pub trait LanguageHandler: Sync {
    /// Node kinds whose names participate in duplicate-class detection.
    fn class_like_kinds(&self) -> &'static [&'static str] {
        &["class_declaration", "abstract_class_declaration"]
    }

    /// Compute file-local state. The default collects duplicate class names.
    fn pre_process_file(&self, root: Node, source: &[u8]) -> FileState {
        let mut counts: HashMap<String, usize> = HashMap::new();
        collect_named_kinds(root, source, self.class_like_kinds(), &mut counts);
        FileState {
            duplicate_classes: counts
                .into_iter()
                .filter(|(_, n)| *n > 1)
                .map(|(name, _)| name)
                .collect(),
        }
    }

    /// Whether a definition capture should be dropped before emission.
    fn should_skip_symbol(&self, _node: Node, _kind: NodeKind, _source: &[u8]) -> bool {
        false
    }

    /// Whether an `import.source` capture should be dropped.
    fn should_skip_import(&self, _node: Node) -> bool {
        false
    }

    /// The node carrying a definition's name, after unwrapping any
    /// export/decorator wrapper. `None` means the symbol is anonymous.
    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        let node = unwrap_wrappers(node);
        node.child_by_field_name("name").or_else(|| find_name_like(node))
    }

    /// Class-member handling: walk up to the enclosing class and qualify.
    fn process_complex_symbol(
        &self,
        _node: Node,
        _kind: NodeKind,
        _source: &[u8],
        _state: &FileState,
    ) -> ComplexOutcome {
        ComplexOutcome::NotComplex
    }

    /// Parse a raw parameter-list text (`(a: string, b = 3)`) into entries.
    /// The default understands `name: type` lists with defaults and rest
    /// markers, which covers TypeScript, Python, and PHP-without-types.
    fn parse_parameters(&self, text: &str) -> Vec<Parameter> {
        split_top_level(trim_parens(text))
            .into_iter()
            .filter_map(|part| {
                let part = part.trim().trim_start_matches("...");
                if part.is_empty() || part == "self" || part == "this" {
                    return None;
                }
                let part = part.split('=').next().unwrap_or(part).trim();
                match split_name_type(part) {
                    (name, Some(ty)) => Some(Parameter {
                        name: name.to_string(),
                        ty: Some(ty.to_string()),
                    }),
                    (name, None) => Some(Parameter {
                        name: name.to_string(),
                        ty: None,
                    }),
                }
            })
            .collect()
    }

    /// Expand a reference capture into target names. The default yields the
    /// node's text with generic arguments stripped.
    fn expand_reference(&self, node: Node, source: &[u8]) -> Vec<String> {
        let text = strip_generics(node_text(node, source));
        if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        }
    }

    /// Node kinds that open a function scope; definitions nested inside one
    /// are locals and never become top-level symbols.
    fn is_function_scope(&self, node_kind: &str) -> bool {
        matches!(
            node_kind,
            "function_declaration"
                | "function_definition"
                | "function_expression"
                | "arrow_function"
                | "method_definition"
                | "method_declaration"
                | "function_item"
                | "constructor_declaration"
        )
    }

    /// Resolve a raw import path to an entry of `all_files`, or `None`.
    /// The default joins the path relative to the importing file and looks
    /// for an exact match — enough for languages that import concrete paths.
    fn resolve_import(&self, from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        let joined = join_relative(from_file, raw);
        all_files.iter().find(|f| **f == joined).cloned()
    }
}

// ---------------------------------------------------------------------------
// Shared node / path helpers
// ---------------------------------------------------------------------------

pub(crate) fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Step through export/decorator wrappers down to the declaration itself.
fn unwrap_wrappers(node: Node) -> Node {
    let mut current = node;
    loop {
        match current.kind() {
            "export_statement" | "decorated_definition" | "template_declaration" => {
                let mut next = None;
                let mut cursor = current.walk();
                for child in current.children(&mut cursor) {
                    if child.is_named() && !matches!(child.kind(), "decorator" | "comment" | "string") {
                        next = Some(child);
                        break;
                    }
                }
                match next {
                    Some(n) => current = n,
                    None => return current,
                }
            }
            _ => return current,
        }
    }
}

/// Breadth-first search for the first identifier-shaped descendant.
fn find_name_like(node: Node) -> Option<Node> {
    let mut queue = vec![node];
    let mut i = 0;
    while i < queue.len() {
        let n = queue[i];
        i += 1;
        if n.id() != node.id()
            && matches!(
                n.kind(),
                "identifier" | "type_identifier" | "field_identifier" | "property_identifier" | "name"
            )
        {
            return Some(n);
        }
        let mut cursor = n.walk();
        for child in n.children(&mut cursor) {
            queue.push(child);
        }
    }
    None
}

fn collect_named_kinds(
    node: Node,
    source: &[u8],
    kinds: &[&str],
    counts: &mut HashMap<String, usize>,
) {
    if kinds.contains(&node.kind())
        && let Some(name) = node.child_by_field_name("name")
    {
        *counts.entry(node_text(name, source).to_string()).or_insert(0) += 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_named_kinds(child, source, kinds, counts);
    }
}

/// Nearest ancestor of `node` whose kind is in `kinds`, stopping early at
/// any function boundary when `stop_at_function` is set.
fn ancestor_of_kind<'t>(
    handler: &dyn LanguageHandler,
    node: Node<'t>,
    kinds: &[&str],
    stop_at_function: bool,
) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return Some(n);
        }
        if stop_at_function && handler.is_function_scope(n.kind()) {
            return None;
        }
        current = n.parent();
    }
    None
}

pub(crate) fn strip_generics(text: &str) -> &str {
    match text.find('<') {
        Some(idx) => text[..idx].trim(),
        None => text.trim(),
    }
}

fn trim_parens(text: &str) -> &str {
    text.trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
}

/// Split on commas that sit outside any bracket pair.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// Split `name: type` at the first top-level colon.
fn split_name_type(part: &str) -> (&str, Option<&str>) {
    let mut depth = 0i32;
    for (i, c) in part.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            ':' if depth == 0 => {
                return (part[..i].trim().trim_end_matches('?'), Some(part[i + 1..].trim()));
            }
            _ => {}
        }
    }
    (part.trim(), None)
}

/// Directory component of a POSIX path ("" for bare filenames).
pub(crate) fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Join `raw` against the directory of `from` and collapse `.`/`..`
/// components. Absolute specifiers are used as-is (minus the leading slash).
pub(crate) fn join_relative(from: &str, raw: &str) -> String {
    let base = if let Some(stripped) = raw.strip_prefix('/') {
        return stripped.to_string();
    } else {
        dirname(from)
    };
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for comp in raw.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Fallback behavior for languages without a dedicated handler.
pub struct DefaultHandler;

impl LanguageHandler for DefaultHandler {}

/// TypeScript, TSX, and JavaScript.
///
/// The most elaborate handler: duplicate-class suppression, arrow-function
/// aliasing (a `const` declarator owning an arrow function belongs to the
/// arrow capture), destructuring declarators, and accessibility modifiers.
pub struct TypeScriptHandler;

impl TypeScriptHandler {
    /// The declarator value of a lexical/variable declaration, if any.
    fn declarator_value<'t>(node: Node<'t>) -> Option<Node<'t>> {
        let decl = unwrap_wrappers(node);
        let mut cursor = decl.walk();
        for child in decl.children(&mut cursor) {
            if child.kind() == "variable_declarator" {
                return child.child_by_field_name("value");
            }
        }
        None
    }
}

impl LanguageHandler for TypeScriptHandler {
    fn should_skip_symbol(&self, node: Node, kind: NodeKind, _source: &[u8]) -> bool {
        // A variable declarator whose value is a function belongs to the
        // arrow_function capture of the same declaration.
        kind == NodeKind::Variable
            && Self::declarator_value(node)
                .map(|v| matches!(v.kind(), "arrow_function" | "function_expression"))
                .unwrap_or(false)
    }

    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        let decl = unwrap_wrappers(node);
        match decl.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = decl.walk();
                for child in decl.children(&mut cursor) {
                    if child.kind() == "variable_declarator" {
                        return child.child_by_field_name("name");
                    }
                }
                None
            }
            // `export default () => ...` and friends: anonymous.
            "arrow_function" | "function_expression" => None,
            _ => decl.child_by_field_name("name"),
        }
    }

    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        if !matches!(kind, NodeKind::Method | NodeKind::Field) {
            return ComplexOutcome::NotComplex;
        }
        let class = match ancestor_of_kind(self, node, self.class_like_kinds(), false) {
            Some(c) => c,
            // Object-literal methods have no class; dropping them keeps every
            // method id class-qualified.
            None => return ComplexOutcome::Skip,
        };
        let class_name = class
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string());
        let Some(class_name) = class_name else {
            return ComplexOutcome::Skip;
        };
        if state.duplicate_classes.contains(&class_name) {
            return ComplexOutcome::Skip;
        }
        let Some(member) = node.child_by_field_name("name") else {
            return ComplexOutcome::Skip;
        };
        let member_name = node_text(member, source);
        let kind = if member_name == "constructor" {
            NodeKind::Constructor
        } else {
            kind
        };
        ComplexOutcome::Member {
            qualified: format!("{class_name}.{member_name}"),
            kind,
        }
    }

    /// Module-resolver algorithm: verbatim, then extension substitution and
    /// appending, then `<path>/index<ext>`. Bare specifiers are packages and
    /// resolve to nothing.
    fn resolve_import(&self, from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        const EXTS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];
        if !raw.starts_with('.') && !raw.starts_with('/') {
            return None;
        }
        let joined = join_relative(from_file, raw);
        let mut candidates = vec![joined.clone()];
        let stem = EXTS
            .iter()
            .find_map(|ext| joined.strip_suffix(ext))
            .unwrap_or(joined.as_str());
        for ext in EXTS {
            candidates.push(format!("{stem}{ext}"));
        }
        for ext in EXTS {
            candidates.push(format!("{joined}/index{ext}"));
        }
        candidates
            .into_iter()
            .find(|c| all_files.iter().any(|f| f == c))
    }
}

/// Python: assignment-target names, decorator unwrapping, relative imports
/// resolved by dot count.
pub struct PythonHandler;

impl LanguageHandler for PythonHandler {
    fn class_like_kinds(&self) -> &'static [&'static str] {
        &["class_definition"]
    }

    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        let decl = unwrap_wrappers(node);
        match decl.kind() {
            "expression_statement" => {
                let assignment = decl.named_child(0)?;
                let left = assignment.child_by_field_name("left")?;
                if left.kind() == "identifier" {
                    Some(left)
                } else {
                    // Tuple/attribute targets: take the first plain name.
                    find_name_like(left).or(Some(left))
                }
            }
            _ => decl.child_by_field_name("name"),
        }
    }

    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        // Anything directly inside a class body is a member; a function
        // boundary in between means a local instead.
        let Some(class) = ancestor_of_kind(self, node, &["class_definition"], true) else {
            return ComplexOutcome::NotComplex;
        };
        let Some(class_name) = class
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
        else {
            return ComplexOutcome::Skip;
        };
        if state.duplicate_classes.contains(&class_name) {
            return ComplexOutcome::Skip;
        }
        let Some(member) = self.symbol_name_node(node, source) else {
            return ComplexOutcome::Skip;
        };
        let member_name = node_text(member, source);
        let kind = match kind {
            NodeKind::Function => {
                if member_name == "__init__" {
                    NodeKind::Constructor
                } else {
                    NodeKind::Method
                }
            }
            NodeKind::Variable => NodeKind::Field,
            other => other,
        };
        ComplexOutcome::Member {
            qualified: format!("{class_name}.{member_name}"),
            kind,
        }
    }

    /// `.`-prefixed imports ascend `dots - 1` directories from the importing
    /// file; dotted module names map to `/`-separated paths with `.py` or
    /// `/__init__.py` appended.
    fn resolve_import(&self, from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        let dots = raw.chars().take_while(|c| *c == '.').count();
        let rest = &raw[dots..];
        let rel = rest.replace('.', "/");

        let candidates: Vec<String> = if dots > 0 {
            let mut dir = dirname(from_file).to_string();
            for _ in 1..dots {
                dir = dirname(&dir).to_string();
            }
            let base = if rel.is_empty() {
                dir
            } else if dir.is_empty() {
                rel
            } else {
                format!("{dir}/{rel}")
            };
            vec![format!("{base}.py"), format!("{base}/__init__.py")]
        } else {
            vec![format!("{rel}.py"), format!("{rel}/__init__.py")]
        };

        for cand in &candidates {
            if let Some(hit) = all_files
                .iter()
                .find(|f| *f == cand || f.ends_with(&format!("/{cand}")))
            {
                return Some(hit.clone());
            }
        }
        None
    }
}

/// Go: type/const/var spec unwrapping and receiver-qualified methods.
pub struct GoHandler;

impl LanguageHandler for GoHandler {
    fn class_like_kinds(&self) -> &'static [&'static str] {
        &["type_spec"]
    }

    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        match node.kind() {
            "type_declaration" | "const_declaration" | "var_declaration" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if matches!(child.kind(), "type_spec" | "const_spec" | "var_spec") {
                        return child.child_by_field_name("name");
                    }
                }
                None
            }
            _ => node.child_by_field_name("name"),
        }
    }

    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        if kind != NodeKind::Method || node.kind() != "method_declaration" {
            return ComplexOutcome::NotComplex;
        }
        let Some(receiver) = node.child_by_field_name("receiver") else {
            return ComplexOutcome::Skip;
        };
        // Receiver type, minus any pointer marker: `(s *Server)` -> `Server`.
        let recv_text = node_text(receiver, source);
        let type_name = recv_text
            .trim_matches(|c| c == '(' || c == ')')
            .split_whitespace()
            .last()
            .unwrap_or("")
            .trim_start_matches('*')
            .to_string();
        if type_name.is_empty() {
            return ComplexOutcome::Skip;
        }
        if state.duplicate_classes.contains(&type_name) {
            return ComplexOutcome::Skip;
        }
        let Some(name) = node.child_by_field_name("name") else {
            return ComplexOutcome::Skip;
        };
        ComplexOutcome::Member {
            qualified: format!("{type_name}.{}", node_text(name, source)),
            kind: NodeKind::Method,
        }
    }

    fn parse_parameters(&self, text: &str) -> Vec<Parameter> {
        split_top_level(trim_parens(text))
            .into_iter()
            .filter_map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return None;
                }
                let mut words = part.splitn(2, ' ');
                let name = words.next()?.to_string();
                Some(Parameter {
                    name,
                    ty: words.next().map(|t| t.trim().to_string()),
                })
            })
            .collect()
    }
}

/// Rust: impl/trait member qualification and `mod`/`use` resolution through
/// the `<name>.rs` / `<name>/mod.rs` convention.
pub struct RustHandler;

impl LanguageHandler for RustHandler {
    fn class_like_kinds(&self) -> &'static [&'static str] {
        &["struct_item", "enum_item", "trait_item", "union_item"]
    }

    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        match node.kind() {
            // `impl Point` / `impl Display for Point`: the type is the name.
            "impl_item" => node.child_by_field_name("type"),
            _ => node.child_by_field_name("name"),
        }
    }

    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        if kind != NodeKind::Function {
            return ComplexOutcome::NotComplex;
        }
        let Some(container) = ancestor_of_kind(self, node, &["impl_item", "trait_item"], true)
        else {
            return ComplexOutcome::NotComplex;
        };
        let owner = match container.kind() {
            "impl_item" => container.child_by_field_name("type"),
            _ => container.child_by_field_name("name"),
        };
        let Some(owner) = owner else {
            return ComplexOutcome::Skip;
        };
        let owner_name = strip_generics(node_text(owner, source)).to_string();
        if state.duplicate_classes.contains(&owner_name) {
            return ComplexOutcome::Skip;
        }
        let Some(name) = node.child_by_field_name("name") else {
            return ComplexOutcome::Skip;
        };
        ComplexOutcome::Member {
            qualified: format!("{owner_name}.{}", node_text(name, source)),
            kind: NodeKind::Method,
        }
    }

    fn should_skip_import(&self, node: Node) -> bool {
        // `mod foo { ... }` defines an inline module; only `mod foo;`
        // points at another file.
        node.parent()
            .map(|p| p.kind() == "mod_item" && p.child_by_field_name("body").is_some())
            .unwrap_or(false)
    }

    fn resolve_import(&self, from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        let mut path = raw.trim();
        let mut dir = dirname(from_file).to_string();
        path = path.strip_prefix("crate::").unwrap_or(path);
        path = path.strip_prefix("self::").unwrap_or(path);
        while let Some(rest) = path.strip_prefix("super::") {
            dir = dirname(&dir).to_string();
            path = rest;
        }
        let first = path.split("::").next().unwrap_or(path);
        let first: String = first
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if first.is_empty() {
            return None;
        }
        let candidates = if dir.is_empty() {
            vec![format!("{first}.rs"), format!("{first}/mod.rs")]
        } else {
            vec![format!("{dir}/{first}.rs"), format!("{dir}/{first}/mod.rs")]
        };
        candidates
            .into_iter()
            .find(|c| all_files.iter().any(|f| f == c))
    }
}

/// C and C++: declarator recursion for function names, typedef last-child
/// naming, and `#include` path resolution.
pub struct CFamilyHandler;

impl CFamilyHandler {
    /// Descend through pointer/reference declarators to the identifier.
    fn declarator_name<'t>(node: Node<'t>) -> Option<Node<'t>> {
        let mut current = node.child_by_field_name("declarator")?;
        loop {
            match current.kind() {
                "identifier" | "field_identifier" | "qualified_identifier" => {
                    return Some(current);
                }
                _ => match current.child_by_field_name("declarator") {
                    Some(inner) => current = inner,
                    None => return find_name_like(current),
                },
            }
        }
    }
}

impl LanguageHandler for CFamilyHandler {
    fn class_like_kinds(&self) -> &'static [&'static str] {
        &["class_specifier", "struct_specifier"]
    }

    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        match node.kind() {
            "function_definition" => Self::declarator_name(node),
            // typedef: the alias is the last named child.
            "type_definition" => {
                let count = node.named_child_count();
                (0..count)
                    .rev()
                    .filter_map(|i| node.named_child(i as u32))
                    .find(|c| matches!(c.kind(), "type_identifier" | "identifier"))
            }
            "template_declaration" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if matches!(
                        child.kind(),
                        "function_definition" | "class_specifier" | "struct_specifier"
                    ) {
                        return self.symbol_name_node(child, _source);
                    }
                }
                None
            }
            _ => node.child_by_field_name("name"),
        }
    }

    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        if kind != NodeKind::Function || node.kind() != "function_definition" {
            return ComplexOutcome::NotComplex;
        }
        let Some(class) = ancestor_of_kind(self, node, self.class_like_kinds(), true) else {
            return ComplexOutcome::NotComplex;
        };
        let Some(class_name) = class
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
        else {
            return ComplexOutcome::Skip;
        };
        if state.duplicate_classes.contains(&class_name) {
            return ComplexOutcome::Skip;
        }
        let Some(name) = Self::declarator_name(node) else {
            return ComplexOutcome::Skip;
        };
        ComplexOutcome::Member {
            qualified: format!("{class_name}.{}", node_text(name, source)),
            kind: NodeKind::Method,
        }
    }

    fn parse_parameters(&self, text: &str) -> Vec<Parameter> {
        parse_type_first_parameters(text)
    }

    fn resolve_import(&self, from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        // System includes (<stdio.h>) never resolve inside the repository.
        if raw.starts_with('<') {
            return None;
        }
        let joined = join_relative(from_file, raw);
        all_files
            .iter()
            .find(|f| **f == joined || f.ends_with(&format!("/{raw}")))
            .cloned()
    }
}

/// `type name` parameter lists (C, C++, Java, C#, PHP type hints): the
/// identifier is the last word, everything before it is the type.
fn parse_type_first_parameters(text: &str) -> Vec<Parameter> {
    split_top_level(trim_parens(text))
        .into_iter()
        .filter_map(|part| {
            let part = part.split('=').next().unwrap_or(part).trim();
            if part.is_empty() || part == "void" {
                return None;
            }
            let name = part
                .rsplit(|c: char| c == ' ' || c == '*' || c == '&')
                .next()
                .unwrap_or(part);
            let ty = part[..part.len() - name.len()].trim();
            Some(Parameter {
                name: name.to_string(),
                ty: if ty.is_empty() {
                    None
                } else {
                    Some(ty.trim_end_matches(['*', '&', ' ']).to_string())
                },
            })
        })
        .collect()
}

/// PHP: namespace name nodes and backslash-namespace import mapping.
pub struct PhpHandler;

impl LanguageHandler for PhpHandler {
    fn class_like_kinds(&self) -> &'static [&'static str] {
        &["class_declaration", "trait_declaration"]
    }

    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        if kind != NodeKind::Method {
            return ComplexOutcome::NotComplex;
        }
        let containers = ["class_declaration", "trait_declaration", "interface_declaration"];
        let Some(class) = ancestor_of_kind(self, node, &containers, false) else {
            return ComplexOutcome::Skip;
        };
        let Some(class_name) = class
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
        else {
            return ComplexOutcome::Skip;
        };
        if state.duplicate_classes.contains(&class_name) {
            return ComplexOutcome::Skip;
        }
        let Some(name) = node.child_by_field_name("name") else {
            return ComplexOutcome::Skip;
        };
        let member_name = node_text(name, source);
        let kind = if member_name == "__construct" {
            NodeKind::Constructor
        } else {
            NodeKind::Method
        };
        ComplexOutcome::Member {
            qualified: format!("{class_name}.{member_name}"),
            kind,
        }
    }

    fn parse_parameters(&self, text: &str) -> Vec<Parameter> {
        parse_type_first_parameters(text)
    }

    fn resolve_import(&self, _from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        // `App\Models\User` — namespaces mirror directories.
        let rel = raw.trim_start_matches('\\').replace('\\', "/");
        let cand = format!("{rel}.php");
        all_files
            .iter()
            .find(|f| **f == cand || f.ends_with(&format!("/{cand}")))
            .cloned()
    }
}

/// Java: members qualified by their class, package imports mapped to
/// directory paths.
pub struct JavaHandler;

impl JavaHandler {
    fn member_name<'t>(node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "field_declaration" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.kind() == "variable_declarator" {
                        return child.child_by_field_name("name");
                    }
                }
                None
            }
            _ => node.child_by_field_name("name"),
        }
    }
}

impl LanguageHandler for JavaHandler {
    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        Self::member_name(node)
    }

    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        if !matches!(
            kind,
            NodeKind::Method | NodeKind::Constructor | NodeKind::Field
        ) {
            return ComplexOutcome::NotComplex;
        }
        let containers = ["class_declaration", "interface_declaration", "enum_declaration"];
        let Some(class) = ancestor_of_kind(self, node, &containers, false) else {
            return ComplexOutcome::Skip;
        };
        let Some(class_name) = class
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
        else {
            return ComplexOutcome::Skip;
        };
        if state.duplicate_classes.contains(&class_name) {
            return ComplexOutcome::Skip;
        }
        let Some(name) = Self::member_name(node) else {
            return ComplexOutcome::Skip;
        };
        ComplexOutcome::Member {
            qualified: format!("{class_name}.{}", node_text(name, source)),
            kind,
        }
    }

    fn parse_parameters(&self, text: &str) -> Vec<Parameter> {
        parse_type_first_parameters(text)
    }

    /// `com.example.Foo` — packages mirror directories, suffix `.java`.
    /// No classpath search is attempted.
    fn resolve_import(&self, _from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        let rel = raw.replace('.', "/");
        let cand = format!("{rel}.java");
        all_files
            .iter()
            .find(|f| **f == cand || f.ends_with(&format!("/{cand}")))
            .cloned()
    }
}

/// C#: Java-shaped members, `.cs` package mapping.
pub struct CSharpHandler;

impl LanguageHandler for CSharpHandler {
    fn process_complex_symbol(
        &self,
        node: Node,
        kind: NodeKind,
        source: &[u8],
        state: &FileState,
    ) -> ComplexOutcome {
        if !matches!(
            kind,
            NodeKind::Method | NodeKind::Constructor | NodeKind::Field | NodeKind::Property
        ) {
            return ComplexOutcome::NotComplex;
        }
        let containers = ["class_declaration", "interface_declaration", "struct_declaration"];
        let Some(class) = ancestor_of_kind(self, node, &containers, false) else {
            return ComplexOutcome::Skip;
        };
        let Some(class_name) = class
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
        else {
            return ComplexOutcome::Skip;
        };
        if state.duplicate_classes.contains(&class_name) {
            return ComplexOutcome::Skip;
        }
        let name = match node.kind() {
            // `private Foo bar;` — the name sits on the declarator, not on
            // the type (which may itself be a bare identifier).
            "field_declaration" => Self::declarator_name(node),
            _ => node.child_by_field_name("name"),
        };
        let Some(name) = name else {
            return ComplexOutcome::Skip;
        };
        ComplexOutcome::Member {
            qualified: format!("{class_name}.{}", node_text(name, source)),
            kind,
        }
    }

    fn parse_parameters(&self, text: &str) -> Vec<Parameter> {
        parse_type_first_parameters(text)
    }

    fn resolve_import(&self, _from_file: &str, raw: &str, all_files: &[String]) -> Option<String> {
        let rel = raw.replace('.', "/");
        let cand = format!("{rel}.cs");
        all_files
            .iter()
            .find(|f| **f == cand || f.ends_with(&format!("/{cand}")))
            .cloned()
    }
}

impl CSharpHandler {
    fn declarator_name<'t>(field: Node<'t>) -> Option<Node<'t>> {
        let mut queue = vec![field];
        let mut i = 0;
        while i < queue.len() {
            let n = queue[i];
            i += 1;
            if n.kind() == "variable_declarator" {
                return n.child_by_field_name("name").or_else(|| find_name_like(n));
            }
            let mut cursor = n.walk();
            for child in n.children(&mut cursor) {
                queue.push(child);
            }
        }
        None
    }
}

/// CSS: a rule's name is its selector text.
pub struct CssHandler;

impl LanguageHandler for CssHandler {
    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).find(|c| c.kind() == "selectors")
    }
}

/// HTML: elements without an `id` or `class` attribute are skipped; the
/// reference expansion turns class lists into one `.name` target each.
pub struct HtmlHandler;

impl HtmlHandler {
    fn attributes<'t>(element: Node<'t>) -> Vec<Node<'t>> {
        let mut out = Vec::new();
        let Some(start_tag) = element.child(0).filter(|c| c.kind() == "start_tag") else {
            return out;
        };
        let mut cursor = start_tag.walk();
        for child in start_tag.children(&mut cursor) {
            if child.kind() == "attribute" {
                out.push(child);
            }
        }
        out
    }

    fn attribute_parts(attr: Node, source: &[u8]) -> Option<(String, String)> {
        let mut name = None;
        let mut value = None;
        let mut cursor = attr.walk();
        for child in attr.children(&mut cursor) {
            match child.kind() {
                "attribute_name" => name = Some(node_text(child, source).to_string()),
                "quoted_attribute_value" | "attribute_value" => {
                    value = Some(node_text(child, source).trim_matches(['"', '\'']).to_string());
                }
                _ => {}
            }
        }
        Some((name?, value?))
    }
}

impl LanguageHandler for HtmlHandler {
    fn should_skip_symbol(&self, node: Node, kind: NodeKind, source: &[u8]) -> bool {
        if kind != NodeKind::HtmlElement {
            return false;
        }
        !Self::attributes(node).iter().any(|attr| {
            Self::attribute_parts(*attr, source)
                .map(|(name, _)| name == "id" || name == "class")
                .unwrap_or(false)
        })
    }

    fn symbol_name_node<'t>(&self, node: Node<'t>, _source: &[u8]) -> Option<Node<'t>> {
        let start_tag = node.child(0).filter(|c| c.kind() == "start_tag")?;
        let mut cursor = start_tag.walk();
        start_tag
            .children(&mut cursor)
            .find(|c| c.kind() == "tag_name")
    }

    fn expand_reference(&self, node: Node, source: &[u8]) -> Vec<String> {
        // `class="btn primary"` -> [".btn", ".primary"]; `id="app"` -> ["#app"].
        let Some((name, value)) = Self::attribute_parts(node, source) else {
            return Vec::new();
        };
        match name.as_str() {
            "class" => value
                .split_whitespace()
                .map(|c| format!(".{c}"))
                .collect(),
            "id" => vec![format!("#{value}")],
            _ => Vec::new(),
        }
    }
}

static DEFAULT: DefaultHandler = DefaultHandler;
static TYPESCRIPT: TypeScriptHandler = TypeScriptHandler;
static PYTHON: PythonHandler = PythonHandler;
static GO: GoHandler = GoHandler;
static RUST: RustHandler = RustHandler;
static C_FAMILY: CFamilyHandler = CFamilyHandler;
static PHP: PhpHandler = PhpHandler;
static JAVA: JavaHandler = JavaHandler;
static C_SHARP: CSharpHandler = CSharpHandler;
static CSS: CssHandler = CssHandler;
static HTML: HtmlHandler = HtmlHandler;

/// The effective handler for a registry language name.
pub fn handler_for(language: &str) -> &'static dyn LanguageHandler {
    match language {
        "typescript" | "tsx" | "javascript" => &TYPESCRIPT,
        "python" => &PYTHON,
        "go" => &GO,
        "rust" => &RUST,
        "c" | "cpp" => &C_FAMILY,
        "php" => &PHP,
        "java" => &JAVA,
        "csharp" => &C_SHARP,
        "css" => &CSS,
        "html" => &HTML,
        _ => &DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_relative_collapses_dots() {
        assert_eq!(join_relative("src/a/b.ts", "../c"), "src/c");
        assert_eq!(join_relative("src/a/b.ts", "./c"), "src/a/c");
        assert_eq!(join_relative("main.ts", "./utils"), "utils");
        assert_eq!(join_relative("src/a.ts", "/lib/x"), "lib/x");
    }

    #[test]
    fn test_default_parse_parameters() {
        let params = DefaultHandler.parse_parameters("(n: string, count = 3, ...rest: T[])");
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name, "n");
        assert_eq!(params[0].ty.as_deref(), Some("string"));
        assert_eq!(params[1].name, "count");
        assert_eq!(params[1].ty, None);
        assert_eq!(params[2].name, "rest");
    }

    #[test]
    fn test_parse_parameters_nested_generics() {
        let params = DefaultHandler.parse_parameters("(map: Map<string, number>, b: T)");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].ty.as_deref(), Some("Map<string, number>"));
    }

    #[test]
    fn test_go_parse_parameters() {
        let params = GoHandler.parse_parameters("(name string, opts *Options)");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "name");
        assert_eq!(params[0].ty.as_deref(), Some("string"));
        assert_eq!(params[1].ty.as_deref(), Some("*Options"));
    }

    #[test]
    fn test_ts_resolve_import_extensionless() {
        let files = vec!["src/utils.ts".to_string(), "src/main.ts".to_string()];
        let hit = TypeScriptHandler.resolve_import("src/main.ts", "./utils", &files);
        assert_eq!(hit.as_deref(), Some("src/utils.ts"));
    }

    #[test]
    fn test_ts_resolve_import_index_file() {
        let files = vec!["src/lib/index.ts".to_string()];
        let hit = TypeScriptHandler.resolve_import("src/main.ts", "./lib", &files);
        assert_eq!(hit.as_deref(), Some("src/lib/index.ts"));
    }

    #[test]
    fn test_ts_resolve_import_bare_specifier_is_external() {
        let files = vec!["src/react.ts".to_string()];
        assert_eq!(TypeScriptHandler.resolve_import("src/main.ts", "react", &files), None);
    }

    #[test]
    fn test_python_resolve_relative_import() {
        let files = vec![
            "src/models/base.py".to_string(),
            "src/models/user.py".to_string(),
        ];
        let hit = PythonHandler.resolve_import("src/models/user.py", ".base", &files);
        assert_eq!(hit.as_deref(), Some("src/models/base.py"));
    }

    #[test]
    fn test_python_resolve_double_dot_ascends() {
        let files = vec!["src/util.py".to_string()];
        let hit = PythonHandler.resolve_import("src/models/user.py", "..util", &files);
        assert_eq!(hit.as_deref(), Some("src/util.py"));
    }

    #[test]
    fn test_python_resolve_dotted_module() {
        let files = vec!["app/models/user.py".to_string()];
        let hit = PythonHandler.resolve_import("main.py", "app.models.user", &files);
        assert_eq!(hit.as_deref(), Some("app/models/user.py"));
    }

    #[test]
    fn test_rust_resolve_mod_and_use() {
        let files = vec!["src/utils.rs".to_string(), "src/main.rs".to_string()];
        assert_eq!(
            RustHandler.resolve_import("src/main.rs", "utils", &files).as_deref(),
            Some("src/utils.rs")
        );
        assert_eq!(
            RustHandler
                .resolve_import("src/main.rs", "utils::helper", &files)
                .as_deref(),
            Some("src/utils.rs")
        );
        let files = vec!["src/net/mod.rs".to_string()];
        assert_eq!(
            RustHandler.resolve_import("src/main.rs", "net", &files).as_deref(),
            Some("src/net/mod.rs")
        );
    }

    #[test]
    fn test_java_resolve_package_path() {
        let files = vec!["src/com/example/Foo.java".to_string()];
        let hit = JavaHandler.resolve_import("src/Main.java", "com.example.Foo", &files);
        assert_eq!(hit.as_deref(), Some("src/com/example/Foo.java"));
    }

    #[test]
    fn test_c_resolve_system_include_is_none() {
        let files = vec!["stdio.h".to_string()];
        assert_eq!(CFamilyHandler.resolve_import("main.c", "<stdio.h>", &files), None);
    }

    #[test]
    fn test_strip_generics() {
        assert_eq!(strip_generics("Repository<User>"), "Repository");
        assert_eq!(strip_generics("Base"), "Base");
    }
}
