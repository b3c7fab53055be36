//! Single-file analysis: run the language's capture query over the syntax
//! tree and turn the captures into graph nodes plus unresolved relations.
//!
//! The analyzer is language-agnostic. Everything grammar-specific comes in
//! through the capture vocabulary (see [`crate::lang::queries`]) and the
//! language handler hooks (see [`crate::lang::handlers`]).

use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, QueryCursor, StreamingIterator};

use crate::discovery::FileInput;
use crate::error::Result;
use crate::graph::{CodeNode, CssIntent, NodeKind, Visibility};
use crate::lang::handlers::node_text;
use crate::lang::{ComplexOutcome, LanguageHandler, LanguageSpec, SnippetRule, handler_for};
use crate::parser_pool;

/// Kind of a relation awaiting resolution. `Imports` carries a raw module
/// path in `to_name`; the others carry a symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Imports,
    Inheritance,
    Implementation,
    Call,
    Reference,
}

/// Intermediate `(fromId, toName, type)` tuple produced here and consumed by
/// the resolver.
#[derive(Debug, Clone)]
pub struct UnresolvedRelation {
    pub from_id: String,
    pub to_name: String,
    pub kind: RelationKind,
}

/// The result of analyzing one file: its symbol nodes (the file node itself
/// is owned by the coordinator) and its unresolved relations.
#[derive(Debug, Default)]
pub struct FileAnalysis {
    pub nodes: Vec<CodeNode>,
    pub relations: Vec<UnresolvedRelation>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AuxKind {
    QualifierAsync,
    QualifierStatic,
    QualifierVisibility,
    QualifierThrows,
    Parameters,
    ReturnType,
}

/// Analyze one file. A file that fails to parse yields an empty analysis
/// (warn-logged); a missing grammar is an error the coordinator handles per
/// language.
pub fn analyze_file(file: &FileInput, spec: &'static LanguageSpec) -> Result<FileAnalysis> {
    let handler = handler_for(spec.name);
    parser_pool::with_parser(spec, |parser, compiled| {
        let source = file.content.as_bytes();
        let Some(tree) = parser.parse(source, None) else {
            tracing::warn!(file = %file.path, "parse failed; keeping file node only");
            return FileAnalysis::default();
        };
        let root = tree.root_node();

        // Phase B: run the query and partition captures.
        let mut defs: Vec<(Node, NodeKind)> = Vec::new();
        let mut imports: Vec<Node> = Vec::new();
        let mut refs: Vec<(Node, RelationKind)> = Vec::new();
        let mut aux: Vec<(Node, AuxKind)> = Vec::new();

        let mut seen_defs: HashSet<(usize, NodeKind)> = HashSet::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&compiled.query, root, source);
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let name = compiled.query.capture_names()[capture.index as usize];
                let node = capture.node;
                if let Some(prefix) = name.strip_suffix(".definition") {
                    if let Some(kind) = NodeKind::from_capture_prefix(prefix)
                        && seen_defs.insert((node.id(), kind))
                    {
                        defs.push((node, kind));
                    }
                } else {
                    match name {
                        "import.source" => imports.push(node),
                        "inheritance" => refs.push((node, RelationKind::Inheritance)),
                        "implementation" => refs.push((node, RelationKind::Implementation)),
                        "call" => refs.push((node, RelationKind::Call)),
                        "reference" => refs.push((node, RelationKind::Reference)),
                        "qualifier.async" => aux.push((node, AuxKind::QualifierAsync)),
                        "qualifier.static" => aux.push((node, AuxKind::QualifierStatic)),
                        "qualifier.visibility" => aux.push((node, AuxKind::QualifierVisibility)),
                        "qualifier.throws" => aux.push((node, AuxKind::QualifierThrows)),
                        "symbol.parameters" => aux.push((node, AuxKind::Parameters)),
                        "symbol.returnType" => aux.push((node, AuxKind::ReturnType)),
                        _ => {}
                    }
                }
            }
        }

        // Phase C: definitions.
        let state = handler.pre_process_file(root, source);
        let mut analysis = FileAnalysis::default();
        let mut node_positions: HashMap<String, usize> = HashMap::new();
        // Maps every definition capture that yielded a symbol id to that id,
        // including export-wrapped duplicates of an already-emitted symbol.
        // Both the qualifier association and the enclosing-symbol walk read
        // this table.
        let mut def_symbol_ids: HashMap<usize, String> = HashMap::new();

        for (node, kind) in &defs {
            let (node, kind) = (*node, *kind);
            if handler.should_skip_symbol(node, kind, source) {
                continue;
            }
            if matches!(
                kind,
                NodeKind::Variable | NodeKind::Constant | NodeKind::ArrowFunction
            ) && inside_function(handler, node)
            {
                continue;
            }

            let (name, kind) = match handler.process_complex_symbol(node, kind, source, &state) {
                ComplexOutcome::Skip => continue,
                ComplexOutcome::Member { qualified, kind } => (qualified, kind),
                ComplexOutcome::NotComplex => {
                    match handler.symbol_name_node(node, source) {
                        Some(name_node) => (node_text(name_node, source).to_string(), kind),
                        // Anonymous default exports keep the synthetic name.
                        None if is_default_export(node, source) => ("default".to_string(), kind),
                        None => continue,
                    }
                }
            };
            if name.is_empty() {
                continue;
            }

            let start_line = node.start_position().row + 1;
            let id = match kind {
                NodeKind::HtmlElement => format!("{}#{}:{}", file.path, name, start_line),
                _ => format!("{}#{}", file.path, name),
            };
            def_symbol_ids.insert(node.id(), id.clone());
            if node_positions.contains_key(&id) {
                // First capture wins; overlapping captures of the same
                // symbol only contribute their id mapping above.
                continue;
            }

            let mut code_node = CodeNode::symbol(
                id.clone(),
                kind,
                name.clone(),
                &file.path,
                start_line,
                node.end_position().row + 1,
                cut_snippet(node_text(node, source), spec.snippet),
            );
            match kind {
                NodeKind::CssRule => {
                    code_node.css_selector = Some(name.clone());
                    code_node.css_intents = css_intents(node_text(node, source));
                }
                NodeKind::HtmlElement => {
                    code_node.html_tag = Some(name.clone());
                }
                _ => {}
            }

            node_positions.insert(id, analysis.nodes.len());
            analysis.nodes.push(code_node);
        }

        // Qualifier/detail association: each auxiliary capture belongs to the
        // smallest definition capture whose byte range contains it. A capture
        // whose owner produced no symbol (a skipped local, say) is dropped,
        // never promoted to an enclosing symbol.
        for (owner_node_id, aux_node, aux_kind) in associate_aux(&defs, &aux) {
            let Some(position) = def_symbol_ids
                .get(&owner_node_id)
                .and_then(|symbol_id| node_positions.get(symbol_id))
            else {
                continue;
            };
            apply_aux(handler, &mut analysis.nodes[*position], aux_node, aux_kind, source);
        }

        // Phase D: relationships.
        for node in imports {
            if handler.should_skip_import(node) {
                continue;
            }
            let raw = node_text(node, source)
                .trim_matches(['"', '\'', '`'])
                .to_string();
            if raw.is_empty() {
                continue;
            }
            analysis.relations.push(UnresolvedRelation {
                from_id: file.path.clone(),
                to_name: raw,
                kind: RelationKind::Imports,
            });
        }

        for (node, kind) in refs {
            let from_id = enclosing_symbol_id(node, &def_symbol_ids)
                .unwrap_or_else(|| file.path.clone());
            for target in handler.expand_reference(node, source) {
                analysis.relations.push(UnresolvedRelation {
                    from_id: from_id.clone(),
                    to_name: target,
                    kind,
                });
            }
        }

        analysis
    })
}

/// Walk up from a reference site to the nearest captured definition that
/// produced a symbol; fall back to the file itself.
fn enclosing_symbol_id(node: Node, def_symbol_ids: &HashMap<usize, String>) -> Option<String> {
    let mut current = node.parent();
    while let Some(n) = current {
        if let Some(id) = def_symbol_ids.get(&n.id()) {
            return Some(id.clone());
        }
        current = n.parent();
    }
    None
}

fn inside_function(handler: &dyn LanguageHandler, node: Node) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if handler.is_function_scope(n.kind()) {
            return true;
        }
        current = n.parent();
    }
    false
}

fn is_default_export(node: Node, source: &[u8]) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n.kind() == "export_statement" {
            let mut cursor = n.walk();
            return n
                .children(&mut cursor)
                .any(|c| node_text(c, source) == "default");
        }
        current = n.parent();
    }
    false
}

/// Pair each auxiliary capture with the tree-sitter node id of the smallest
/// definition capture whose byte range contains it. Captures outside every
/// definition are dropped.
fn associate_aux<'t>(
    defs: &[(Node<'t>, NodeKind)],
    aux: &[(Node<'t>, AuxKind)],
) -> Vec<(usize, Node<'t>, AuxKind)> {
    let mut out = Vec::new();
    for (aux_node, aux_kind) in aux {
        let range = aux_node.byte_range();
        let owner = defs
            .iter()
            .filter(|(def, _)| {
                let dr = def.byte_range();
                dr.start <= range.start && range.end <= dr.end
            })
            .min_by_key(|(def, _)| def.byte_range().len());
        if let Some((owner, _)) = owner {
            out.push((owner.id(), *aux_node, *aux_kind));
        }
    }
    out
}

fn apply_aux(
    handler: &dyn LanguageHandler,
    node: &mut CodeNode,
    aux_node: Node,
    aux_kind: AuxKind,
    source: &[u8],
) {
    match aux_kind {
        AuxKind::QualifierAsync => node.is_async = true,
        AuxKind::QualifierStatic => node.is_static = true,
        AuxKind::QualifierThrows => node.can_throw = true,
        AuxKind::QualifierVisibility => {
            if node.visibility.is_none() {
                node.visibility = Some(parse_visibility(node_text(aux_node, source)));
            }
        }
        AuxKind::Parameters => {
            if node.kind.is_scope() && node.parameters.is_empty() {
                node.parameters = handler.parse_parameters(node_text(aux_node, source));
            }
        }
        AuxKind::ReturnType => {
            if node.kind.is_scope() && node.return_type.is_none() {
                let text = node_text(aux_node, source)
                    .trim()
                    .trim_start_matches(':')
                    .trim_start_matches("->")
                    .trim();
                if !text.is_empty() {
                    node.return_type = Some(text.to_string());
                }
            }
        }
    }
}

fn parse_visibility(text: &str) -> Visibility {
    match text.trim() {
        "private" => Visibility::Private,
        "protected" => Visibility::Protected,
        _ => Visibility::Public,
    }
}

/// Cut a definition's raw text down to its signature-shaped prefix.
fn cut_snippet(text: &str, rule: SnippetRule) -> String {
    let cut = match rule {
        SnippetRule::Brace => {
            let brace = text.find('{');
            let arrow = text.find("=>");
            match (brace, arrow) {
                (Some(b), Some(a)) => Some(b.min(a)),
                (Some(b), None) => Some(b),
                (None, Some(a)) => Some(a),
                (None, None) => text.find('\n'),
            }
        }
        SnippetRule::ColonOrNewline => {
            let colon = text.find(':').map(|i| i + 1);
            let newline = text.find('\n');
            match (colon, newline) {
                (Some(c), Some(n)) => Some(c.min(n)),
                (c, n) => c.or(n),
            }
        }
        SnippetRule::BraceOnly => text.find('{'),
    };
    match cut {
        Some(idx) => text[..idx].trim_end().to_string(),
        None => text.trim_end().to_string(),
    }
}

/// Classify which concerns a CSS rule touches from the properties it sets.
fn css_intents(rule_text: &str) -> Vec<CssIntent> {
    const LAYOUT: &[&str] = &[
        "display", "position", "top", "right", "bottom", "left", "float", "flex", "grid", "gap",
        "margin", "padding", "width", "height", "overflow", "z-index", "align", "justify",
    ];
    const TYPOGRAPHY: &[&str] = &[
        "font", "text", "line-height", "letter-spacing", "word", "white-space",
    ];
    let mut intents = Vec::new();
    let Some(body_start) = rule_text.find('{') else {
        return intents;
    };
    let body = rule_text[body_start + 1..].trim_end_matches('}');
    let mut seen = HashSet::new();
    for decl in body.split(';') {
        let Some((prop, _)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim();
        if prop.is_empty() {
            continue;
        }
        let intent = if LAYOUT.iter().any(|p| prop.starts_with(p)) {
            CssIntent::Layout
        } else if TYPOGRAPHY.iter().any(|p| prop.starts_with(p)) {
            CssIntent::Typography
        } else {
            CssIntent::Appearance
        };
        if seen.insert(intent) {
            intents.push(intent);
        }
    }
    intents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::language_for_path;

    fn analyze(path: &str, content: &str) -> FileAnalysis {
        let spec = language_for_path(path).expect("supported fixture extension");
        let file = FileInput {
            path: path.to_string(),
            content: content.to_string(),
        };
        analyze_file(&file, spec).expect("grammar must load")
    }

    fn node<'a>(analysis: &'a FileAnalysis, id: &str) -> &'a CodeNode {
        analysis
            .nodes
            .iter()
            .find(|n| n.id == id)
            .unwrap_or_else(|| {
                panic!(
                    "expected node {id}; got {:?}",
                    analysis.nodes.iter().map(|n| &n.id).collect::<Vec<_>>()
                )
            })
    }

    #[test]
    fn test_ts_function_and_arrow() {
        let a = analyze(
            "src/main.ts",
            "export function hello(): string { return 'hi'; }\nexport const greet = (n: string) => n;\n",
        );
        let hello = node(&a, "src/main.ts#hello");
        assert_eq!(hello.kind, NodeKind::Function);
        assert_eq!(hello.return_type.as_deref(), Some("string"));
        assert!(hello.parameters.is_empty());
        assert!(!hello.code_snippet.contains("return"), "snippet must not carry the body");

        let greet = node(&a, "src/main.ts#greet");
        assert_eq!(greet.kind, NodeKind::ArrowFunction);
        assert_eq!(greet.parameters.len(), 1);
        assert_eq!(greet.parameters[0].name, "n");
        assert_eq!(greet.parameters[0].ty.as_deref(), Some("string"));
    }

    #[test]
    fn test_ts_variable_owned_by_arrow_capture() {
        let a = analyze("a.ts", "export const fetchUser = async () => { return 1; };\n");
        let n = node(&a, "a.ts#fetchUser");
        assert_eq!(n.kind, NodeKind::ArrowFunction);
        assert!(n.is_async);
        // Exactly one node: the variable capture was skipped.
        assert_eq!(a.nodes.len(), 1);
    }

    #[test]
    fn test_ts_class_members_qualified() {
        let a = analyze(
            "a.ts",
            "export class Main {\n  private count: number = 0;\n  constructor() {}\n  log(): void {}\n}\n",
        );
        assert_eq!(node(&a, "a.ts#Main").kind, NodeKind::Class);
        assert_eq!(node(&a, "a.ts#Main.log").kind, NodeKind::Method);
        assert_eq!(
            node(&a, "a.ts#Main.constructor").kind,
            NodeKind::Constructor
        );
        let field = node(&a, "a.ts#Main.count");
        assert_eq!(field.kind, NodeKind::Field);
        assert_eq!(field.visibility, Some(Visibility::Private));
    }

    #[test]
    fn test_duplicate_class_suppresses_members_keeps_class() {
        let a = analyze(
            "a.ts",
            "class Twin { one() {} }\nclass Twin { two() {} }\n",
        );
        assert!(a.nodes.iter().any(|n| n.id == "a.ts#Twin"));
        assert!(
            !a.nodes.iter().any(|n| n.id.contains("Twin.")),
            "members of a duplicated class must be skipped"
        );
        assert_eq!(
            a.nodes.iter().filter(|n| n.id == "a.ts#Twin").count(),
            1,
            "first class capture wins"
        );
    }

    #[test]
    fn test_anonymous_default_export() {
        let a = analyze("a.ts", "export default () => 42;\n");
        let n = node(&a, "a.ts#default");
        assert_eq!(n.name, "default");
    }

    #[test]
    fn test_local_variables_not_emitted() {
        let a = analyze(
            "a.ts",
            "export function outer() {\n  const local = 1;\n  return local;\n}\n",
        );
        assert!(a.nodes.iter().any(|n| n.id == "a.ts#outer"));
        assert!(
            !a.nodes.iter().any(|n| n.id == "a.ts#local"),
            "function-local variables are not top-level symbols"
        );
    }

    #[test]
    fn test_ts_inheritance_and_call_relations() {
        let a = analyze(
            "a.ts",
            "import { Base } from './base';\nexport class Main extends Base implements ILog {\n  log() { this.write(); }\n}\n",
        );
        let rel = |kind: RelationKind, to: &str| {
            a.relations
                .iter()
                .find(|r| r.kind == kind && r.to_name == to)
                .unwrap_or_else(|| panic!("missing relation {kind:?} -> {to}"))
                .clone()
        };
        assert_eq!(rel(RelationKind::Imports, "./base").from_id, "a.ts");
        assert_eq!(rel(RelationKind::Inheritance, "Base").from_id, "a.ts#Main");
        assert_eq!(rel(RelationKind::Implementation, "ILog").from_id, "a.ts#Main");
        assert_eq!(rel(RelationKind::Call, "write").from_id, "a.ts#Main.log");
    }

    #[test]
    fn test_generic_arguments_stripped_from_targets() {
        let a = analyze(
            "a.ts",
            "export class Repo extends Base<User> {}\n",
        );
        assert!(
            a.relations
                .iter()
                .any(|r| r.kind == RelationKind::Inheritance && r.to_name == "Base"),
            "generic arguments must be stripped"
        );
    }

    #[test]
    fn test_python_members_and_relative_import() {
        let a = analyze(
            "src/models/user.py",
            "from .base import Base\n\nclass User(Base):\n    table = 'users'\n    def __init__(self):\n        pass\n    def save(self):\n        pass\n",
        );
        assert_eq!(node(&a, "src/models/user.py#User").kind, NodeKind::Class);
        assert_eq!(
            node(&a, "src/models/user.py#User.save").kind,
            NodeKind::Method
        );
        assert_eq!(
            node(&a, "src/models/user.py#User.__init__").kind,
            NodeKind::Constructor
        );
        assert_eq!(
            node(&a, "src/models/user.py#User.table").kind,
            NodeKind::Field
        );
        assert!(a.relations.iter().any(|r| {
            r.kind == RelationKind::Imports && r.to_name == ".base"
        }));
        assert!(a.relations.iter().any(|r| {
            r.kind == RelationKind::Inheritance
                && r.to_name == "Base"
                && r.from_id == "src/models/user.py#User"
        }));
    }

    #[test]
    fn test_python_snippet_cut_at_colon() {
        let a = analyze("m.py", "def compute(a, b):\n    return a + b\n");
        let n = node(&a, "m.py#compute");
        assert_eq!(n.code_snippet, "def compute(a, b):");
    }

    #[test]
    fn test_rust_mod_and_calls() {
        let a = analyze(
            "src/main.rs",
            "mod utils;\nuse utils::helper;\n\nfn main() {\n    helper();\n}\n",
        );
        assert_eq!(node(&a, "src/main.rs#main").kind, NodeKind::Function);
        let imports: Vec<_> = a
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Imports)
            .map(|r| r.to_name.as_str())
            .collect();
        assert!(imports.contains(&"utils"), "mod decl imports: {imports:?}");
        assert!(
            a.relations
                .iter()
                .any(|r| r.kind == RelationKind::Call
                    && r.to_name == "helper"
                    && r.from_id == "src/main.rs#main")
        );
    }

    #[test]
    fn test_rust_inline_mod_is_not_an_import() {
        let a = analyze("src/lib.rs", "mod inner {\n    pub fn f() {}\n}\n");
        assert!(
            !a.relations
                .iter()
                .any(|r| r.kind == RelationKind::Imports && r.to_name == "inner")
        );
    }

    #[test]
    fn test_rust_impl_methods_qualified() {
        let a = analyze(
            "src/point.rs",
            "pub struct Point { x: f64 }\n\nimpl Point {\n    pub fn len(&self) -> f64 { self.x }\n}\n",
        );
        assert_eq!(node(&a, "src/point.rs#Point").kind, NodeKind::Struct);
        let m = node(&a, "src/point.rs#Point.len");
        assert_eq!(m.kind, NodeKind::Method);
        assert_eq!(m.visibility, Some(Visibility::Public));
    }

    #[test]
    fn test_go_receiver_methods() {
        let a = analyze(
            "server.go",
            "package main\n\ntype Server struct{}\n\nfunc (s *Server) Start(addr string) {}\n",
        );
        assert_eq!(node(&a, "server.go#Server").kind, NodeKind::Struct);
        let m = node(&a, "server.go#Server.Start");
        assert_eq!(m.kind, NodeKind::Method);
    }

    #[test]
    fn test_css_rule_selector_and_intents() {
        let a = analyze(
            "style.css",
            ".btn {\n  display: flex;\n  color: red;\n}\n",
        );
        let rule = &a.nodes[0];
        assert_eq!(rule.kind, NodeKind::CssRule);
        assert_eq!(rule.css_selector.as_deref(), Some(".btn"));
        assert!(rule.css_intents.contains(&CssIntent::Layout));
        assert!(rule.css_intents.contains(&CssIntent::Appearance));
        assert!(!rule.code_snippet.contains("display"), "snippet cut at brace");
    }

    #[test]
    fn test_html_element_and_class_references() {
        let a = analyze(
            "index.html",
            "<html><body><div class=\"btn primary\" id=\"app\">x</div><span>plain</span></body></html>",
        );
        let div = a
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::HtmlElement)
            .expect("div with class must be captured");
        assert_eq!(div.html_tag.as_deref(), Some("div"));
        assert!(div.id.contains(':'), "html element ids carry the line: {}", div.id);
        assert!(
            !a.nodes.iter().any(|n| n.html_tag.as_deref() == Some("span")),
            "attribute-less elements are skipped"
        );
        let targets: Vec<_> = a
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Reference)
            .map(|r| r.to_name.as_str())
            .collect();
        assert!(targets.contains(&".btn"), "targets: {targets:?}");
        assert!(targets.contains(&".primary"));
        assert!(targets.contains(&"#app"));
    }

    #[test]
    fn test_unparseable_content_yields_empty_analysis() {
        // Tree-sitter is error-tolerant, so feed it bytes that survive as
        // pure ERROR nodes; the analysis must simply come back empty.
        let a = analyze("weird.ts", "\u{0}\u{1}\u{2}%%%");
        assert!(a.nodes.is_empty());
    }

    #[test]
    fn test_determinism_same_input_same_output() {
        let src = "export class A {}\nexport function b() {}\nconst c = () => 1;\n";
        let first = analyze("d.ts", src);
        let second = analyze("d.ts", src);
        let ids = |a: &FileAnalysis| a.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.relations.len(), second.relations.len());
    }

    #[test]
    fn test_cut_snippet_rules() {
        assert_eq!(
            cut_snippet("fn main() { body }", SnippetRule::Brace),
            "fn main()"
        );
        assert_eq!(
            cut_snippet("const f = (x) => x + 1", SnippetRule::Brace),
            "const f = (x)"
        );
        assert_eq!(
            cut_snippet("class User:\n    pass", SnippetRule::ColonOrNewline),
            "class User:"
        );
        assert_eq!(cut_snippet("x = 1\ny = 2", SnippetRule::ColonOrNewline), "x = 1");
    }
}
