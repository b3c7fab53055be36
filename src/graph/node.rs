use serde::Serialize;

/// The kind of node in the code graph.
///
/// `File` nodes are created eagerly for every discovered file; all other
/// kinds are symbol nodes produced by the analyzer's definition pass. The
/// variant names mirror the capture prefixes used in the language registry
/// queries (`function.definition`, `css_rule.definition`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Class,
    Interface,
    Function,
    ArrowFunction,
    Method,
    Constructor,
    Field,
    Property,
    Variable,
    Constant,
    Static,
    Type,
    Enum,
    Struct,
    Union,
    Trait,
    Impl,
    Namespace,
    Template,
    HtmlElement,
    CssRule,
}

impl NodeKind {
    /// Map a capture prefix (the part before `.definition`) to a node kind.
    pub fn from_capture_prefix(prefix: &str) -> Option<NodeKind> {
        match prefix {
            "file" => Some(NodeKind::File),
            "class" => Some(NodeKind::Class),
            "interface" => Some(NodeKind::Interface),
            "function" => Some(NodeKind::Function),
            "arrow_function" => Some(NodeKind::ArrowFunction),
            "method" => Some(NodeKind::Method),
            "constructor" => Some(NodeKind::Constructor),
            "field" => Some(NodeKind::Field),
            "property" => Some(NodeKind::Property),
            "variable" => Some(NodeKind::Variable),
            "constant" => Some(NodeKind::Constant),
            "static" => Some(NodeKind::Static),
            "type" => Some(NodeKind::Type),
            "enum" => Some(NodeKind::Enum),
            "struct" => Some(NodeKind::Struct),
            "union" => Some(NodeKind::Union),
            "trait" => Some(NodeKind::Trait),
            "impl" => Some(NodeKind::Impl),
            "namespace" => Some(NodeKind::Namespace),
            "template" => Some(NodeKind::Template),
            "html_element" => Some(NodeKind::HtmlElement),
            "css_rule" => Some(NodeKind::CssRule),
            _ => None,
        }
    }

    /// Short display label used by the renderer.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Function => "fn",
            NodeKind::ArrowFunction => "fn",
            NodeKind::Method => "method",
            NodeKind::Constructor => "constructor",
            NodeKind::Field => "field",
            NodeKind::Property => "property",
            NodeKind::Variable => "var",
            NodeKind::Constant => "const",
            NodeKind::Static => "static",
            NodeKind::Type => "type",
            NodeKind::Enum => "enum",
            NodeKind::Struct => "struct",
            NodeKind::Union => "union",
            NodeKind::Trait => "trait",
            NodeKind::Impl => "impl",
            NodeKind::Namespace => "namespace",
            NodeKind::Template => "template",
            NodeKind::HtmlElement => "element",
            NodeKind::CssRule => "rule",
        }
    }

    /// True for kinds that define a callable/containing scope. Used by the
    /// enclosing-symbol walk and the local-variable skip rule.
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::Function
                | NodeKind::ArrowFunction
                | NodeKind::Method
                | NodeKind::Constructor
        )
    }

    /// True for the type-like kinds preferred by the resolver's global
    /// fallback (classes over methods reduces homonym ambiguity).
    pub fn is_type_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Function
                | NodeKind::Interface
                | NodeKind::Struct
                | NodeKind::Type
                | NodeKind::Enum
        )
    }
}

/// Symbol visibility, when the language surface declares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

/// Coarse purpose classification for a CSS rule, derived from the properties
/// it sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CssIntent {
    Layout,
    Typography,
    Appearance,
}

/// One entry of a function/method parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Declared type when the language carries one; `None` for untyped
    /// parameters (plain JS, Python without annotations).
    pub ty: Option<String>,
}

/// A node in the code graph.
///
/// Identity lives in `id`: for files the POSIX-normalized path, for symbols
/// `<path>#<name>` (class members use `<path>#<Class>.<member>`, HTML
/// elements append `:<line>`). The id prefix of every symbol names an
/// existing file node.
#[derive(Debug, Clone, Serialize)]
pub struct CodeNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub file_path: String,
    /// 1-based line numbers of the definition's extent.
    pub start_line: usize,
    pub end_line: usize,
    /// Signature-shaped prefix of the definition. Never includes the body:
    /// cut at the first `{` or `=>` (brace languages) or at the first `:` or
    /// newline (Python-style); see the registry row for the per-language rule.
    pub code_snippet: String,
    pub visibility: Option<Visibility>,
    pub is_async: bool,
    pub is_static: bool,
    pub can_throw: bool,
    pub return_type: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Registry language name; set on file nodes only.
    pub language: Option<&'static str>,
    pub html_tag: Option<String>,
    pub css_selector: Option<String>,
    pub css_intents: Vec<CssIntent>,
}

impl CodeNode {
    /// A file node for `path`. `language` is `None` for unsupported files.
    pub fn file(path: &str, language: Option<&'static str>) -> Self {
        Self {
            id: path.to_string(),
            kind: NodeKind::File,
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            file_path: path.to_string(),
            start_line: 1,
            end_line: 1,
            code_snippet: String::new(),
            visibility: None,
            is_async: false,
            is_static: false,
            can_throw: false,
            return_type: None,
            parameters: Vec::new(),
            language,
            html_tag: None,
            css_selector: None,
            css_intents: Vec::new(),
        }
    }

    /// A bare symbol node; the analyzer fills qualifiers afterwards.
    pub fn symbol(
        id: String,
        kind: NodeKind,
        name: String,
        file_path: &str,
        start_line: usize,
        end_line: usize,
        code_snippet: String,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            file_path: file_path.to_string(),
            start_line,
            end_line,
            code_snippet,
            visibility: None,
            is_async: false,
            is_static: false,
            can_throw: false,
            return_type: None,
            parameters: Vec::new(),
            language: None,
            html_tag: None,
            css_selector: None,
            css_intents: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_prefix_round_trip() {
        for prefix in [
            "class",
            "function",
            "arrow_function",
            "method",
            "css_rule",
            "html_element",
        ] {
            assert!(
                NodeKind::from_capture_prefix(prefix).is_some(),
                "prefix {prefix} must map to a kind"
            );
        }
        assert_eq!(NodeKind::from_capture_prefix("banana"), None);
    }

    #[test]
    fn test_file_node_name_is_basename() {
        let node = CodeNode::file("src/models/user.py", Some("python"));
        assert_eq!(node.name, "user.py");
        assert_eq!(node.id, "src/models/user.py");
        assert_eq!(node.kind, NodeKind::File);
    }

    #[test]
    fn test_scope_kinds() {
        assert!(NodeKind::Method.is_scope());
        assert!(NodeKind::ArrowFunction.is_scope());
        assert!(!NodeKind::Class.is_scope());
        assert!(!NodeKind::File.is_scope());
    }
}
