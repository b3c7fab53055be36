pub mod handlers;
mod queries;

use tree_sitter::Language;

pub use handlers::{ComplexOutcome, LanguageHandler, handler_for};

/// How the analyzer cuts a definition's raw text down to a signature-shaped
/// snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetRule {
    /// Cut at the first `{` or `=>`; fall back to the first line.
    Brace,
    /// Cut at the first `:` or newline (Python-style suites).
    ColonOrNewline,
    /// Cut at the first `{` only (CSS rule bodies, HTML has no bodies).
    BraceOnly,
}

/// One row of the language registry: everything the engine needs to analyze
/// files of a language. Adding a language means adding a row here (and a
/// handler when the defaults don't fit); no other component changes.
pub struct LanguageSpec {
    /// Registry name; also the `language` value recorded on file nodes and
    /// the key used to look up the handler.
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub grammar: fn() -> Language,
    /// Capture query in the shared vocabulary (see [`queries`]).
    pub query: &'static str,
    pub snippet: SnippetRule,
}

pub static LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        name: "typescript",
        extensions: &["ts", "mts", "cts"],
        grammar: || tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        query: queries::TYPESCRIPT,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "tsx",
        extensions: &["tsx"],
        grammar: || tree_sitter_typescript::LANGUAGE_TSX.into(),
        query: queries::TYPESCRIPT,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "javascript",
        extensions: &["js", "jsx", "mjs", "cjs"],
        grammar: || tree_sitter_javascript::LANGUAGE.into(),
        query: queries::JAVASCRIPT,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "python",
        extensions: &["py"],
        grammar: || tree_sitter_python::LANGUAGE.into(),
        query: queries::PYTHON,
        snippet: SnippetRule::ColonOrNewline,
    },
    LanguageSpec {
        name: "go",
        extensions: &["go"],
        grammar: || tree_sitter_go::LANGUAGE.into(),
        query: queries::GO,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "rust",
        extensions: &["rs"],
        grammar: || tree_sitter_rust::LANGUAGE.into(),
        query: queries::RUST,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "java",
        extensions: &["java"],
        grammar: || tree_sitter_java::LANGUAGE.into(),
        query: queries::JAVA,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "csharp",
        extensions: &["cs"],
        grammar: || tree_sitter_c_sharp::LANGUAGE.into(),
        query: queries::C_SHARP,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "c",
        extensions: &["c", "h"],
        grammar: || tree_sitter_c::LANGUAGE.into(),
        query: queries::C,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "cpp",
        extensions: &["cpp", "cc", "cxx", "hpp", "hh"],
        grammar: || tree_sitter_cpp::LANGUAGE.into(),
        query: queries::CPP,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "php",
        extensions: &["php"],
        grammar: || tree_sitter_php::LANGUAGE_PHP.into(),
        query: queries::PHP,
        snippet: SnippetRule::Brace,
    },
    LanguageSpec {
        name: "css",
        extensions: &["css"],
        grammar: || tree_sitter_css::LANGUAGE.into(),
        query: queries::CSS,
        snippet: SnippetRule::BraceOnly,
    },
    LanguageSpec {
        name: "html",
        extensions: &["html", "htm"],
        grammar: || tree_sitter_html::LANGUAGE.into(),
        query: queries::HTML,
        snippet: SnippetRule::BraceOnly,
    },
];

/// Look up the registry row for a file path by extension (case-insensitive).
/// Pure function of the path; unsupported extensions return `None`.
pub fn language_for_path(path: &str) -> Option<&'static LanguageSpec> {
    let ext = path.rsplit('.').next()?.to_ascii_lowercase();
    if !path.contains('.') {
        return None;
    }
    LANGUAGES
        .iter()
        .find(|spec| spec.extensions.contains(&ext.as_str()))
}
