use serde::Serialize;

/// The kind of directed edge between two nodes in the code graph.
///
/// `Imports` edges always connect two file nodes; every other kind connects
/// two symbol nodes. Edges are unique by `(from, to, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// File -> file: the source file imports the target file.
    Imports,
    /// Symbol -> symbol: call site inside the source symbol targets the callee.
    Calls,
    /// Symbol -> symbol: class/struct extends the target.
    Inherits,
    /// Symbol -> symbol: class implements the target interface/trait.
    Implements,
    /// Symbol -> symbol: any other name reference (type annotations,
    /// CSS class usage from HTML, ...).
    Reference,
}

impl EdgeKind {
    /// Arrow annotation used by the renderer's relation summaries.
    pub fn label(&self) -> &'static str {
        match self {
            EdgeKind::Imports => "imports",
            EdgeKind::Calls => "calls",
            EdgeKind::Inherits => "inherits",
            EdgeKind::Implements => "implements",
            EdgeKind::Reference => "references",
        }
    }
}
