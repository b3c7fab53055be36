//! Markdown rendering of a ranked code graph.
//!
//! The renderer is a pure function of `(RankedCodeGraph, RenderOptions)`:
//! no clock, no filesystem, no environment. Section order is fixed; every
//! list is sorted (rank descending, then path) so output is reproducible
//! byte-for-byte.

use std::collections::HashMap;
use std::fmt::Write;

use serde::Deserialize;

use crate::graph::{EdgeKind, NodeKind, RankedCodeGraph};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SymbolDetailOptions {
    pub include_relations: bool,
    pub include_line_number: bool,
    pub include_code_snippet: bool,
    pub max_relations_to_show: usize,
}

impl Default for SymbolDetailOptions {
    fn default() -> Self {
        Self {
            include_relations: true,
            include_line_number: true,
            include_code_snippet: true,
            max_relations_to_show: 3,
        }
    }
}

/// Recognized renderer options. Unknown fields in a config file are ignored
/// rather than rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    pub include_header: bool,
    pub include_overview: bool,
    pub include_mermaid_graph: bool,
    pub include_file_list: bool,
    pub include_symbol_details: bool,
    pub top_file_count: usize,
    pub file_section_separator: String,
    pub custom_header: Option<String>,
    pub symbol_detail_options: SymbolDetailOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            include_overview: true,
            include_mermaid_graph: true,
            include_file_list: true,
            include_symbol_details: true,
            top_file_count: 10,
            file_section_separator: "---".to_string(),
            custom_header: None,
            symbol_detail_options: SymbolDetailOptions::default(),
        }
    }
}

/// Render the ranked graph as a Markdown document.
pub fn render_markdown(ranked: &RankedCodeGraph, options: &RenderOptions) -> String {
    let mut out = String::new();
    let files = ranked_files(ranked);

    if options.include_header {
        match &options.custom_header {
            Some(header) => writeln!(out, "{header}").unwrap(),
            None => writeln!(out, "# Repository Map").unwrap(),
        }
        out.push('\n');
    }

    if options.include_overview {
        render_overview(ranked, &mut out);
    }

    if options.include_mermaid_graph {
        render_mermaid(ranked, &files, options.top_file_count, &mut out);
    }

    if options.include_file_list {
        render_file_list(ranked, &files, options.top_file_count, &mut out);
    }

    if options.include_symbol_details {
        render_symbol_details(ranked, &files, options, &mut out);
    }

    out
}

/// File ids sorted by rank descending, ties broken by path for stability.
fn ranked_files(ranked: &RankedCodeGraph) -> Vec<String> {
    let mut files: Vec<String> = ranked
        .graph
        .nodes()
        .filter(|n| n.kind == NodeKind::File)
        .map(|n| n.id.clone())
        .collect();
    files.sort_by(|a, b| {
        let ra = ranked.ranks.get(a).copied().unwrap_or(0.0);
        let rb = ranked.ranks.get(b).copied().unwrap_or(0.0);
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });
    files
}

fn render_overview(ranked: &RankedCodeGraph, out: &mut String) {
    let graph = &ranked.graph;
    writeln!(out, "## Overview").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "{} files, {} symbols, {} relationships.",
        graph.file_count(),
        graph.symbol_count(),
        graph.edge_count()
    )
    .unwrap();
    let mut kinds: Vec<(NodeKind, usize)> = graph
        .nodes_by_kind()
        .into_iter()
        .filter(|(kind, _)| *kind != NodeKind::File)
        .collect();
    kinds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.label().cmp(b.0.label())));
    if !kinds.is_empty() {
        writeln!(out).unwrap();
        for (kind, count) in kinds {
            writeln!(out, "- {}: {}", kind.label(), count).unwrap();
        }
    }
    out.push('\n');
}

/// Mermaid quoting: double quotes inside labels break the flowchart syntax.
fn escape_mermaid_label(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_mermaid(
    ranked: &RankedCodeGraph,
    files: &[String],
    top_count: usize,
    out: &mut String,
) {
    let visible: Vec<&String> = files.iter().take(top_count).collect();
    if visible.is_empty() {
        return;
    }
    let index: HashMap<&str, usize> = visible
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    writeln!(out, "## Module Graph").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "```mermaid").unwrap();
    writeln!(out, "graph TD").unwrap();
    for (i, id) in visible.iter().enumerate() {
        writeln!(out, "    f{i}[\"{}\"]", escape_mermaid_label(id)).unwrap();
    }
    let mut edges: Vec<(usize, usize)> = ranked
        .graph
        .edge_triples()
        .into_iter()
        .filter(|(_, _, kind)| *kind == EdgeKind::Imports)
        .filter_map(|(from, to, _)| Some((*index.get(from)?, *index.get(to)?)))
        .collect();
    edges.sort();
    edges.dedup();
    for (from, to) in edges {
        writeln!(out, "    f{from} --> f{to}").unwrap();
    }
    writeln!(out, "```").unwrap();
    out.push('\n');
}

fn render_file_list(
    ranked: &RankedCodeGraph,
    files: &[String],
    top_count: usize,
    out: &mut String,
) {
    writeln!(out, "## Top Files").unwrap();
    writeln!(out).unwrap();
    for (i, id) in files.iter().take(top_count).enumerate() {
        let rank = ranked.ranks.get(id).copied().unwrap_or(0.0);
        writeln!(out, "{}. `{}` ({rank:.3})", i + 1, id).unwrap();
    }
    out.push('\n');
}

fn render_symbol_details(
    ranked: &RankedCodeGraph,
    files: &[String],
    options: &RenderOptions,
    out: &mut String,
) {
    let detail = &options.symbol_detail_options;

    // Outgoing symbol relations, grouped once for the whole document.
    let mut relations: HashMap<&str, Vec<(EdgeKind, &str)>> = HashMap::new();
    for (from, to, kind) in ranked.graph.edge_triples() {
        if kind != EdgeKind::Imports {
            relations.entry(from).or_default().push((kind, to));
        }
    }

    writeln!(out, "## Files").unwrap();
    for file_id in files {
        let mut symbols: Vec<_> = ranked
            .graph
            .nodes()
            .filter(|n| n.kind != NodeKind::File && n.file_path == *file_id)
            .collect();
        symbols.sort_by_key(|n| (n.start_line, n.id.clone()));

        writeln!(out).unwrap();
        writeln!(out, "{}", options.file_section_separator).unwrap();
        writeln!(out).unwrap();
        writeln!(out, "### {file_id}").unwrap();
        if symbols.is_empty() {
            continue;
        }
        writeln!(out).unwrap();
        for symbol in symbols {
            let mut line = format!("- **{}** ({})", symbol.name, symbol.kind.label());
            if detail.include_line_number {
                write!(line, " L{}", symbol.start_line).unwrap();
            }
            if detail.include_code_snippet && !symbol.code_snippet.is_empty() {
                write!(line, " — `{}`", symbol.code_snippet.replace('`', "'")).unwrap();
            }
            writeln!(out, "{line}").unwrap();
            if detail.include_relations
                && let Some(rels) = relations.get(symbol.id.as_str())
            {
                for (kind, to) in rels.iter().take(detail.max_relations_to_show) {
                    writeln!(out, "  - {} `{}`", kind.label(), to).unwrap();
                }
                let hidden = rels.len().saturating_sub(detail.max_relations_to_show);
                if hidden > 0 {
                    writeln!(out, "  - (+{hidden} more)").unwrap();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CodeGraph, CodeNode, RankedCodeGraph};

    fn ranked_fixture() -> RankedCodeGraph {
        let mut g = CodeGraph::new();
        g.add_node(CodeNode::file("src/hub.ts", Some("typescript")));
        g.add_node(CodeNode::file("src/a.ts", Some("typescript")));
        g.add_node(CodeNode::symbol(
            "src/hub.ts#run".to_string(),
            NodeKind::Function,
            "run".to_string(),
            "src/hub.ts",
            3,
            5,
            "export function run()".to_string(),
        ));
        g.add_edge("src/a.ts", "src/hub.ts", EdgeKind::Imports);
        let ranks = [
            ("src/hub.ts".to_string(), 1.0),
            ("src/a.ts".to_string(), 0.4),
            ("src/hub.ts#run".to_string(), 0.2),
        ]
        .into_iter()
        .collect();
        RankedCodeGraph { graph: g, ranks }
    }

    #[test]
    fn test_render_contains_all_sections() {
        let doc = render_markdown(&ranked_fixture(), &RenderOptions::default());
        assert!(doc.contains("# Repository Map"));
        assert!(doc.contains("## Overview"));
        assert!(doc.contains("```mermaid"));
        assert!(doc.contains("## Top Files"));
        assert!(doc.contains("### src/hub.ts"));
        assert!(doc.contains("**run** (fn)"));
    }

    #[test]
    fn test_sections_can_be_disabled() {
        let options = RenderOptions {
            include_header: false,
            include_overview: false,
            include_mermaid_graph: false,
            include_file_list: false,
            include_symbol_details: false,
            ..RenderOptions::default()
        };
        let doc = render_markdown(&ranked_fixture(), &options);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_custom_header_overrides_builtin() {
        let options = RenderOptions {
            custom_header: Some("# My Project".to_string()),
            ..RenderOptions::default()
        };
        let doc = render_markdown(&ranked_fixture(), &options);
        assert!(doc.contains("# My Project"));
        assert!(!doc.contains("# Repository Map"));
    }

    #[test]
    fn test_files_ordered_by_rank() {
        let doc = render_markdown(&ranked_fixture(), &RenderOptions::default());
        let hub = doc.find("1. `src/hub.ts`").expect("hub listed first");
        let a = doc.find("2. `src/a.ts`").expect("a listed second");
        assert!(hub < a);
    }

    #[test]
    fn test_renderer_is_pure() {
        let ranked = ranked_fixture();
        let options = RenderOptions::default();
        assert_eq!(
            render_markdown(&ranked, &options),
            render_markdown(&ranked, &options)
        );
    }

    #[test]
    fn test_top_file_count_limits_mermaid_and_list() {
        let options = RenderOptions {
            top_file_count: 1,
            ..RenderOptions::default()
        };
        let doc = render_markdown(&ranked_fixture(), &options);
        assert!(doc.contains("f0[\"src/hub.ts\"]"));
        assert!(!doc.contains("src/a.ts\"]"), "only the top file appears in the graph");
        assert!(!doc.contains("2. `src/a.ts`"));
    }

    #[test]
    fn test_unknown_config_fields_ignored() {
        let options: RenderOptions =
            toml::from_str("top-file-count = 5\nfuture-flag = true\n").unwrap();
        assert_eq!(options.top_file_count, 5);
    }
}
