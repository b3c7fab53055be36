//! Second analysis phase: resolve unresolved relations to graph edges.
//!
//! Import relations resolve first (through the language handlers' path
//! heuristics) because the name lookup consults the resulting file→file
//! edges. Every non-import relation then runs the fixed 4-step lookup; the
//! ordering is a deliberate precision/recall tradeoff and must not change:
//! same file → imported files → CSS selector → global type-like heuristic.
//! A miss is not an error — it is the absence of an edge.

use std::collections::HashMap;

use crate::analyzer::{RelationKind, UnresolvedRelation};
use crate::graph::{CodeGraph, EdgeKind, NodeKind};
use crate::lang::{handler_for, language_for_path};

/// Resolve all relations against the completed node table, adding edges in
/// place. Edges deduplicate by `(from, to, kind)`; self-edges are dropped.
pub fn resolve(graph: &mut CodeGraph, relations: &[UnresolvedRelation], all_files: &[String]) {
    // Phase 1: imports. These are first-class edges and feed step 2 below.
    for rel in relations.iter().filter(|r| r.kind == RelationKind::Imports) {
        let Some(spec) = language_for_path(&rel.from_id) else {
            continue;
        };
        let handler = handler_for(spec.name);
        if let Some(target) = handler.resolve_import(&rel.from_id, &rel.to_name, all_files) {
            graph.add_edge(&rel.from_id, &target, EdgeKind::Imports);
        } else {
            tracing::debug!(from = %rel.from_id, import = %rel.to_name, "import not resolved");
        }
    }

    // Name and selector indexes, in node insertion order so lookups are
    // deterministic.
    let mut by_name: HashMap<String, Vec<String>> = HashMap::new();
    let mut by_selector: HashMap<String, String> = HashMap::new();
    for node in graph.nodes() {
        if node.kind == NodeKind::File {
            continue;
        }
        by_name
            .entry(node.name.clone())
            .or_default()
            .push(node.id.clone());
        if node.kind == NodeKind::CssRule
            && let Some(selector) = &node.css_selector
        {
            by_selector
                .entry(selector.clone())
                .or_insert_with(|| node.id.clone());
        }
    }

    // Phase 2: everything else.
    for rel in relations.iter().filter(|r| r.kind != RelationKind::Imports) {
        let Some(edge_kind) = edge_kind_for(rel.kind) else {
            continue;
        };
        if let Some(target) = lookup(graph, &by_name, &by_selector, rel) {
            graph.add_edge(&rel.from_id, &target, edge_kind);
        }
    }
}

fn edge_kind_for(kind: RelationKind) -> Option<EdgeKind> {
    match kind {
        RelationKind::Inheritance => Some(EdgeKind::Inherits),
        RelationKind::Implementation => Some(EdgeKind::Implements),
        RelationKind::Call => Some(EdgeKind::Calls),
        RelationKind::Reference => Some(EdgeKind::Reference),
        RelationKind::Imports => None,
    }
}

/// The 4-step target lookup for a name referenced from `rel.from_id`.
fn lookup(
    graph: &CodeGraph,
    by_name: &HashMap<String, Vec<String>>,
    by_selector: &HashMap<String, String>,
    rel: &UnresolvedRelation,
) -> Option<String> {
    let context_file = rel
        .from_id
        .split_once('#')
        .map(|(file, _)| file)
        .unwrap_or(&rel.from_id);
    let name = &rel.to_name;

    // 1. Same file.
    let local = format!("{context_file}#{name}");
    if graph.contains(&local) {
        return Some(local);
    }

    // 2. Imported files, first hit in import-insertion order.
    for imported in graph.imported_files(context_file) {
        let candidate = format!("{imported}#{name}");
        if graph.contains(&candidate) {
            return Some(candidate);
        }
    }

    // 3. CSS selector match.
    if let Some(rule_id) = by_selector.get(name) {
        return Some(rule_id.clone());
    }

    // 4. Global heuristic, restricted to type-like symbols.
    if let Some(candidates) = by_name.get(name) {
        for id in candidates {
            if graph.node(id).map(|n| n.kind.is_type_like()).unwrap_or(false) {
                return Some(id.clone());
            }
        }
    }

    None
}
