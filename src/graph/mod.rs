pub mod edge;
pub mod node;

use std::collections::{HashMap, HashSet};

use petgraph::Directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

pub use edge::EdgeKind;
pub use node::{CodeNode, CssIntent, NodeKind, Parameter, Visibility};

/// The in-memory code graph: a directed petgraph StableGraph with an O(1)
/// id lookup table and a triple set enforcing edge uniqueness.
///
/// Node identity is the string id (`path` or `path#symbol`); insertion is
/// first-wins, so the table's contents are independent of the order in which
/// worker results arrive.
pub struct CodeGraph {
    pub graph: StableGraph<CodeNode, EdgeKind, Directed>,
    /// Maps node ids to their indices.
    ids: HashMap<String, NodeIndex>,
    /// Every edge triple already present, for O(1) de-duplication.
    edge_set: HashSet<(NodeIndex, NodeIndex, EdgeKind)>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            ids: HashMap::new(),
            edge_set: HashSet::new(),
        }
    }

    /// Insert a node. When the id is already present the existing node wins
    /// and its index is returned; the new node is dropped.
    pub fn add_node(&mut self, node: CodeNode) -> NodeIndex {
        if let Some(&existing) = self.ids.get(&node.id) {
            return existing;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.ids.insert(id, idx);
        idx
    }

    /// Insert an edge by node ids. Returns `false` (and adds nothing) when an
    /// endpoint is missing, the edge would be a self-loop, or the triple is
    /// already present.
    pub fn add_edge(&mut self, from_id: &str, to_id: &str, kind: EdgeKind) -> bool {
        let (Some(&from), Some(&to)) = (self.ids.get(from_id), self.ids.get(to_id)) else {
            return false;
        };
        if from == to {
            return false;
        }
        if !self.edge_set.insert((from, to, kind)) {
            return false;
        }
        self.graph.add_edge(from, to, kind);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&CodeNode> {
        self.ids.get(id).map(|&idx| &self.graph[idx])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &CodeNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// All edges as `(from_id, to_id, kind)` triples in insertion order.
    pub fn edge_triples(&self) -> Vec<(&str, &str, EdgeKind)> {
        let mut edges: Vec<_> = self.graph.edge_references().collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| {
                (
                    self.graph[e.source()].id.as_str(),
                    self.graph[e.target()].id.as_str(),
                    *e.weight(),
                )
            })
            .collect()
    }

    /// Files imported by `file_id`, in import-insertion order. The resolver
    /// relies on this ordering: the first importing hit wins.
    pub fn imported_files(&self, file_id: &str) -> Vec<String> {
        let Some(&idx) = self.ids.get(file_id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .filter(|e| *e.weight() == EdgeKind::Imports)
            .collect();
        // Edges iterate most-recent-first; sort by edge id to restore
        // insertion order.
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| self.graph[e.target()].id.clone())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn file_count(&self) -> usize {
        self.nodes().filter(|n| n.kind == NodeKind::File).count()
    }

    pub fn symbol_count(&self) -> usize {
        self.nodes().filter(|n| n.kind != NodeKind::File).count()
    }

    /// Symbol counts broken down by kind, for the overview section.
    pub fn nodes_by_kind(&self) -> HashMap<NodeKind, usize> {
        let mut map: HashMap<NodeKind, usize> = HashMap::new();
        for node in self.nodes() {
            *map.entry(node.kind).or_insert(0) += 1;
        }
        map
    }
}

impl Default for CodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// A code graph plus the rank assigned to each node id. Ranks are in [0, 1];
/// the node and edge sets are exactly those of the input graph.
pub struct RankedCodeGraph {
    pub graph: CodeGraph,
    pub ranks: HashMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_node(path: &str) -> CodeNode {
        CodeNode::file(path, Some("typescript"))
    }

    fn symbol_node(path: &str, name: &str, kind: NodeKind) -> CodeNode {
        CodeNode::symbol(
            format!("{path}#{name}"),
            kind,
            name.to_string(),
            path,
            1,
            1,
            String::new(),
        )
    }

    #[test]
    fn test_first_insertion_wins() {
        let mut g = CodeGraph::new();
        let first = symbol_node("a.ts", "foo", NodeKind::Function);
        let mut second = symbol_node("a.ts", "foo", NodeKind::Variable);
        second.start_line = 99;

        let idx1 = g.add_node(first);
        let idx2 = g.add_node(second);
        assert_eq!(idx1, idx2, "duplicate id must return the existing index");
        assert_eq!(g.node("a.ts#foo").unwrap().kind, NodeKind::Function);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_edge_requires_both_endpoints() {
        let mut g = CodeGraph::new();
        g.add_node(file_node("a.ts"));
        assert!(!g.add_edge("a.ts", "b.ts", EdgeKind::Imports));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_self_loop_dropped() {
        let mut g = CodeGraph::new();
        g.add_node(file_node("a.ts"));
        assert!(!g.add_edge("a.ts", "a.ts", EdgeKind::Imports));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_edge_dedup_is_idempotent() {
        let mut g = CodeGraph::new();
        g.add_node(file_node("a.ts"));
        g.add_node(file_node("b.ts"));
        assert!(g.add_edge("a.ts", "b.ts", EdgeKind::Imports));
        assert!(!g.add_edge("a.ts", "b.ts", EdgeKind::Imports));
        assert_eq!(g.edge_count(), 1);
        // A different kind between the same nodes is a distinct triple.
        g.add_node(symbol_node("a.ts", "A", NodeKind::Class));
        g.add_node(symbol_node("b.ts", "B", NodeKind::Class));
        assert!(g.add_edge("a.ts#A", "b.ts#B", EdgeKind::Inherits));
        assert!(g.add_edge("a.ts#A", "b.ts#B", EdgeKind::Reference));
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_imported_files_preserves_insertion_order() {
        let mut g = CodeGraph::new();
        for path in ["main.ts", "one.ts", "two.ts", "three.ts"] {
            g.add_node(file_node(path));
        }
        g.add_edge("main.ts", "one.ts", EdgeKind::Imports);
        g.add_edge("main.ts", "two.ts", EdgeKind::Imports);
        g.add_edge("main.ts", "three.ts", EdgeKind::Imports);
        assert_eq!(
            g.imported_files("main.ts"),
            vec!["one.ts", "two.ts", "three.ts"]
        );
    }
}
