//! Graph ranking: structural importance via PageRank, or churn via the
//! repository's change history. Exactly one strategy runs per invocation;
//! either way the node and edge sets pass through untouched and every rank
//! lands in [0, 1].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::visit::EdgeRef;

use crate::graph::{CodeGraph, NodeKind, RankedCodeGraph};

/// A rank assignment strategy. The engine consumes this as a pluggable
/// role; construct one with [`PageRankRanker::new`] or
/// [`GitChangesRanker::new`].
pub trait Ranker {
    fn rank(&self, graph: CodeGraph) -> RankedCodeGraph;
}

#[derive(Debug, Clone)]
pub struct PageRankConfig {
    pub damping: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Random-surfer PageRank with uniform teleport, so disconnected components
/// all receive positive mass; dangling nodes spread their mass uniformly.
pub struct PageRankRanker {
    config: PageRankConfig,
}

impl PageRankRanker {
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }
}

impl Ranker for PageRankRanker {
    fn rank(&self, graph: CodeGraph) -> RankedCodeGraph {
        let indices: Vec<_> = graph.graph.node_indices().collect();
        let n = indices.len();
        if n == 0 {
            return RankedCodeGraph {
                graph,
                ranks: HashMap::new(),
            };
        }

        let position: HashMap<_, _> = indices.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();
        let out_degree: Vec<usize> = indices
            .iter()
            .map(|&idx| graph.graph.edges_directed(idx, Direction::Outgoing).count())
            .collect();

        let damping = self.config.damping;
        let uniform = 1.0 / n as f64;
        let mut scores = vec![uniform; n];

        for iteration in 0..self.config.max_iterations {
            let mut next = vec![(1.0 - damping) * uniform; n];

            // Dangling nodes teleport their whole mass.
            let dangling: f64 = scores
                .iter()
                .zip(&out_degree)
                .filter(|&(_, &deg)| deg == 0)
                .map(|(s, _)| *s)
                .sum();
            for value in next.iter_mut() {
                *value += damping * dangling * uniform;
            }

            for (i, &idx) in indices.iter().enumerate() {
                if out_degree[i] == 0 {
                    continue;
                }
                let share = damping * scores[i] / out_degree[i] as f64;
                for edge in graph.graph.edges_directed(idx, Direction::Outgoing) {
                    next[position[&edge.target()]] += share;
                }
            }

            let delta = scores
                .iter()
                .zip(&next)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            scores = next;
            if delta < self.config.tolerance {
                tracing::debug!(iteration, "pagerank converged");
                break;
            }
        }

        // Normalize into [0, 1] by the maximum score.
        let max = scores.iter().cloned().fold(0.0_f64, f64::max);
        if max > 0.0 {
            for score in scores.iter_mut() {
                *score /= max;
            }
        }

        let ranks = indices
            .iter()
            .enumerate()
            .map(|(i, &idx)| (graph.graph[idx].id.clone(), scores[i]))
            .collect();
        RankedCodeGraph { graph, ranks }
    }
}

#[derive(Debug, Clone)]
pub struct GitChangesConfig {
    /// How many commits of history to consult.
    pub max_commits: usize,
}

impl Default for GitChangesConfig {
    fn default() -> Self {
        Self { max_commits: 500 }
    }
}

/// Ranks file nodes by how often their path appears in recent commits;
/// non-file nodes rank 0. An unreadable history downgrades every rank to 0
/// with a warning instead of failing the run.
pub struct GitChangesRanker {
    repo_root: PathBuf,
    config: GitChangesConfig,
}

impl GitChangesRanker {
    pub fn new(repo_root: &Path, config: GitChangesConfig) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            config,
        }
    }

    fn change_counts(&self) -> Result<HashMap<String, usize>, git2::Error> {
        let repo = git2::Repository::discover(&self.repo_root)?;
        let mut walk = repo.revwalk()?;
        walk.push_head()?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for oid in walk.take(self.config.max_commits) {
            let commit = repo.find_commit(oid?)?;
            let tree = commit.tree()?;
            let parent_tree = match commit.parent(0) {
                Ok(parent) => Some(parent.tree()?),
                Err(_) => None,
            };
            let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
            for delta in diff.deltas() {
                if let Some(path) = delta.new_file().path().and_then(|p| p.to_str()) {
                    *counts.entry(path.replace('\\', "/")).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }
}

impl Ranker for GitChangesRanker {
    fn rank(&self, graph: CodeGraph) -> RankedCodeGraph {
        let counts = match self.change_counts() {
            Ok(counts) => counts,
            Err(err) => {
                let err = crate::error::RepomapError::VcsUnavailable(err);
                tracing::warn!(%err, "falling back to zero ranks");
                let ranks = graph.nodes().map(|n| (n.id.clone(), 0.0)).collect();
                return RankedCodeGraph { graph, ranks };
            }
        };

        let max = counts.values().copied().max().unwrap_or(0).max(1) as f64;
        let ranks = graph
            .nodes()
            .map(|node| {
                let rank = if node.kind == NodeKind::File {
                    counts.get(&node.file_path).copied().unwrap_or(0) as f64 / max
                } else {
                    0.0
                };
                (node.id.clone(), rank)
            })
            .collect();
        RankedCodeGraph { graph, ranks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CodeNode, EdgeKind};

    fn graph_with_files(paths: &[&str]) -> CodeGraph {
        let mut g = CodeGraph::new();
        for path in paths {
            g.add_node(CodeNode::file(path, Some("typescript")));
        }
        g
    }

    #[test]
    fn test_pagerank_empty_graph() {
        let ranked = PageRankRanker::new(PageRankConfig::default()).rank(CodeGraph::new());
        assert!(ranked.ranks.is_empty());
    }

    #[test]
    fn test_pagerank_hub_and_spokes() {
        let mut g = graph_with_files(&["hub.ts", "a.ts", "b.ts", "c.ts"]);
        for spoke in ["a.ts", "b.ts", "c.ts"] {
            g.add_edge(spoke, "hub.ts", EdgeKind::Imports);
        }
        let ranked = PageRankRanker::new(PageRankConfig::default()).rank(g);
        let rank = |id: &str| ranked.ranks[id];
        assert!(rank("hub.ts") > rank("a.ts"));
        assert!((rank("a.ts") - rank("b.ts")).abs() < 1e-9);
        assert!((rank("b.ts") - rank("c.ts")).abs() < 1e-9);
    }

    #[test]
    fn test_pagerank_bounds_and_positive_mass() {
        // Two disconnected components: both must receive positive mass.
        let mut g = graph_with_files(&["a.ts", "b.ts", "x.ts", "y.ts"]);
        g.add_edge("a.ts", "b.ts", EdgeKind::Imports);
        g.add_edge("x.ts", "y.ts", EdgeKind::Imports);
        let ranked = PageRankRanker::new(PageRankConfig::default()).rank(g);
        for (id, rank) in &ranked.ranks {
            assert!(*rank > 0.0, "{id} must receive positive mass");
            assert!(*rank <= 1.0, "{id} rank must be <= 1");
        }
    }

    #[test]
    fn test_ranker_preserves_graph() {
        let mut g = graph_with_files(&["a.ts", "b.ts"]);
        g.add_edge("a.ts", "b.ts", EdgeKind::Imports);
        let (nodes, edges) = (g.node_count(), g.edge_count());
        let ranked = PageRankRanker::new(PageRankConfig::default()).rank(g);
        assert_eq!(ranked.graph.node_count(), nodes);
        assert_eq!(ranked.graph.edge_count(), edges);
        assert_eq!(ranked.ranks.len(), nodes);
    }

    #[test]
    fn test_git_changes_without_repo_is_all_zero() {
        let dir = tempfile::tempdir().unwrap();
        let g = graph_with_files(&["a.ts"]);
        let ranked =
            GitChangesRanker::new(dir.path(), GitChangesConfig::default()).rank(g);
        assert_eq!(ranked.ranks["a.ts"], 0.0);
    }

    #[test]
    fn test_git_changes_counts_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();

        let mut commit = |path: &str, content: &str, parents_head: bool| {
            std::fs::write(dir.path().join(path), content).unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new(path)).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            if parents_head {
                let head = repo.head().unwrap().peel_to_commit().unwrap();
                repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &[&head])
                    .unwrap();
            } else {
                repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                    .unwrap();
            }
        };

        // hot.ts changes in three commits, cold.ts in one.
        commit("hot.ts", "let a = 1;", false);
        commit("cold.ts", "let b = 1;", true);
        commit("hot.ts", "let a = 2;", true);
        commit("hot.ts", "let a = 3;", true);

        let mut g = graph_with_files(&["hot.ts", "cold.ts"]);
        g.add_node(CodeNode::symbol(
            "hot.ts#a".to_string(),
            NodeKind::Variable,
            "a".to_string(),
            "hot.ts",
            1,
            1,
            String::new(),
        ));
        let ranked =
            GitChangesRanker::new(dir.path(), GitChangesConfig::default()).rank(g);
        assert_eq!(ranked.ranks["hot.ts"], 1.0);
        assert!(ranked.ranks["cold.ts"] > 0.0);
        assert!(ranked.ranks["cold.ts"] < 1.0);
        assert_eq!(ranked.ranks["hot.ts#a"], 0.0, "non-file nodes rank 0");
    }
}
