//! The work coordinator: drives the analyzer across all discovered files,
//! either on the calling thread or on a bounded rayon pool, and assembles
//! the global node table.
//!
//! Workers are stateless (each carries only its `FileInput` + registry row)
//! and results merge first-wins by id, so the table's contents do not depend
//! on pool size or completion order. The relationship phase starts strictly
//! after every file's definition pass has been merged.

use std::panic::{AssertUnwindSafe, catch_unwind};

use rayon::prelude::*;

use crate::analyzer::{FileAnalysis, UnresolvedRelation, analyze_file};
use crate::discovery::FileInput;
use crate::error::{RepomapError, Result};
use crate::graph::{CodeGraph, CodeNode};
use crate::lang::{LanguageSpec, language_for_path};
use crate::parser_pool;

/// Analyze every file and build the node table. Returns the graph (file and
/// symbol nodes, no edges yet) together with all unresolved relations in
/// deterministic (file, discovery) order.
pub fn build_graph(
    files: &[FileInput],
    max_workers: usize,
) -> Result<(CodeGraph, Vec<UnresolvedRelation>)> {
    let mut graph = CodeGraph::new();

    // File nodes exist for every input, supported or not.
    for file in files {
        let language = language_for_path(&file.path).map(|spec| spec.name);
        graph.add_node(CodeNode::file(&file.path, language));
    }

    // A language whose grammar or query fails to load is dropped for the
    // whole run; its files keep their file nodes.
    let work: Vec<(&FileInput, &'static LanguageSpec)> = files
        .iter()
        .filter_map(|file| {
            let spec = language_for_path(&file.path)?;
            match parser_pool::compiled_language(spec) {
                Ok(_) => Some((file, spec)),
                Err(err) => {
                    tracing::warn!(file = %file.path, %err, "language disabled for this run");
                    None
                }
            }
        })
        .collect();

    let analyses: Vec<FileAnalysis> = if max_workers <= 1 {
        work.iter()
            .map(|&(file, spec)| analyze_guarded(file, spec))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .build()
            .map_err(|err| RepomapError::invalid_config("max-workers", err.to_string()))?;
        pool.install(|| {
            work.par_iter()
                .map(|&(file, spec)| analyze_guarded(file, spec))
                .collect()
        })
    };

    let mut relations = Vec::new();
    for analysis in analyses {
        for node in analysis.nodes {
            graph.add_node(node);
        }
        relations.extend(analysis.relations);
    }

    Ok((graph, relations))
}

/// Run the analyzer with panic isolation: a crashed worker costs one file,
/// not the run.
fn analyze_guarded(file: &FileInput, spec: &'static LanguageSpec) -> FileAnalysis {
    match catch_unwind(AssertUnwindSafe(|| analyze_file(file, spec))) {
        Ok(Ok(analysis)) => analysis,
        Ok(Err(err)) => {
            tracing::warn!(file = %file.path, %err, "analysis failed; file skipped");
            FileAnalysis::default()
        }
        Err(_) => {
            let err = RepomapError::WorkerCrashed(file.path.clone());
            tracing::warn!(file = %file.path, %err, "analysis worker panicked; file skipped");
            FileAnalysis::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    fn input(path: &str, content: &str) -> FileInput {
        FileInput {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_empty_input_empty_graph() {
        let (graph, relations) = build_graph(&[], 1).unwrap();
        assert_eq!(graph.node_count(), 0);
        assert!(relations.is_empty());
    }

    #[test]
    fn test_unsupported_file_contributes_only_file_node() {
        let files = vec![input("README.md", "# hi")];
        let (graph, relations) = build_graph(&files, 1).unwrap();
        assert_eq!(graph.node_count(), 1);
        let node = graph.node("README.md").unwrap();
        assert_eq!(node.kind, NodeKind::File);
        assert_eq!(node.language, None);
        assert!(relations.is_empty());
    }

    #[test]
    fn test_file_node_records_language() {
        let files = vec![input("src/main.ts", "export function f() {}")];
        let (graph, _) = build_graph(&files, 1).unwrap();
        assert_eq!(graph.node("src/main.ts").unwrap().language, Some("typescript"));
        assert!(graph.contains("src/main.ts#f"));
    }

    #[test]
    fn test_output_independent_of_worker_count() {
        let files: Vec<FileInput> = (0..12)
            .map(|i| {
                input(
                    &format!("src/m{i}.ts"),
                    &format!("export class C{i} {{}}\nexport function f{i}() {{}}\n"),
                )
            })
            .collect();

        let (seq, seq_rel) = build_graph(&files, 1).unwrap();
        let (par, par_rel) = build_graph(&files, 4).unwrap();

        let ids = |g: &CodeGraph| {
            let mut v: Vec<String> = g.nodes().map(|n| n.id.clone()).collect();
            v.sort();
            v
        };
        assert_eq!(ids(&seq), ids(&par));
        assert_eq!(seq_rel.len(), par_rel.len());
        assert_eq!(seq.node_count(), 12 * 3, "file + class + fn per input");
    }
}
