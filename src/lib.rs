//! repomap — codebase map generation from a Tree-sitter symbol graph.
//!
//! The pipeline is a composition of four roles, each replaceable behind its
//! function or trait: discovery ([`discovery::discover_files`]), analysis
//! ([`pipeline::build_graph`] + [`resolver::resolve`]), ranking
//! ([`rank::Ranker`]), and rendering ([`render::render_markdown`]).

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod lang;
pub mod parser_pool;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod resolver;

pub use config::EngineConfig;
pub use error::RepomapError;
pub use graph::{CodeGraph, RankedCodeGraph};

use discovery::FileInput;
use rank::Ranker;

/// Build the ranked code graph for a prepared file list: analyze all files,
/// resolve relations into edges, then rank.
///
/// The relationship phase starts strictly after every file's definitions
/// have been merged; the resolver depends on the complete node table and on
/// all import edges.
pub fn build_ranked_graph(
    files: &[FileInput],
    max_workers: usize,
    ranker: &dyn Ranker,
) -> error::Result<RankedCodeGraph> {
    let (mut graph, relations) = pipeline::build_graph(files, max_workers)?;
    let all_paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
    resolver::resolve(&mut graph, &relations, &all_paths);
    Ok(ranker.rank(graph))
}

/// The top-level operation: discover, analyze, resolve, and rank a project.
pub fn generate(config: &EngineConfig) -> error::Result<RankedCodeGraph> {
    let files = discovery::discover_files(
        &config.root,
        &config.include,
        &config.ignore,
        config.respect_gitignore,
    )?;
    tracing::info!(files = files.len(), "discovery complete");
    build_ranked_graph(&files, config.max_workers, config.ranker().as_ref())
}
