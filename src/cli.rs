use std::path::PathBuf;

use clap::Parser;

/// Generate a ranked Markdown map of a codebase.
///
/// repomap parses every supported source file with Tree-sitter, builds a
/// graph of symbols and their relationships, ranks it, and writes a single
/// Markdown report.
#[derive(Parser, Debug)]
#[command(name = "repomap", version, about, long_about = None)]
pub struct Cli {
    /// Project root to analyze.
    pub root: PathBuf,

    /// Output file path (default: repomap.md).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Glob pattern of files to include (repeatable; default: all files).
    #[arg(long)]
    pub include: Vec<String>,

    /// Glob pattern of files or directories to ignore (repeatable).
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Do not respect .gitignore files during discovery.
    #[arg(long)]
    pub no_gitignore: bool,

    /// Ranking strategy: "pagerank" or "git-changes" (default: pagerank).
    #[arg(long)]
    pub ranking_strategy: Option<String>,

    /// Number of analysis workers; 0 uses all available cores (default: 0).
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Commits of history consulted by git-changes ranking (default: 500).
    #[arg(long)]
    pub max_commits: Option<usize>,

    /// Log filter directive (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Omit the report header.
    #[arg(long)]
    pub no_header: bool,

    /// Omit the overview section.
    #[arg(long)]
    pub no_overview: bool,

    /// Omit the Mermaid module graph.
    #[arg(long)]
    pub no_mermaid_graph: bool,

    /// Omit the ranked file list.
    #[arg(long)]
    pub no_file_list: bool,

    /// Omit per-file symbol details.
    #[arg(long)]
    pub no_symbol_details: bool,

    /// How many top-ranked files the file list and graph show.
    #[arg(long)]
    pub top_file_count: Option<usize>,

    /// Replace the built-in header line.
    #[arg(long)]
    pub custom_header: Option<String>,

    /// Print machine-readable run statistics to stdout as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::parse_from(["repomap", "."]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.output.is_none());
        assert!(!cli.no_gitignore);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_repeatable_globs_and_toggles() {
        let cli = Cli::parse_from([
            "repomap",
            "proj",
            "--include",
            "src/**",
            "--include",
            "lib/**",
            "--ignore",
            "dist",
            "--no-mermaid-graph",
            "--ranking-strategy",
            "git-changes",
            "--max-workers",
            "4",
        ]);
        assert_eq!(cli.include.len(), 2);
        assert_eq!(cli.ignore, vec!["dist".to_string()]);
        assert!(cli.no_mermaid_graph);
        assert_eq!(cli.ranking_strategy.as_deref(), Some("git-changes"));
        assert_eq!(cli.max_workers, Some(4));
    }
}
