use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use repomap::cli::Cli;
use repomap::config::{
    EngineConfig, FileConfig, RankingSelection, compile_patterns, resolve_max_workers,
    validate_render,
};
use repomap::render::render_markdown;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level)
                .with_context(|| format!("invalid --log-level '{}'", cli.log_level))?,
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = merge_config(&cli)?;
    let ranked = repomap::generate(&config).context("analysis failed")?;
    let document = render_markdown(&ranked, &config.render);
    std::fs::write(&config.output, &document)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    let graph = &ranked.graph;
    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "output": config.output,
                "file_count": graph.file_count(),
                "symbol_count": graph.symbol_count(),
                "edge_count": graph.edge_count(),
            })
        );
    } else {
        println!(
            "Wrote {} ({} files, {} symbols, {} relationships)",
            config.output.display(),
            graph.file_count(),
            graph.symbol_count(),
            graph.edge_count()
        );
    }
    Ok(())
}

/// CLI flags override `repomap.toml` field by field; validation happens here,
/// before any work begins.
fn merge_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let file_config = FileConfig::load(&cli.root)?;

    let mut render = file_config.render.unwrap_or_default();
    if cli.no_header {
        render.include_header = false;
    }
    if cli.no_overview {
        render.include_overview = false;
    }
    if cli.no_mermaid_graph {
        render.include_mermaid_graph = false;
    }
    if cli.no_file_list {
        render.include_file_list = false;
    }
    if cli.no_symbol_details {
        render.include_symbol_details = false;
    }
    if let Some(count) = cli.top_file_count {
        render.top_file_count = count;
    }
    if let Some(header) = &cli.custom_header {
        render.custom_header = Some(header.clone());
    }
    validate_render(&render)?;

    let ranking_strategy = cli
        .ranking_strategy
        .clone()
        .or(file_config.ranking_strategy)
        .unwrap_or_else(|| "pagerank".to_string());
    let max_commits = cli.max_commits.or(file_config.max_commits).unwrap_or(500);
    let ranking = RankingSelection::parse(&ranking_strategy, max_commits)?;

    let include_patterns = if cli.include.is_empty() {
        &file_config.include
    } else {
        &cli.include
    };
    let ignore_patterns = if cli.ignore.is_empty() {
        &file_config.ignore
    } else {
        &cli.ignore
    };

    Ok(EngineConfig {
        root: cli.root.clone(),
        output: cli
            .output
            .clone()
            .or(file_config.output)
            .unwrap_or_else(|| "repomap.md".into()),
        include: compile_patterns("include", include_patterns)?,
        ignore: compile_patterns("ignore", ignore_patterns)?,
        respect_gitignore: !cli.no_gitignore && file_config.respect_gitignore.unwrap_or(true),
        ranking,
        max_workers: resolve_max_workers(cli.max_workers.or(file_config.max_workers)),
        render,
    })
}
