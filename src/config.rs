//! Engine configuration: an optional `repomap.toml` at the scanned root,
//! overridden field-by-field by CLI flags, validated before any work begins.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RepomapError, Result};
use crate::rank::{GitChangesConfig, GitChangesRanker, PageRankConfig, PageRankRanker, Ranker};
use crate::render::RenderOptions;

/// Raw `repomap.toml` contents. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileConfig {
    pub output: Option<PathBuf>,
    pub include: Vec<String>,
    pub ignore: Vec<String>,
    pub respect_gitignore: Option<bool>,
    pub ranking_strategy: Option<String>,
    pub max_workers: Option<usize>,
    pub max_commits: Option<usize>,
    pub render: Option<RenderOptions>,
}

impl FileConfig {
    /// Load `repomap.toml` from the scanned root. A missing file is the
    /// default configuration; an unparseable one is fatal.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("repomap.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| RepomapError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents)
            .map_err(|err| RepomapError::invalid_config("repomap.toml", err.to_string()))
    }
}

/// Which rank strategy the run uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingSelection {
    PageRank,
    GitChanges { max_commits: usize },
}

impl RankingSelection {
    /// Parse the configuration string; anything but the two known values is
    /// an `InvalidConfig`.
    pub fn parse(value: &str, max_commits: usize) -> Result<Self> {
        match value {
            "pagerank" => Ok(Self::PageRank),
            "git-changes" => Ok(Self::GitChanges { max_commits }),
            other => Err(RepomapError::invalid_config(
                "ranking-strategy",
                format!("unknown value '{other}' (expected 'pagerank' or 'git-changes')"),
            )),
        }
    }
}

/// Fully validated engine configuration.
pub struct EngineConfig {
    pub root: PathBuf,
    pub output: PathBuf,
    pub include: Vec<glob::Pattern>,
    pub ignore: Vec<glob::Pattern>,
    pub respect_gitignore: bool,
    pub ranking: RankingSelection,
    /// Worker pool size; always >= 1 after validation.
    pub max_workers: usize,
    pub render: RenderOptions,
}

impl EngineConfig {
    /// Construct the ranker selected by this configuration.
    pub fn ranker(&self) -> Box<dyn Ranker> {
        match &self.ranking {
            RankingSelection::PageRank => {
                Box::new(PageRankRanker::new(PageRankConfig::default()))
            }
            RankingSelection::GitChanges { max_commits } => Box::new(GitChangesRanker::new(
                &self.root,
                GitChangesConfig {
                    max_commits: *max_commits,
                },
            )),
        }
    }
}

/// Compile glob pattern strings, attributing failures to the named field.
pub fn compile_patterns(field: &str, patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p)
                .map_err(|err| RepomapError::invalid_config(field, format!("'{p}': {err}")))
        })
        .collect()
}

/// Validate and resolve a worker count; `0` means available parallelism.
pub fn resolve_max_workers(requested: Option<usize>) -> usize {
    match requested {
        Some(0) | None => num_cpus::get().max(1),
        Some(n) => n,
    }
}

/// Validate renderer options that have value constraints.
pub fn validate_render(options: &RenderOptions) -> Result<()> {
    if options.top_file_count == 0 {
        return Err(RepomapError::invalid_config(
            "top-file-count",
            "must be a positive integer",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_selection_parse() {
        assert_eq!(
            RankingSelection::parse("pagerank", 500).unwrap(),
            RankingSelection::PageRank
        );
        assert_eq!(
            RankingSelection::parse("git-changes", 100).unwrap(),
            RankingSelection::GitChanges { max_commits: 100 }
        );
        assert!(RankingSelection::parse("alphabetical", 500).is_err());
    }

    #[test]
    fn test_invalid_glob_is_invalid_config() {
        let err = compile_patterns("include", &["[".to_string()]).unwrap_err();
        assert!(err.to_string().contains("include"));
    }

    #[test]
    fn test_max_workers_zero_resolves_to_parallelism() {
        assert!(resolve_max_workers(Some(0)) >= 1);
        assert_eq!(resolve_max_workers(Some(3)), 3);
    }

    #[test]
    fn test_zero_top_file_count_rejected() {
        let options = RenderOptions {
            top_file_count: 0,
            ..RenderOptions::default()
        };
        assert!(validate_render(&options).is_err());
    }

    #[test]
    fn test_file_config_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig::load(dir.path()).unwrap();
        assert!(config.ranking_strategy.is_none());
    }

    #[test]
    fn test_file_config_parse_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("repomap.toml"), "not [valid").unwrap();
        assert!(FileConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_file_config_render_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("repomap.toml"),
            "ranking-strategy = \"git-changes\"\n\n[render]\ntop-file-count = 25\n",
        )
        .unwrap();
        let config = FileConfig::load(dir.path()).unwrap();
        assert_eq!(config.ranking_strategy.as_deref(), Some("git-changes"));
        assert_eq!(config.render.unwrap().top_file_count, 25);
    }
}
