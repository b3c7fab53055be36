//! File discovery: walk the project root, apply include/ignore globs, and
//! load file contents into memory.
//!
//! Paths in every `FileInput` are repository-relative and POSIX-normalized
//! (forward slashes), because they double as node ids. Results are sorted by
//! path so the rest of the pipeline sees a deterministic order.

use std::path::Path;

use crate::error::{RepomapError, Result};

/// One discovered source file. Immutable once produced.
#[derive(Debug, Clone)]
pub struct FileInput {
    /// Repository-relative, forward-slash path.
    pub path: String,
    pub content: String,
}

/// Walk `root` and collect every file passing the include/ignore filters.
///
/// `.gitignore` handling follows the flag; hidden files are always skipped.
/// Files that cannot be read (permissions, invalid UTF-8 binaries) are
/// logged at warn and skipped; a missing root is fatal.
pub fn discover_files(
    root: &Path,
    include: &[glob::Pattern],
    ignore: &[glob::Pattern],
    respect_gitignore: bool,
) -> Result<Vec<FileInput>> {
    if !root.is_dir() {
        return Err(RepomapError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "root is not a directory"),
        });
    }

    let walker = ignore::WalkBuilder::new(root)
        // Read .gitignore files even outside a git repository.
        .require_git(false)
        .git_ignore(respect_gitignore)
        .git_global(respect_gitignore)
        .git_exclude(respect_gitignore)
        .parents(respect_gitignore)
        .hidden(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(%err, "walk error");
                continue;
            }
        };
        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(true) {
            continue;
        }

        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if !include.is_empty() && !include.iter().any(|p| p.matches(&rel_path)) {
            continue;
        }
        if matches_any(ignore, &rel_path) {
            continue;
        }

        match std::fs::read_to_string(entry.path()) {
            Ok(content) => files.push(FileInput {
                path: rel_path,
                content,
            }),
            Err(err) => {
                tracing::warn!(file = %rel_path, %err, "unreadable file skipped");
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// A pattern matches when it covers the whole relative path or any single
/// path component (so `node_modules` excludes the directory everywhere).
fn matches_any(patterns: &[glob::Pattern], rel_path: &str) -> bool {
    patterns.iter().any(|pattern| {
        pattern.matches(rel_path) || rel_path.split('/').any(|comp| pattern.matches(comp))
    })
}
