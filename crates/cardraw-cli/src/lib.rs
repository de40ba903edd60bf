//! # cardraw-cli — Catalog Toolchain CLI
//!
//! Provides the `cardraw` command-line interface over `cardraw-schema`.
//!
//! ## Subcommands
//!
//! - `cardraw validate`: check every catalog document (or one file), print
//!   a per-document report, and regenerate bindings when all pass.
//! - `cardraw codegen`: regenerate bindings alone, or verify them with
//!   `--check`.
//!
//! ```bash
//! cardraw validate
//! cardraw validate catalogs/a20plus.json --skip-codegen
//! cardraw codegen --target rust --output bindings/catalog.rs
//! cardraw codegen --check
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` a document failed or bindings are stale, `2` operational
//! error (unreadable schema, bad config, unwritable output).

pub mod codegen;
pub mod config;
pub mod validate;

use std::path::{Path, PathBuf};

/// Resolve a path that may be relative to the repository root.
///
/// If the path is absolute, returns it as-is. If relative and it exists
/// relative to `repo_root`, uses that. Otherwise returns the path relative
/// to the current directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}

/// Resolve a path that is about to be written. Relative paths always land
/// under `repo_root`, whether or not they exist yet.
pub fn resolve_output_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}

/// Walk up from `start` to the first directory containing `schemas/`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("schemas").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Path for display: relative to `repo_root` when it lies inside it.
pub fn display_path(path: &Path, repo_root: &Path) -> String {
    path.strip_prefix(repo_root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_prefers_repo_relative() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("catalogs")).unwrap();

        let resolved = resolve_path(Path::new("catalogs"), dir.path());
        assert_eq!(resolved, dir.path().join("catalogs"));

        let missing = resolve_path(Path::new("nope.json"), dir.path());
        assert_eq!(missing, PathBuf::from("nope.json"));
    }

    #[test]
    fn resolve_path_keeps_absolute() {
        let abs = std::env::temp_dir().join("x.json");
        assert_eq!(resolve_path(&abs, Path::new("/unused")), abs);
    }

    #[test]
    fn output_paths_land_under_root() {
        let root = Path::new("/repo");
        assert_eq!(
            resolve_output_path(Path::new("bindings/catalog.d.ts"), root),
            PathBuf::from("/repo/bindings/catalog.d.ts")
        );
    }

    #[test]
    fn repo_root_found_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("schemas")).unwrap();
        let nested = dir.path().join("catalogs/deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn display_path_strips_root() {
        let root = Path::new("/repo");
        assert_eq!(display_path(Path::new("/repo/catalogs/a.json"), root), "catalogs/a.json");
        assert_eq!(display_path(Path::new("/elsewhere/a.json"), root), "/elsewhere/a.json");
    }
}
