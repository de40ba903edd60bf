//! # Jacket Assets
//!
//! Existence checks for the image files songs reference through `jacket`.
//! The consistency pass only asks whether a name resolves; it never reads
//! the file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Answers whether a jacket asset exists.
pub trait AssetResolver {
    /// Returns true if an asset named `name` exists.
    fn exists(&self, name: &str) -> bool;
}

/// Resolves jacket names against a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Resolve jackets relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The jackets directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetResolver for DirectoryAssets {
    fn exists(&self, name: &str) -> bool {
        // Names are relative; an absolute or parent-escaping name never resolves.
        let relative = Path::new(name);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return false;
        }
        self.root.join(relative).is_file()
    }
}

/// An in-memory set of asset names.
#[derive(Debug, Clone, Default)]
pub struct KnownAssets {
    names: BTreeSet<String>,
}

impl KnownAssets {
    /// Build from a list of asset names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl AssetResolver for KnownAssets {
    fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
