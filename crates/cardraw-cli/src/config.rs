//! # Toolchain Configuration
//!
//! Optional `cardraw.yaml` at the repository root (or `--config <path>`).
//! Every key is optional; missing keys take the repository-layout defaults.
//!
//! ```yaml
//! data_dir: catalogs
//! schema: schemas/catalog.schema.json
//! jackets_dir: assets/jackets
//! bindings:
//!   target: typescript
//!   output: bindings/catalog.d.ts
//!   type_name: CatalogDocument
//! ```

use std::path::{Path, PathBuf};

use cardraw_schema::BindingTarget;
use serde::Deserialize;
use thiserror::Error;

/// Config file looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = "cardraw.yaml";

/// Errors loading the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Where the toolchain reads catalogs from and writes bindings to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardrawConfig {
    /// Directory of catalog documents.
    pub data_dir: PathBuf,
    /// The catalog JSON Schema.
    pub schema: PathBuf,
    /// Directory jacket filenames are resolved against.
    pub jackets_dir: PathBuf,
    pub bindings: BindingsConfig,
}

impl Default for CardrawConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("catalogs"),
            schema: PathBuf::from("schemas/catalog.schema.json"),
            jackets_dir: PathBuf::from("assets/jackets"),
            bindings: BindingsConfig::default(),
        }
    }
}

/// Bindings generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingsConfig {
    pub target: BindingTarget,
    /// Output file. Defaults per target when unset.
    pub output: Option<PathBuf>,
    /// Name of the root type.
    pub type_name: String,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            target: BindingTarget::default(),
            output: None,
            type_name: "CatalogDocument".to_string(),
        }
    }
}

impl BindingsConfig {
    /// Output file for `target`: the configured path if set, otherwise
    /// `bindings/catalog.d.ts` or `bindings/catalog.rs`.
    pub fn output_for(&self, target: BindingTarget) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        match target {
            BindingTarget::TypeScript => PathBuf::from("bindings/catalog.d.ts"),
            BindingTarget::Rust => PathBuf::from("bindings/catalog.rs"),
        }
    }
}

impl CardrawConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config YAML. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load `explicit` if given, else `cardraw.yaml` under `repo_root` if it
    /// exists, else the defaults.
    pub fn discover(explicit: Option<&Path>, repo_root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(&crate::resolve_path(path, repo_root));
        }
        let default_path = repo_root.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            tracing::debug!(path = %default_path.display(), "loading config");
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}
