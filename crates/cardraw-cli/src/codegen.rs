//! # Codegen Subcommand
//!
//! Regenerates the typed bindings from the catalog schema, or with
//! `--check` verifies the committed bindings are current without writing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use cardraw_schema::{generate, BindingTarget, SchemaValidator};

use crate::config::{BindingsConfig, CardrawConfig};

/// Arguments for the `cardraw codegen` subcommand.
#[derive(Args, Debug, Default)]
pub struct CodegenArgs {
    /// Binding language (typescript or rust). Overrides the config.
    #[arg(long)]
    pub target: Option<BindingTarget>,

    /// Output path for the generated bindings. Overrides the config.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Root type name. Overrides the config.
    #[arg(long)]
    pub type_name: Option<String>,

    /// Verify the existing bindings match instead of writing them.
    #[arg(long)]
    pub check: bool,
}

/// Execute the codegen subcommand.
///
/// Returns exit code: 0 on success, 1 if --check finds stale bindings.
pub fn run_codegen(args: &CodegenArgs, config: &CardrawConfig, repo_root: &Path) -> Result<u8> {
    let schema_path = crate::resolve_path(&config.schema, repo_root);
    let validator = SchemaValidator::from_file(&schema_path)
        .with_context(|| format!("failed to load schema {}", schema_path.display()))?;

    let mut bindings = config.bindings.clone();
    if let Some(target) = args.target {
        bindings.target = target;
    }
    if let Some(output) = &args.output {
        bindings.output = Some(output.clone());
    }
    if let Some(type_name) = &args.type_name {
        bindings.type_name = type_name.clone();
    }

    let out_path = crate::resolve_output_path(&bindings.output_for(bindings.target), repo_root);
    let generated = render_bindings(validator.schema(), &bindings)?;
    let shown = crate::display_path(&out_path, repo_root);

    if args.check {
        if !out_path.exists() {
            println!("FAIL: bindings do not exist: {shown}");
            return Ok(1);
        }
        let existing = std::fs::read_to_string(&out_path)
            .with_context(|| format!("failed to read bindings: {}", out_path.display()))?;
        if existing == generated {
            println!("OK: bindings are up to date: {shown}");
            Ok(0)
        } else {
            println!("FAIL: bindings are outdated: {shown}");
            println!("  run `cardraw codegen` to regenerate");
            Ok(1)
        }
    } else {
        write_bindings(&out_path, &generated)?;
        println!("OK: wrote bindings to {shown}");
        Ok(0)
    }
}

/// Render bindings for `schema` with the configured target and type name,
/// behind the target's standard banner.
pub fn render_bindings(schema: &Value, bindings: &BindingsConfig) -> Result<String> {
    let banner = bindings.target.default_banner();
    generate(schema, &bindings.type_name, &banner, bindings.target).with_context(|| {
        format!(
            "failed to generate {} bindings for {}",
            bindings.target, bindings.type_name
        )
    })
}

/// Write `content` to `path`, creating parent directories, overwriting any
/// existing file.
pub fn write_bindings(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write bindings: {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote bindings");
    Ok(())
}
