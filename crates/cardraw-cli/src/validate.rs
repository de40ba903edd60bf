//! # Validate Subcommand
//!
//! Checks every catalog document in the data directory (or a single file)
//! against the schema and the consistency rules, prints one report block per
//! document and a summary, then regenerates the bindings if nothing failed.
//!
//! ```text
//! OK: a20plus.json
//!   /songs/3/charts/0: "lvl" is a required property
//! FAIL: extreme.json — 1 error(s)
//! Catalogs: 1/2 passed
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use cardraw_core::{CheckOptions, DirectoryAssets};
use cardraw_schema::{CatalogChecker, RunReport, SchemaValidator};

use crate::config::CardrawConfig;

/// Arguments for the `cardraw validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Validate one catalog document instead of the whole data directory.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Data directory of catalog documents. Overrides the config.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Do not regenerate bindings after a clean run.
    #[arg(long)]
    pub skip_codegen: bool,

    /// Also require every default flag to be listed in meta.flags.
    #[arg(long)]
    pub strict_flags: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 if any document failed.
pub fn run_validate(args: &ValidateArgs, config: &CardrawConfig, repo_root: &Path) -> Result<u8> {
    let schema_path = crate::resolve_path(&config.schema, repo_root);
    let validator = SchemaValidator::from_file(&schema_path)
        .with_context(|| format!("failed to load schema {}", schema_path.display()))?;

    let jackets = crate::resolve_path(&config.jackets_dir, repo_root);
    if !jackets.is_dir() {
        tracing::warn!(dir = %jackets.display(), "jackets directory not found; every jacket will be reported missing");
    }

    let checker = CatalogChecker::new(validator, DirectoryAssets::new(jackets)).with_options(
        CheckOptions {
            strict_default_flags: args.strict_flags,
        },
    );

    let report = match &args.path {
        Some(path) => {
            let resolved = crate::resolve_path(path, repo_root);
            if !resolved.is_file() {
                bail!("catalog document not found: {}", resolved.display());
            }
            RunReport {
                documents: vec![checker.check_file(&resolved)],
            }
        }
        None => {
            let data_dir = crate::resolve_path(args.data_dir.as_ref().unwrap_or(&config.data_dir), repo_root);
            checker
                .check_directory(&data_dir)
                .with_context(|| format!("failed to read data directory {}", data_dir.display()))?
        }
    };

    print!("{}", render_report(&report));

    if !report.all_passed() {
        return Ok(1);
    }

    if args.skip_codegen {
        tracing::info!("skipping bindings generation");
        return Ok(0);
    }

    let bindings = &config.bindings;
    let out_path = crate::resolve_output_path(&bindings.output_for(bindings.target), repo_root);
    let generated = crate::codegen::render_bindings(checker.validator().schema(), bindings)?;
    crate::codegen::write_bindings(&out_path, &generated)?;
    println!("OK: wrote bindings to {}", crate::display_path(&out_path, repo_root));

    Ok(0)
}

/// The printed report: one block per document in processing order, then
/// the summary line.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    for doc in &report.documents {
        let name = doc.name();
        match &doc.result {
            Ok(_) => out.push_str(&format!("OK: {name}\n")),
            Err(errors) => {
                for message in errors.messages() {
                    out.push_str(&format!("  {message}\n"));
                }
                out.push_str(&format!("FAIL: {name} — {} error(s)\n", errors.len()));
            }
        }
    }
    out.push_str(&format!(
        "Catalogs: {}/{} passed\n",
        report.passed(),
        report.total()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workspace_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.pop();
        dir
    }

    fn catalog() -> serde_json::Value {
        json!({
            "meta": {
                "styles": ["single"],
                "difficulties": [{"key": "basic"}, {"key": "expert"}],
                "flags": [],
                "lvlMax": 19
            },
            "defaults": {
                "style": "single",
                "difficulties": ["expert"],
                "flags": [],
                "lowerLvlBound": 10,
                "upperLvlBound": 15
            },
            "i18n": {"en": {"name": "Scratch Mix"}},
            "songs": [
                {
                    "name": "MAX 300",
                    "jacket": "max300.png",
                    "charts": [
                        {"style": "single", "diffClass": "basic", "lvl": 10},
                        {"style": "single", "diffClass": "expert", "lvl": 18}
                    ]
                }
            ]
        })
    }

    /// A throwaway repo: shipped schema, one catalog, one jacket.
    fn scratch_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for sub in ["schemas", "catalogs", "assets/jackets"] {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        std::fs::copy(
            workspace_root().join("schemas/catalog.schema.json"),
            root.join("schemas/catalog.schema.json"),
        )
        .unwrap();
        std::fs::write(root.join("assets/jackets/max300.png"), b"png").unwrap();
        write_catalog(root, "scratch.json", &catalog());
        dir
    }

    fn write_catalog(root: &Path, name: &str, value: &serde_json::Value) {
        std::fs::write(
            root.join("catalogs").join(name),
            serde_json::to_string_pretty(value).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn clean_run_generates_bindings() {
        let repo = scratch_repo();
        let code = run_validate(&ValidateArgs::default(), &CardrawConfig::default(), repo.path()).unwrap();
        assert_eq!(code, 0);
        assert!(repo.path().join("bindings/catalog.d.ts").is_file());
    }

    #[test]
    fn failing_document_blocks_generation() {
        let repo = scratch_repo();
        let mut bad = catalog();
        bad["songs"][0]["charts"][1]["lvl"] = json!(25);
        write_catalog(repo.path(), "bad.json", &bad);

        let code = run_validate(&ValidateArgs::default(), &CardrawConfig::default(), repo.path()).unwrap();
        assert_eq!(code, 1);
        assert!(!repo.path().join("bindings").exists());
    }

    #[test]
    fn skip_codegen_leaves_bindings_untouched() {
        let repo = scratch_repo();
        let args = ValidateArgs {
            skip_codegen: true,
            ..Default::default()
        };
        assert_eq!(run_validate(&args, &CardrawConfig::default(), repo.path()).unwrap(), 0);
        assert!(!repo.path().join("bindings").exists());
    }

    #[test]
    fn single_path_checks_only_that_file() {
        let repo = scratch_repo();
        let mut bad = catalog();
        bad["songs"][0]["jacket"] = json!("missing.png");
        write_catalog(repo.path(), "bad.json", &bad);

        let args = ValidateArgs {
            path: Some(PathBuf::from("catalogs/scratch.json")),
            skip_codegen: true,
            ..Default::default()
        };
        assert_eq!(run_validate(&args, &CardrawConfig::default(), repo.path()).unwrap(), 0);
    }

    #[test]
    fn strict_flags_reports_unlisted_default_flag() {
        let repo = scratch_repo();
        let mut flagged = catalog();
        flagged["defaults"]["flags"] = json!(["plus"]);
        write_catalog(repo.path(), "scratch.json", &flagged);

        let lenient = ValidateArgs {
            skip_codegen: true,
            ..Default::default()
        };
        assert_eq!(run_validate(&lenient, &CardrawConfig::default(), repo.path()).unwrap(), 0);

        let strict = ValidateArgs {
            skip_codegen: true,
            strict_flags: true,
            ..Default::default()
        };
        assert_eq!(run_validate(&strict, &CardrawConfig::default(), repo.path()).unwrap(), 1);
    }

    #[test]
    fn missing_schema_is_operational_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_validate(&ValidateArgs::default(), &CardrawConfig::default(), dir.path()).is_err());
    }

    #[test]
    fn missing_single_path_is_operational_error() {
        let repo = scratch_repo();
        let args = ValidateArgs {
            path: Some(PathBuf::from("catalogs/nope.json")),
            ..Default::default()
        };
        assert!(run_validate(&args, &CardrawConfig::default(), repo.path()).is_err());
    }

    #[test]
    fn report_format() {
        let repo = scratch_repo();
        let mut bad = catalog();
        bad["meta"]["lvlMax"] = json!(0);
        bad["songs"] = json!([]);
        write_catalog(repo.path(), "bad.json", &bad);

        let validator =
            SchemaValidator::from_file(repo.path().join("schemas/catalog.schema.json")).unwrap();
        let checker = CatalogChecker::new(validator, DirectoryAssets::new(repo.path().join("assets/jackets")));
        let report = checker.check_directory(&repo.path().join("catalogs")).unwrap();

        assert_eq!(
            render_report(&report),
            "  max level below 1\n\
             \x20 default upper level bound is above max level\n\
             FAIL: bad.json — 2 error(s)\n\
             OK: scratch.json\n\
             Catalogs: 1/2 passed\n"
        );
    }
}
