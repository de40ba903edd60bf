//! # Catalog Check Pipeline
//!
//! Runs one catalog document through structural validation and, only when
//! that passes, through the consistency rules. A directory run folds the
//! per-document results into a [`RunReport`]; there is no shared failure
//! flag, the report is the answer.

use std::fmt;
use std::path::{Path, PathBuf};

use cardraw_core::{
    check_consistency_with, AssetResolver, CatalogDocument, CheckOptions, ConsistencyError,
};
use serde_json::Value;

use crate::validate::{load_document, SchemaValidationError, SchemaValidator, Violation};

/// File extensions treated as catalog documents.
pub const CATALOG_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Why a document failed. Each variant is terminal for that document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentErrors {
    /// The file could not be read or parsed.
    Unloadable(String),
    /// The document does not conform to the schema. Semantic checks did not run.
    Structural(Vec<Violation>),
    /// The document is well-formed but breaks consistency rules.
    Inconsistent(Vec<ConsistencyError>),
}

impl DocumentErrors {
    /// The error lines, in report order.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Unloadable(reason) => vec![reason.clone()],
            Self::Structural(violations) => violations.iter().map(ToString::to_string).collect(),
            Self::Inconsistent(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// Number of error lines.
    pub fn len(&self) -> usize {
        match self {
            Self::Unloadable(_) => 1,
            Self::Structural(violations) => violations.len(),
            Self::Inconsistent(errors) => errors.len(),
        }
    }

    /// True when there are no error lines.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for DocumentErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.messages().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Outcome of checking one file.
#[derive(Debug)]
pub struct DocumentReport {
    /// Path of the checked file.
    pub path: PathBuf,
    /// The typed document, or why it was rejected.
    pub result: Result<CatalogDocument, DocumentErrors>,
}

impl DocumentReport {
    /// File name for display, falling back to the full path.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// True if the document had no errors of any kind.
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }

    /// The document's error lines; empty when it passed.
    pub fn messages(&self) -> Vec<String> {
        match &self.result {
            Ok(_) => Vec::new(),
            Err(errors) => errors.messages(),
        }
    }
}

/// Outcome of checking every document in a directory.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Per-document reports, in processing order.
    pub documents: Vec<DocumentReport>,
}

impl RunReport {
    /// Number of documents checked.
    pub fn total(&self) -> usize {
        self.documents.len()
    }

    /// Number of documents without errors.
    pub fn passed(&self) -> usize {
        self.documents.iter().filter(|d| d.passed()).count()
    }

    /// Number of documents with at least one error.
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// True if every document passed. Vacuously true for an empty run.
    pub fn all_passed(&self) -> bool {
        self.documents.iter().all(DocumentReport::passed)
    }

    /// Reports of the documents that failed.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| !d.passed())
    }
}

/// Checks catalog documents against a compiled schema and the consistency
/// rules.
#[derive(Debug)]
pub struct CatalogChecker<A> {
    validator: SchemaValidator,
    assets: A,
    options: CheckOptions,
}

impl<A: AssetResolver> CatalogChecker<A> {
    /// Build a checker with the default rule set.
    pub fn new(validator: SchemaValidator, assets: A) -> Self {
        Self {
            validator,
            assets,
            options: CheckOptions::default(),
        }
    }

    /// Replace the rule options.
    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    /// The compiled schema.
    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// Check a parsed document.
    ///
    /// Structural violations short-circuit: if any exist, they are the only
    /// errors returned.
    pub fn check_value(&self, value: Value) -> Result<CatalogDocument, DocumentErrors> {
        let violations = self.validator.violations(&value);
        if !violations.is_empty() {
            return Err(DocumentErrors::Structural(violations));
        }

        // The schema may be looser than the typed record.
        let doc = CatalogDocument::from_value(value).map_err(|e| {
            DocumentErrors::Structural(vec![Violation {
                instance_path: String::new(),
                schema_path: String::new(),
                message: e.to_string(),
            }])
        })?;

        let errors = check_consistency_with(&doc, &self.assets, self.options);
        if errors.is_empty() {
            Ok(doc)
        } else {
            Err(DocumentErrors::Inconsistent(errors))
        }
    }

    /// The error lines for a parsed document; empty means valid.
    pub fn errors_for(&self, value: Value) -> Vec<String> {
        match self.check_value(value) {
            Ok(_) => Vec::new(),
            Err(errors) => errors.messages(),
        }
    }

    /// Load and check one file. Load failures become the document's error.
    pub fn check_file(&self, path: &Path) -> DocumentReport {
        let result = match load_document(path) {
            Ok(value) => self.check_value(value),
            Err(e) => Err(DocumentErrors::Unloadable(e.to_string())),
        };

        match &result {
            Ok(doc) => tracing::debug!(
                path = %path.display(),
                songs = doc.songs.len(),
                charts = doc.chart_count(),
                "catalog passed"
            ),
            Err(errors) => tracing::debug!(
                path = %path.display(),
                errors = errors.len(),
                "catalog failed"
            ),
        }

        DocumentReport {
            path: path.to_path_buf(),
            result,
        }
    }

    /// Check every catalog document in `dir`, one at a time, in sorted order.
    ///
    /// A failing document never stops the run.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::Io` only if `dir` cannot be listed.
    pub fn check_directory(&self, dir: &Path) -> Result<RunReport, SchemaValidationError> {
        let files = find_catalog_files(dir)?;
        let documents = files.iter().map(|path| self.check_file(path)).collect();
        let report = RunReport { documents };

        tracing::info!(
            dir = %dir.display(),
            total = report.total(),
            failed = report.failed(),
            "checked catalog directory"
        );

        Ok(report)
    }
}

/// List the catalog documents directly inside `dir`, sorted by path.
pub fn find_catalog_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaValidationError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_catalog = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| CATALOG_EXTENSIONS.contains(&ext));
        if is_catalog {
            files.push(path);
        } else {
            tracing::debug!(path = %path.display(), "skipping non-catalog file");
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardraw_core::KnownAssets;
    use serde_json::json;

    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.pop();
        dir
    }

    fn checker() -> CatalogChecker<KnownAssets> {
        let validator =
            SchemaValidator::from_file(repo_root().join("schemas/catalog.schema.json")).unwrap();
        CatalogChecker::new(validator, KnownAssets::new(["paranoia.png"]))
    }

    fn catalog() -> Value {
        json!({
            "meta": {
                "styles": ["single", "double"],
                "difficulties": [{"key": "basic", "color": "#f8c20d"}, {"key": "expert", "color": "#00ff00"}],
                "flags": ["unlock"],
                "lvlMax": 10,
                "usesDrawGroups": false
            },
            "defaults": {
                "style": "single",
                "difficulties": ["expert"],
                "flags": [],
                "lowerLvlBound": 2,
                "upperLvlBound": 9
            },
            "i18n": {
                "en": {"name": "Test Mix"}
            },
            "songs": [
                {
                    "name": "PARANOiA",
                    "artist": "180",
                    "jacket": "paranoia.png",
                    "charts": [
                        {"style": "single", "diffClass": "basic", "lvl": 5},
                        {"style": "single", "diffClass": "expert", "lvl": 9}
                    ]
                }
            ]
        })
    }

    #[test]
    fn valid_document_has_no_errors() {
        assert!(checker().errors_for(catalog()).is_empty());
    }

    #[test]
    fn chart_above_level_max() {
        let mut v = catalog();
        v["songs"][0]["charts"][1]["lvl"] = json!(15);
        assert_eq!(
            checker().errors_for(v),
            vec!["PARANOiA has chart above level max"]
        );
    }

    #[test]
    fn integral_float_level_reaches_consistency_checks() {
        let mut v = catalog();
        v["songs"][0]["charts"][1]["lvl"] = json!(15.0);
        assert_eq!(
            checker().errors_for(v),
            vec!["PARANOiA has chart above level max"]
        );
    }

    #[test]
    fn failing_document_errors_are_never_empty() {
        let mut v = catalog();
        v["meta"]["lvlMax"] = json!(0);
        let errors = checker().check_value(v).unwrap_err();
        assert!(!errors.is_empty());
        assert_eq!(errors.len(), errors.messages().len());
    }

    #[test]
    fn missing_jacket() {
        let mut v = catalog();
        v["songs"][0]["jacket"] = json!("missing.png");
        assert_eq!(checker().errors_for(v), vec!["missing jacket image missing.png"]);
    }

    #[test]
    fn default_style_not_listed() {
        let mut v = catalog();
        v["meta"]["styles"] = json!(["A", "B"]);
        v["defaults"]["style"] = json!("X");
        v["songs"] = json!([]);
        assert_eq!(
            checker().errors_for(v),
            vec!["default style is not listed in meta"]
        );
    }

    #[test]
    fn structural_errors_short_circuit_semantic_checks() {
        let mut v = catalog();
        v["songs"] = json!("not a list");
        // Would also fail several semantic rules if they ran.
        v["meta"]["lvlMax"] = json!(0);
        v["defaults"]["style"] = json!("X");

        let result = checker().check_value(v);
        let Err(DocumentErrors::Structural(violations)) = result else {
            panic!("expected structural errors, got {result:?}");
        };
        assert!(violations.iter().any(|v| v.instance_path == "/songs"));
        assert!(violations.iter().all(|v| !v.message.contains("default style")));
    }

    #[test]
    fn errors_are_idempotent() {
        let mut v = catalog();
        v["songs"][0]["jacket"] = json!("missing.png");
        v["defaults"]["lowerLvlBound"] = json!(10);
        let c = checker();
        assert_eq!(c.errors_for(v.clone()), c.errors_for(v));
    }

    #[test]
    fn directory_run_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = catalog();
        bad["meta"]["lvlMax"] = json!(0);
        std::fs::write(dir.path().join("b_bad.json"), bad.to_string()).unwrap();
        std::fs::write(dir.path().join("a_good.json"), catalog().to_string()).unwrap();
        std::fs::write(dir.path().join("c_broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();

        let report = checker().check_directory(dir.path()).unwrap();
        let names: Vec<String> = report.documents.iter().map(DocumentReport::name).collect();
        assert_eq!(names, vec!["a_good.json", "b_bad.json", "c_broken.json"]);
        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
        assert!(!report.all_passed());

        let bad_messages = report.documents[1].messages();
        assert!(bad_messages.contains(&"max level below 1".to_string()));
        assert!(matches!(
            report.documents[2].result,
            Err(DocumentErrors::Unloadable(_))
        ));
    }

    #[test]
    fn empty_directory_passes() {
        let dir = tempfile::tempdir().unwrap();
        let report = checker().check_directory(dir.path()).unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.all_passed());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = checker()
            .check_directory(Path::new("/nonexistent/cardraw-catalogs"))
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::Io(_)));
    }

    #[test]
    fn strict_flags_option_applies() {
        let mut v = catalog();
        v["defaults"]["flags"] = json!(["hidden"]);
        assert!(checker().errors_for(v.clone()).is_empty());

        let strict = checker().with_options(CheckOptions {
            strict_default_flags: true,
        });
        assert_eq!(
            strict.errors_for(v),
            vec!["default flag hidden is not listed in meta"]
        );
    }
}
