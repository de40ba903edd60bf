//! # Schema Validation
//!
//! Structural validation of catalog documents against the catalog JSON
//! Schema (draft-07).
//!
//! Every violation is collected, not just the first, and each one keeps the
//! JSON Pointer of the offending value so nested sub-object errors are
//! reported individually.
//!
//! ## Schema Resolution
//!
//! The catalog schema may `$ref` sibling `*.schema.json` files in its own
//! directory, by filename or by their `$id`. These are resolved from disk
//! through a local retriever; the validator never makes network requests.
//! Internal `$ref`s of the form `#/definitions/<name>` are resolved by the
//! jsonschema crate natively.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

/// Resolves `$ref` URIs against schemas loaded from the schema directory.
struct LocalSchemaRetriever {
    /// Map from URI string (or bare filename) to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Relative refs arrive resolved against the base URI; fall back to
        // the trailing filename.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        self.schemas_by_uri
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri_str}").into())
    }
}

/// Error during schema loading or validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading schema or document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// A compiled catalog schema backed by the `jsonschema` crate.
///
/// The schema is compiled once at construction; validating a document does
/// not rebuild it.
pub struct SchemaValidator {
    /// Display name of the schema (its filename, or `"inline"`).
    schema_name: String,
    /// The raw schema document, kept for bindings generation.
    schema: Value,
    /// Compiled validator.
    validator: Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema_name", &self.schema_name)
            .finish()
    }
}

impl SchemaValidator {
    /// Load and compile the schema at `schema_path`.
    ///
    /// Every other `*.schema.json` file in the same directory is registered
    /// for `$ref` resolution.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the schema (or a
    /// sibling) cannot be read or parsed, and
    /// `SchemaValidationError::ValidatorBuildError` if it does not compile.
    pub fn from_file(schema_path: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_path = schema_path.as_ref();
        let schema_name = schema_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("schema")
            .to_string();

        let schema = read_schema(schema_path, &schema_name)?;
        let siblings = match schema_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => load_sibling_schemas(dir, &schema_name)?,
            _ => HashMap::new(),
        };

        Self::compile(schema_name, schema, siblings)
    }

    /// Compile a schema held in memory. No external `$ref`s are resolvable.
    pub fn from_value(schema: Value) -> Result<Self, SchemaValidationError> {
        Self::compile("inline".to_string(), schema, HashMap::new())
    }

    fn compile(
        schema_name: String,
        schema: Value,
        siblings: HashMap<String, Value>,
    ) -> Result<Self, SchemaValidationError> {
        let mut schemas_by_uri = HashMap::new();
        for (filename, value) in siblings {
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename, value);
        }

        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .with_retriever(LocalSchemaRetriever { schemas_by_uri })
            .build(&schema)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(schema = %schema_name, "compiled catalog schema");

        Ok(Self {
            schema_name,
            schema,
            validator,
        })
    }

    /// The schema's display name.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The raw schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Collect every violation of `instance` against the schema.
    pub fn violations(&self, instance: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

fn read_schema(path: &Path, schema_name: &str) -> Result<Value, SchemaValidationError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| SchemaValidationError::SchemaLoadError {
            schema_name: schema_name.to_string(),
            reason: format!("cannot read schema file: {e}"),
        })?;
    serde_json::from_str(&content).map_err(|e| SchemaValidationError::SchemaLoadError {
        schema_name: schema_name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Read every `*.schema.json` in `dir` except `exclude`, keyed by filename.
fn load_sibling_schemas(
    dir: &Path,
    exclude: &str,
) -> Result<HashMap<String, Value>, SchemaValidationError> {
    let mut schemas = HashMap::new();
    let entries = std::fs::read_dir(dir).map_err(|e| SchemaValidationError::SchemaLoadError {
        schema_name: dir.display().to_string(),
        reason: format!("cannot read schema directory: {e}"),
    })?;

    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".schema.json") && name != exclude {
            schemas.insert(name.to_string(), read_schema(&path, name)?);
        }
    }

    Ok(schemas)
}

/// Load a catalog document from disk as a JSON value.
///
/// The format is chosen by extension: `.yaml`/`.yml` are read as YAML and
/// converted, anything else is read as JSON.
///
/// # Errors
///
/// Returns `SchemaValidationError::DocumentLoadError` if the file cannot be
/// read or parsed.
pub fn load_document(document_path: &Path) -> Result<Value, SchemaValidationError> {
    let load_error = |reason: String| SchemaValidationError::DocumentLoadError {
        path: document_path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(document_path)
        .map_err(|e| load_error(format!("cannot read file: {e}")))?;

    let ext = document_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml_value)
                .map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Catalogs written in YAML use only the JSON-compatible subset; tags are
/// dropped and non-string map keys are stringified.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
