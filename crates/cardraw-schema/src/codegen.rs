//! # Bindings Generation
//!
//! Turns the catalog JSON Schema into type declarations for consumers of the
//! catalog data. Generation is a pure function of the schema, the root type
//! name, the banner and the target; the same inputs always produce the same
//! text.
//!
//! ## Pipeline
//!
//! ```text
//! JSON Schema ──> Vec<TypeDecl> ──┬─> TypeScript interfaces
//!                   (IR)          └─> Rust serde structs
//! ```
//!
//! Object schemas become named declarations: the root takes the requested
//! type name, `definitions`/`$defs` entries take their `title` or key, and
//! anonymous nested objects are named after their parent and property.
//! Only local `$ref`s (`#`, `#/definitions/...`, `#/$defs/...`) are
//! supported.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Literal marker every generated banner carries.
pub const DO_NOT_EDIT: &str = "DO NOT MODIFY BY HAND";

/// Errors from bindings generation.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// The root type name is not a usable identifier.
    #[error("invalid type name '{0}': expected an identifier")]
    InvalidTypeName(String),

    /// A `$ref` points outside the schema document.
    #[error("unresolved $ref '{reference}' at {path}")]
    UnresolvedRef {
        /// The reference as written.
        reference: String,
        /// Schema path of the referencing node.
        path: String,
    },

    /// The binding target name is not recognized.
    #[error("unknown binding target '{0}' (expected typescript or rust)")]
    UnknownTarget(String),
}

/// Language the bindings are generated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingTarget {
    /// TypeScript declaration file.
    #[default]
    #[serde(alias = "ts")]
    TypeScript,
    /// Rust module with serde derives.
    #[serde(alias = "rs")]
    Rust,
}

impl BindingTarget {
    /// The standard "generated" banner, as a comment in the target language.
    pub fn default_banner(self) -> String {
        match self {
            Self::TypeScript => format!(
                "/* eslint-disable */\n\
                 /**\n \
                 * This file was automatically generated by cardraw codegen.\n \
                 * {DO_NOT_EDIT}. Instead, modify the source JSON Schema file,\n \
                 * and run `cardraw codegen` to regenerate this file.\n \
                 */"
            ),
            Self::Rust => format!(
                "// This file was automatically generated by cardraw codegen.\n\
                 // {DO_NOT_EDIT}. Instead, modify the source JSON Schema file,\n\
                 // and run `cardraw codegen --target rust` to regenerate this file."
            ),
        }
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeScript => f.write_str("typescript"),
            Self::Rust => f.write_str("rust"),
        }
    }
}

impl FromStr for BindingTarget {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Ok(Self::TypeScript),
            "rust" | "rs" => Ok(Self::Rust),
            _ => Err(CodegenError::UnknownTarget(s.to_string())),
        }
    }
}

/// Generate bindings for `schema` with `banner` prepended.
///
/// # Errors
///
/// Returns [`CodegenError::InvalidTypeName`] if `type_name` is not an
/// identifier and [`CodegenError::UnresolvedRef`] for non-local `$ref`s.
pub fn generate(
    schema: &Value,
    type_name: &str,
    banner: &str,
    target: BindingTarget,
) -> Result<String, CodegenError> {
    let decls = collect_declarations(schema, type_name)?;
    let body = match target {
        BindingTarget::TypeScript => render_typescript(&decls),
        BindingTarget::Rust => render_rust(&decls),
    };

    let banner = banner.trim_end();
    if banner.is_empty() {
        Ok(body)
    } else {
        Ok(format!("{banner}\n\n{body}"))
    }
}

// ---------------------------------------------------------------------------
// Intermediate representation
// ---------------------------------------------------------------------------

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    /// Unconstrained value.
    Any,
    /// A single JSON literal (`const`, or one `enum` member).
    Literal(Value),
    Array(Box<TypeExpr>),
    /// String-keyed map.
    Map(Box<TypeExpr>),
    /// Reference to a declared type.
    Named(String),
    Union(Vec<TypeExpr>),
}

/// A member of an object declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property key as it appears in documents.
    pub key: String,
    pub ty: TypeExpr,
    pub required: bool,
    pub doc: Option<String>,
}

/// Shape of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// Object with known members and optionally a type for extra keys.
    Object {
        fields: Vec<Field>,
        additional: Option<TypeExpr>,
    },
    /// Named alias for any other type.
    Alias(TypeExpr),
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub doc: Option<String>,
    pub kind: DeclKind,
}

/// Walk `schema` into declarations: the root first, then definitions in
/// name order. Anonymous nested objects follow the declaration that
/// introduced them.
pub fn collect_declarations(schema: &Value, type_name: &str) -> Result<Vec<TypeDecl>, CodegenError> {
    if !is_identifier(type_name) {
        return Err(CodegenError::InvalidTypeName(type_name.to_string()));
    }

    let mut collector = Collector::new(type_name);

    // Name every definition up front so `$ref`s resolve regardless of order.
    let mut definitions: Vec<(String, String, &Value)> = Vec::new();
    for container in ["definitions", "$defs"] {
        let Some(defs) = schema.get(container).and_then(Value::as_object) else {
            continue;
        };
        for (key, def) in defs {
            let base = def
                .get("title")
                .and_then(Value::as_str)
                .map(pascal_case)
                .unwrap_or_else(|| pascal_case(key));
            let name = collector.unique_name(&base);
            let pointer = format!("#/{container}/{}", escape_pointer(key));
            collector.refs.insert(pointer.clone(), name.clone());
            definitions.push((name, pointer, def));
        }
    }
    definitions.sort_by(|a, b| a.0.cmp(&b.0));

    collector.declare(type_name, schema, "#")?;
    for (name, pointer, def) in definitions {
        collector.declare(&name, def, &pointer)?;
    }

    Ok(collector.decls.into_iter().flatten().collect())
}

struct Collector {
    root_name: String,
    /// Local `$ref` pointer to declared type name.
    refs: BTreeMap<String, String>,
    /// Declarations in output order; slots are reserved before children are walked.
    decls: Vec<Option<TypeDecl>>,
    taken: BTreeSet<String>,
}

impl Collector {
    fn new(root_name: &str) -> Self {
        let mut taken = BTreeSet::new();
        taken.insert(root_name.to_string());
        Self {
            root_name: root_name.to_string(),
            refs: BTreeMap::new(),
            decls: Vec::new(),
            taken,
        }
    }

    fn unique_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }

    fn declare(&mut self, name: &str, schema: &Value, path: &str) -> Result<(), CodegenError> {
        let slot = self.decls.len();
        self.decls.push(None);

        let merged = merge_all_of(schema);
        let schema = merged.as_ref().unwrap_or(schema);

        let kind = if has_properties(schema) {
            self.object_decl(name, schema, path)?
        } else {
            DeclKind::Alias(self.expr(schema, name, path)?)
        };

        self.decls[slot] = Some(TypeDecl {
            name: name.to_string(),
            doc: description(schema),
            kind,
        });
        Ok(())
    }

    fn object_decl(&mut self, name: &str, schema: &Value, path: &str) -> Result<DeclKind, CodegenError> {
        let required: BTreeSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let Some(props) = schema.get("properties").and_then(Value::as_object) {
            for (key, prop) in props {
                let context = format!("{name}{}", pascal_case(key));
                let prop_path = format!("{path}/properties/{}", escape_pointer(key));
                fields.push(Field {
                    key: key.clone(),
                    ty: self.expr(prop, &context, &prop_path)?,
                    required: required.contains(key.as_str()),
                    doc: description(prop),
                });
            }
        }

        let additional = match schema.get("additionalProperties") {
            Some(Value::Bool(true)) => Some(TypeExpr::Any),
            Some(extra @ Value::Object(_)) => Some(self.expr(
                extra,
                &format!("{name}Value"),
                &format!("{path}/additionalProperties"),
            )?),
            _ => None,
        };

        Ok(DeclKind::Object { fields, additional })
    }

    fn expr(&mut self, schema: &Value, context: &str, path: &str) -> Result<TypeExpr, CodegenError> {
        let schema = match schema {
            Value::Object(_) => schema,
            _ => return Ok(TypeExpr::Any),
        };

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return self.resolve_ref(reference, path);
        }
        if let Some(value) = schema.get("const") {
            return Ok(TypeExpr::Literal(value.clone()));
        }
        if let Some(values) = schema.get("enum").and_then(Value::as_array) {
            return Ok(union(values.iter().cloned().map(TypeExpr::Literal).collect()));
        }
        for keyword in ["oneOf", "anyOf"] {
            if let Some(variants) = schema.get(keyword).and_then(Value::as_array) {
                let mut members = Vec::with_capacity(variants.len());
                for (i, variant) in variants.iter().enumerate() {
                    members.push(self.expr(
                        variant,
                        &format!("{context}Variant{}", i + 1),
                        &format!("{path}/{keyword}/{i}"),
                    )?);
                }
                return Ok(union(members));
            }
        }
        if let Some(merged) = merge_all_of(schema) {
            return self.expr(&merged, context, path);
        }

        match schema.get("type") {
            Some(Value::String(ty)) => self.type_expr(ty, schema, context, path),
            Some(Value::Array(types)) => {
                let mut members = Vec::with_capacity(types.len());
                for ty in types.iter().filter_map(Value::as_str) {
                    members.push(self.type_expr(ty, schema, context, path)?);
                }
                Ok(union(members))
            }
            _ if schema.get("properties").is_some() || schema.get("additionalProperties").is_some() => {
                self.object_expr(schema, context, path)
            }
            _ if schema.get("items").is_some() => self.type_expr("array", schema, context, path),
            _ => Ok(TypeExpr::Any),
        }
    }

    fn type_expr(
        &mut self,
        ty: &str,
        schema: &Value,
        context: &str,
        path: &str,
    ) -> Result<TypeExpr, CodegenError> {
        Ok(match ty {
            "string" => TypeExpr::String,
            "integer" => TypeExpr::Integer,
            "number" => TypeExpr::Number,
            "boolean" => TypeExpr::Boolean,
            "null" => TypeExpr::Null,
            "array" => {
                let item_context = format!("{context}Item");
                let items = match schema.get("items") {
                    Some(Value::Array(tuple)) => {
                        let mut members = Vec::with_capacity(tuple.len());
                        for (i, item) in tuple.iter().enumerate() {
                            members.push(self.expr(item, &item_context, &format!("{path}/items/{i}"))?);
                        }
                        union(members)
                    }
                    Some(item) => self.expr(item, &item_context, &format!("{path}/items"))?,
                    None => TypeExpr::Any,
                };
                TypeExpr::Array(Box::new(items))
            }
            "object" => self.object_expr(schema, context, path)?,
            _ => TypeExpr::Any,
        })
    }

    /// Objects with properties are hoisted into their own declaration;
    /// property-less objects are maps.
    fn object_expr(&mut self, schema: &Value, context: &str, path: &str) -> Result<TypeExpr, CodegenError> {
        if has_properties(schema) {
            let base = schema
                .get("title")
                .and_then(Value::as_str)
                .map(pascal_case)
                .unwrap_or_else(|| context.to_string());
            let name = self.unique_name(&base);
            self.declare(&name, schema, path)?;
            return Ok(TypeExpr::Named(name));
        }

        let value = match schema.get("additionalProperties") {
            Some(extra @ Value::Object(_)) => self.expr(
                extra,
                &format!("{context}Value"),
                &format!("{path}/additionalProperties"),
            )?,
            _ => match schema.get("patternProperties").and_then(Value::as_object) {
                Some(patterns) => {
                    let mut members = Vec::with_capacity(patterns.len());
                    for (pattern, item) in patterns {
                        members.push(self.expr(
                            item,
                            &format!("{context}Value"),
                            &format!("{path}/patternProperties/{}", escape_pointer(pattern)),
                        )?);
                    }
                    union(members)
                }
                None => TypeExpr::Any,
            },
        };
        Ok(TypeExpr::Map(Box::new(value)))
    }

    fn resolve_ref(&self, reference: &str, path: &str) -> Result<TypeExpr, CodegenError> {
        if reference == "#" {
            return Ok(TypeExpr::Named(self.root_name.clone()));
        }
        self.refs
            .get(reference)
            .map(|name| TypeExpr::Named(name.clone()))
            .ok_or_else(|| CodegenError::UnresolvedRef {
                reference: reference.to_string(),
                path: path.to_string(),
            })
    }
}

fn has_properties(schema: &Value) -> bool {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|p| !p.is_empty())
}

fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Fold `allOf` members into their parent: properties and `required` lists
/// are combined, later members win on conflicting keys.
fn merge_all_of(schema: &Value) -> Option<Value> {
    let members = schema.get("allOf")?.as_array()?;
    let mut merged: Map<String, Value> = schema.as_object()?.clone();
    merged.remove("allOf");

    let mut properties = merged
        .remove("properties")
        .and_then(|p| p.as_object().cloned())
        .unwrap_or_default();
    let mut required: Vec<Value> = merged
        .remove("required")
        .and_then(|r| r.as_array().cloned())
        .unwrap_or_default();

    for member in members {
        let Some(member) = member.as_object() else {
            continue;
        };
        for (key, value) in member {
            match key.as_str() {
                "properties" => {
                    if let Some(props) = value.as_object() {
                        properties.extend(props.clone());
                    }
                }
                "required" => {
                    for r in value.as_array().into_iter().flatten() {
                        if !required.contains(r) {
                            required.push(r.clone());
                        }
                    }
                }
                _ => {
                    merged.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
    }

    if !properties.is_empty() {
        merged.insert("properties".to_string(), Value::Object(properties));
    }
    if !required.is_empty() {
        merged.insert("required".to_string(), Value::Array(required));
    }
    Some(Value::Object(merged))
}

/// Flatten nested unions and drop duplicate members.
fn union(members: Vec<TypeExpr>) -> TypeExpr {
    let mut flat: Vec<TypeExpr> = Vec::new();
    for member in members {
        let items = match member {
            TypeExpr::Union(inner) => inner,
            other => vec![other],
        };
        for item in items {
            if !flat.contains(&item) {
                flat.push(item);
            }
        }
    }
    match flat.len() {
        0 => TypeExpr::Any,
        1 => flat.remove(0),
        _ => TypeExpr::Union(flat),
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `i18nDict` → `I18nDict`, `diff-class` → `DiffClass`, `$abbr` → `Abbr`.
fn pascal_case(raw: &str) -> String {
    let mut out = String::new();
    for segment in raw.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.is_empty() {
        return "Type".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'T');
    }
    out
}

/// `diffClass` → `diff_class`, `$abbr` → `abbr`, `meta.single` → `meta_single`.
fn snake_case(raw: &str) -> String {
    let mut out = String::new();
    let mut prev_lower = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    let out = out.trim_end_matches('_').to_string();
    if out.is_empty() {
        "field".to_string()
    } else if out.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{out}")
    } else {
        out
    }
}

// ---------------------------------------------------------------------------
// TypeScript
// ---------------------------------------------------------------------------

fn render_typescript(decls: &[TypeDecl]) -> String {
    let mut out = String::new();
    for (i, decl) in decls.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        push_ts_doc(&mut out, decl.doc.as_deref(), "");
        match &decl.kind {
            DeclKind::Object { fields, additional } => {
                out.push_str(&format!("export interface {} {{\n", decl.name));
                for field in fields {
                    push_ts_doc(&mut out, field.doc.as_deref(), "  ");
                    let optional = if field.required { "" } else { "?" };
                    out.push_str(&format!(
                        "  {}{optional}: {};\n",
                        ts_key(&field.key),
                        ts_type(&field.ty)
                    ));
                }
                if let Some(extra) = additional {
                    out.push_str(&format!("  [k: string]: {};\n", ts_index_type(extra, fields)));
                }
                out.push_str("}\n");
            }
            DeclKind::Alias(expr) => {
                out.push_str(&format!("export type {} = {};\n", decl.name, ts_type(expr)));
            }
        }
    }
    out
}

fn push_ts_doc(out: &mut String, doc: Option<&str>, indent: &str) {
    let Some(doc) = doc else { return };
    out.push_str(&format!("{indent}/**\n"));
    for line in doc.lines() {
        if line.is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {line}\n"));
        }
    }
    out.push_str(&format!("{indent} */\n"));
}

fn ts_type(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::String => "string".to_string(),
        TypeExpr::Integer | TypeExpr::Number => "number".to_string(),
        TypeExpr::Boolean => "boolean".to_string(),
        TypeExpr::Null => "null".to_string(),
        TypeExpr::Any => "unknown".to_string(),
        TypeExpr::Literal(value) => value.to_string(),
        TypeExpr::Array(inner) => match inner.as_ref() {
            TypeExpr::Union(_) => format!("({})[]", ts_type(inner)),
            _ => format!("{}[]", ts_type(inner)),
        },
        TypeExpr::Map(inner) => format!("{{ [k: string]: {} }}", ts_type(inner)),
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::Union(members) => join_unique(members.iter().map(ts_type)),
    }
}

/// An index signature must admit every declared member's type.
fn ts_index_type(extra: &TypeExpr, fields: &[Field]) -> String {
    let mut parts = vec![ts_type(extra)];
    if !matches!(extra, TypeExpr::Any) {
        parts.extend(fields.iter().map(|f| ts_type(&f.ty)));
        if fields.iter().any(|f| !f.required) {
            parts.push("undefined".to_string());
        }
    }
    join_unique(parts.into_iter())
}

fn join_unique(parts: impl Iterator<Item = String>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for part in parts {
        if !seen.contains(&part) {
            seen.push(part);
        }
    }
    seen.join(" | ")
}

fn ts_key(key: &str) -> String {
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if valid {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}

// ---------------------------------------------------------------------------
// Rust
// ---------------------------------------------------------------------------

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

fn render_rust(decls: &[TypeDecl]) -> String {
    let mut body = String::new();
    for decl in decls {
        body.push('\n');
        push_rust_doc(&mut body, decl.doc.as_deref(), "");
        match &decl.kind {
            DeclKind::Object { fields, additional } => {
                render_rust_struct(&mut body, &decl.name, fields, additional.as_ref());
            }
            DeclKind::Alias(expr) => match string_literals(expr) {
                Some(literals) => render_rust_enum(&mut body, &decl.name, &literals),
                None => body.push_str(&format!("pub type {} = {};\n", decl.name, rust_type(expr))),
            },
        }
    }

    let mut out = String::from("use serde::{Deserialize, Serialize};\n");
    if body.contains("BTreeMap<") {
        out.insert_str(0, "use std::collections::BTreeMap;\n\n");
    }
    out.push_str(&body);
    out
}

fn render_rust_struct(out: &mut String, name: &str, fields: &[Field], additional: Option<&TypeExpr>) {
    out.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
    out.push_str(&format!("pub struct {name} {{\n"));

    let mut used: BTreeSet<String> = BTreeSet::new();
    for field in fields {
        push_rust_doc(out, field.doc.as_deref(), "    ");
        let ident = unique_ident(&snake_case(&field.key), &mut used);

        let mut serde_args = Vec::new();
        if ident.trim_start_matches("r#") != field.key {
            serde_args.push(format!("rename = {}", Value::String(field.key.clone())));
        }
        let base = rust_type(&field.ty);
        let ty = if field.required {
            base
        } else {
            serde_args.push("default".to_string());
            serde_args.push("skip_serializing_if = \"Option::is_none\"".to_string());
            if base.starts_with("Option<") {
                base
            } else {
                format!("Option<{base}>")
            }
        };
        if !serde_args.is_empty() {
            out.push_str(&format!("    #[serde({})]\n", serde_args.join(", ")));
        }
        out.push_str(&format!("    pub {ident}: {ty},\n"));
    }

    if let Some(extra) = additional {
        let ident = unique_ident("extra", &mut used);
        out.push_str("    #[serde(flatten)]\n");
        out.push_str(&format!(
            "    pub {ident}: BTreeMap<String, {}>,\n",
            rust_type(extra)
        ));
    }
    out.push_str("}\n");
}

fn render_rust_enum(out: &mut String, name: &str, literals: &[&str]) {
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n");
    out.push_str(&format!("pub enum {name} {{\n"));
    let mut used = BTreeSet::new();
    for literal in literals {
        let variant = unique_ident(&pascal_case(literal), &mut used);
        out.push_str(&format!(
            "    #[serde(rename = {})]\n    {variant},\n",
            Value::String((*literal).to_string())
        ));
    }
    out.push_str("}\n");
}

/// The members of a union made only of string literals.
fn string_literals(expr: &TypeExpr) -> Option<Vec<&str>> {
    let members = match expr {
        TypeExpr::Union(members) => members.as_slice(),
        TypeExpr::Literal(_) => std::slice::from_ref(expr),
        _ => return None,
    };
    members
        .iter()
        .map(|m| match m {
            TypeExpr::Literal(Value::String(s)) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

fn unique_ident(base: &str, used: &mut BTreeSet<String>) -> String {
    let base = match base {
        "self" | "Self" | "super" | "crate" => format!("{base}_"),
        b if RUST_KEYWORDS.contains(&b) => format!("r#{b}"),
        b => b.to_string(),
    };
    let mut ident = base.clone();
    let mut n = 2;
    while used.contains(&ident) {
        ident = format!("{base}_{n}");
        n += 1;
    }
    used.insert(ident.clone());
    ident
}

fn push_rust_doc(out: &mut String, doc: Option<&str>, indent: &str) {
    let Some(doc) = doc else { return };
    for line in doc.lines() {
        if line.is_empty() {
            out.push_str(&format!("{indent}///\n"));
        } else {
            out.push_str(&format!("{indent}/// {line}\n"));
        }
    }
}

fn rust_type(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::String => "String".to_string(),
        TypeExpr::Integer => "i64".to_string(),
        TypeExpr::Number => "f64".to_string(),
        TypeExpr::Boolean => "bool".to_string(),
        TypeExpr::Null => "()".to_string(),
        TypeExpr::Any => "serde_json::Value".to_string(),
        TypeExpr::Literal(value) => match value {
            Value::String(_) => "String".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Null => "()".to_string(),
            Value::Number(n) if n.is_i64() || n.is_u64() => "i64".to_string(),
            Value::Number(_) => "f64".to_string(),
            _ => "serde_json::Value".to_string(),
        },
        TypeExpr::Array(inner) => format!("Vec<{}>", rust_type(inner)),
        TypeExpr::Map(inner) => format!("BTreeMap<String, {}>", rust_type(inner)),
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::Union(members) => {
            let nullable = members.contains(&TypeExpr::Null);
            let mut rendered: Vec<String> = Vec::new();
            for member in members.iter().filter(|m| **m != TypeExpr::Null) {
                let ty = rust_type(member);
                if !rendered.contains(&ty) {
                    rendered.push(ty);
                }
            }
            let base = match rendered.len() {
                0 => return "()".to_string(),
                1 => rendered.remove(0),
                _ => return "serde_json::Value".to_string(),
            };
            if nullable {
                format!("Option<{base}>")
            } else {
                base
            }
        }
    }
}
