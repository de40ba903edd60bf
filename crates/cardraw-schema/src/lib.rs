//! # cardraw-schema — Catalog Validation & Bindings Generation
//!
//! Everything between a catalog file on disk and a pass/fail verdict, plus
//! the generator that keeps typed bindings in step with the catalog schema.
//!
//! ## Schema Validation (`validate`)
//!
//! [`SchemaValidator`] compiles a draft-07 JSON Schema (with sibling
//! `*.schema.json` files registered for `$ref` resolution) and reports
//! every violation with its instance path. [`load_document`] reads JSON
//! or YAML documents into a `serde_json::Value`.
//!
//! ## Check Pipeline (`check`)
//!
//! [`CatalogChecker`] runs the two stages for each document:
//!
//! 1. Structural validation against the schema. Any violation ends the
//!    document's check; consistency is never run on malformed data.
//! 2. Deserialization into [`cardraw_core::CatalogDocument`] followed by
//!    [`cardraw_core::check_consistency_with`].
//!
//! Results are folded into a [`RunReport`]; one failing document never
//! stops the others from being checked.
//!
//! ## Bindings Generation (`codegen`)
//!
//! [`generate`] turns the schema into TypeScript interfaces or Rust serde
//! structs, deterministically, behind a "do not modify" banner.
//!
//! ## Crate Policy
//!
//! - Depends only on `cardraw-core` internally.
//! - Filesystem access is limited to reading schemas and catalogs; writing
//!   bindings is the CLI's job.

pub mod check;
pub mod codegen;
pub mod validate;

pub use check::{
    find_catalog_files, CatalogChecker, DocumentErrors, DocumentReport, RunReport,
    CATALOG_EXTENSIONS,
};
pub use codegen::{generate, BindingTarget, CodegenError, DO_NOT_EDIT};
pub use validate::{load_document, SchemaValidationError, SchemaValidator, Violation};
