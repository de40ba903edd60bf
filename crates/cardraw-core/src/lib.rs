//! # cardraw-core — Catalog Types and Consistency Rules
//!
//! This crate defines the typed record a rhythm-game catalog document
//! deserializes into, and the semantic checks run over it once the document
//! has passed structural (JSON Schema) validation.
//!
//! ## Key Design Principles
//!
//! 1. **Structure first, semantics second.** Nothing here looks at raw JSON
//!    shape. Callers validate against the schema, then build a
//!    [`CatalogDocument`], then call [`check_consistency`].
//!
//! 2. **Report, never fail.** The consistency pass returns every violation
//!    as a [`ConsistencyError`]. It does not stop at the first one and it
//!    does not return `Err`.
//!
//! 3. **Asset lookup is a seam.** Jacket existence goes through the
//!    [`AssetResolver`] trait so checks run against a directory on disk
//!    or an in-memory set.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cardraw-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod assets;
pub mod consistency;
pub mod error;
pub mod model;

// Re-export primary types for ergonomic imports.
pub use assets::{AssetResolver, DirectoryAssets, KnownAssets};
pub use consistency::{check_consistency, check_consistency_with, CheckOptions};
pub use error::{ConsistencyError, CoreError};
pub use model::{
    CatalogDocument, Chart, Defaults, Difficulty, LocaleStrings, Meta, Song, BASE_LOCALE,
};
