//! # Error Types
//!
//! Defines the error types used by the catalog toolchain. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Consistency errors are report items, not faults. The consistency pass
//!   collects them and never returns early.
//! - Each consistency error renders as a single descriptive line naming the
//!   offending song, key, or value.
//! - A value that passed the schema but does not fit the typed record is a
//!   [`CoreError`].

use thiserror::Error;

/// Top-level operational error for the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The JSON value did not fit the typed catalog record.
    #[error("document does not match catalog model: {0}")]
    Model(#[from] serde_json::Error),
}

/// A semantic rule violation found in a structurally valid catalog.
///
/// The `Display` text of each variant is the line reported to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// `meta.lvlMax` is zero or negative.
    #[error("max level below 1")]
    LevelMaxBelowOne,

    /// `defaults.style` is not one of `meta.styles`.
    #[error("default style is not listed in meta")]
    UnlistedDefaultStyle,

    /// An entry of `defaults.difficulties` is not a `meta.difficulties` key.
    #[error("default difficulty {0} is not listed in meta")]
    UnlistedDefaultDifficulty(String),

    /// An entry of `defaults.flags` is not one of `meta.flags`.
    ///
    /// Only produced when strict default-flag checking is enabled.
    #[error("default flag {0} is not listed in meta")]
    UnlistedDefaultFlag(String),

    /// `defaults.lowerLvlBound` is greater than `defaults.upperLvlBound`.
    #[error("default level bounds reversed")]
    BoundsReversed,

    /// `defaults.upperLvlBound` is greater than `meta.lvlMax`.
    #[error("default upper level bound is above max level")]
    UpperBoundAboveMax,

    /// A locale lacks the display string for a style, difficulty or flag.
    #[error("missing translation for {key} in {locale}")]
    MissingTranslation {
        /// The untranslated style, difficulty or flag key.
        key: String,
        /// Locale code the translation is missing from.
        locale: String,
    },

    /// A locale lacks the `$abbr` entry for a difficulty.
    #[error("missing abbreviated translation for {key} in {locale}")]
    MissingAbbreviation {
        /// The difficulty key without an abbreviation.
        key: String,
        /// Locale code the abbreviation is missing from.
        locale: String,
    },

    /// A song's jacket references an asset that does not exist.
    #[error("missing jacket image {0}")]
    MissingJacket(String),

    /// A chart uses a style not listed in `meta.styles`.
    #[error("{song} has chart of unlisted style {style}")]
    UnlistedChartStyle {
        /// Song name.
        song: String,
        /// The unrecognized style.
        style: String,
    },

    /// A chart uses a difficulty class not listed in `meta.difficulties`.
    #[error("{song} has chart of unlisted difficulty {diff_class}")]
    UnlistedChartDifficulty {
        /// Song name.
        song: String,
        /// The unrecognized difficulty class.
        diff_class: String,
    },

    /// A draw-group catalog has a chart with no `drawGroup`.
    #[error("{song} has chart missing draw group")]
    MissingDrawGroup {
        /// Song name.
        song: String,
    },

    /// A chart's `drawGroup` exceeds `meta.lvlMax`.
    #[error("{song} has chart with draw group above level max")]
    DrawGroupAboveMax {
        /// Song name.
        song: String,
    },

    /// A leveled catalog has a chart with no `lvl`.
    #[error("{song} has chart missing level")]
    MissingLevel {
        /// Song name.
        song: String,
    },

    /// A chart's `lvl` exceeds `meta.lvlMax`.
    #[error("{song} has chart above level max")]
    LevelAboveMax {
        /// Song name.
        song: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_name_the_offender() {
        let e = ConsistencyError::LevelAboveMax {
            song: "MAX 300".to_string(),
        };
        assert_eq!(e.to_string(), "MAX 300 has chart above level max");

        let e = ConsistencyError::MissingJacket("missing.png".to_string());
        assert_eq!(e.to_string(), "missing jacket image missing.png");

        let e = ConsistencyError::MissingTranslation {
            key: "single".to_string(),
            locale: "ja".to_string(),
        };
        assert_eq!(e.to_string(), "missing translation for single in ja");
    }

    #[test]
    fn model_error_wraps_serde() {
        let err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let core = CoreError::from(err);
        assert!(core.to_string().starts_with("document does not match catalog model"));
    }
}
