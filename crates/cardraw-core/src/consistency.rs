//! # Consistency Checks
//!
//! Semantic validation of a structurally valid [`CatalogDocument`]. Every
//! rule runs regardless of earlier failures; the result is the full list of
//! violations in check order, with per-song and per-chart violations in
//! document order.
//!
//! ## Rule order
//!
//! 1. `meta.lvlMax` is at least 1.
//! 2. `defaults.style` is a listed style.
//! 3. Every `defaults.difficulties` entry is a listed difficulty.
//! 4. Default level bounds are ordered and within `meta.lvlMax`.
//! 5. Default flags are listed flags. Off unless
//!    [`CheckOptions::strict_default_flags`] is set: catalog variants such as
//!    the "plus" data ship hidden default flags that `meta.flags` omits.
//! 6. Translations are complete whenever a locale besides `en` exists.
//! 7. Jackets exist, and each chart's style, difficulty and level (or draw
//!    group) are valid.

use std::collections::BTreeSet;

use crate::assets::AssetResolver;
use crate::error::ConsistencyError;
use crate::model::{CatalogDocument, Chart, LocaleStrings, Meta, Song, BASE_LOCALE};

/// Switches for the optional rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Also require every default flag to be listed in `meta.flags`.
    pub strict_default_flags: bool,
}

/// Run every default rule over `doc`.
pub fn check_consistency<A>(doc: &CatalogDocument, assets: &A) -> Vec<ConsistencyError>
where
    A: AssetResolver + ?Sized,
{
    check_consistency_with(doc, assets, CheckOptions::default())
}

/// Run the consistency rules over `doc` with explicit options.
pub fn check_consistency_with<A>(
    doc: &CatalogDocument,
    assets: &A,
    options: CheckOptions,
) -> Vec<ConsistencyError>
where
    A: AssetResolver + ?Sized,
{
    let listed = ListedKeys::from_meta(&doc.meta);
    let mut errors = Vec::new();

    check_level_max(doc, &mut errors);
    check_default_style(doc, &listed, &mut errors);
    check_default_difficulties(doc, &listed, &mut errors);
    check_default_bounds(doc, &mut errors);
    if options.strict_default_flags {
        check_default_flags(doc, &listed, &mut errors);
    }
    check_translations(doc, &mut errors);
    for song in &doc.songs {
        check_song(song, &doc.meta, &listed, assets, &mut errors);
    }

    errors
}

/// Style, difficulty and flag keys declared in `meta`.
struct ListedKeys<'a> {
    styles: BTreeSet<&'a str>,
    difficulties: BTreeSet<&'a str>,
    flags: BTreeSet<&'a str>,
}

impl<'a> ListedKeys<'a> {
    fn from_meta(meta: &'a Meta) -> Self {
        Self {
            styles: meta.styles.iter().map(String::as_str).collect(),
            difficulties: meta.difficulty_keys().collect(),
            flags: meta.flags.iter().map(String::as_str).collect(),
        }
    }
}

fn check_level_max(doc: &CatalogDocument, errors: &mut Vec<ConsistencyError>) {
    if doc.meta.lvl_max < 1 {
        errors.push(ConsistencyError::LevelMaxBelowOne);
    }
}

fn check_default_style(
    doc: &CatalogDocument,
    listed: &ListedKeys<'_>,
    errors: &mut Vec<ConsistencyError>,
) {
    if let Some(style) = &doc.defaults.style {
        if !listed.styles.contains(style.as_str()) {
            errors.push(ConsistencyError::UnlistedDefaultStyle);
        }
    }
}

fn check_default_difficulties(
    doc: &CatalogDocument,
    listed: &ListedKeys<'_>,
    errors: &mut Vec<ConsistencyError>,
) {
    for key in &doc.defaults.difficulties {
        if !listed.difficulties.contains(key.as_str()) {
            errors.push(ConsistencyError::UnlistedDefaultDifficulty(key.clone()));
        }
    }
}

fn check_default_bounds(doc: &CatalogDocument, errors: &mut Vec<ConsistencyError>) {
    let defaults = &doc.defaults;
    if defaults.lower_lvl_bound > defaults.upper_lvl_bound {
        errors.push(ConsistencyError::BoundsReversed);
    }
    if defaults.upper_lvl_bound > doc.meta.lvl_max {
        errors.push(ConsistencyError::UpperBoundAboveMax);
    }
}

fn check_default_flags(
    doc: &CatalogDocument,
    listed: &ListedKeys<'_>,
    errors: &mut Vec<ConsistencyError>,
) {
    for key in &doc.defaults.flags {
        if !listed.flags.contains(key.as_str()) {
            errors.push(ConsistencyError::UnlistedDefaultFlag(key.clone()));
        }
    }
}

/// Translations are only required once a catalog is localized at all.
/// The base locale is checked once, then each other locale in sorted order.
fn check_translations(doc: &CatalogDocument, errors: &mut Vec<ConsistencyError>) {
    if doc.secondary_locales().next().is_none() {
        return;
    }

    let keys = doc.meta.translatable_keys();
    let difficulties: Vec<&str> = doc.meta.difficulty_keys().collect();

    check_locale(
        BASE_LOCALE,
        doc.i18n.get(BASE_LOCALE),
        &keys,
        &difficulties,
        errors,
    );
    for (locale, strings) in doc.secondary_locales() {
        check_locale(locale, Some(strings), &keys, &difficulties, errors);
    }
}

fn check_locale(
    locale: &str,
    strings: Option<&LocaleStrings>,
    keys: &[&str],
    difficulties: &[&str],
    errors: &mut Vec<ConsistencyError>,
) {
    for key in keys {
        if strings.and_then(|s| s.meta_translation(key)).is_none() {
            errors.push(ConsistencyError::MissingTranslation {
                key: (*key).to_string(),
                locale: locale.to_string(),
            });
        }
    }
    for key in difficulties {
        if strings.and_then(|s| s.abbreviation(key)).is_none() {
            errors.push(ConsistencyError::MissingAbbreviation {
                key: (*key).to_string(),
                locale: locale.to_string(),
            });
        }
    }
}

fn check_song<A>(
    song: &Song,
    meta: &Meta,
    listed: &ListedKeys<'_>,
    assets: &A,
    errors: &mut Vec<ConsistencyError>,
) where
    A: AssetResolver + ?Sized,
{
    if let Some(jacket) = &song.jacket {
        if !assets.exists(jacket) {
            errors.push(ConsistencyError::MissingJacket(jacket.clone()));
        }
    }

    for chart in &song.charts {
        if !listed.styles.contains(chart.style.as_str()) {
            errors.push(ConsistencyError::UnlistedChartStyle {
                song: song.name.clone(),
                style: chart.style.clone(),
            });
        }
        if !listed.difficulties.contains(chart.diff_class.as_str()) {
            errors.push(ConsistencyError::UnlistedChartDifficulty {
                song: song.name.clone(),
                diff_class: chart.diff_class.clone(),
            });
        }
        check_chart_level(song, chart, meta, errors);
    }
}

fn check_chart_level(
    song: &Song,
    chart: &Chart,
    meta: &Meta,
    errors: &mut Vec<ConsistencyError>,
) {
    let name = || song.name.clone();
    if meta.uses_draw_groups {
        match chart.draw_group {
            None => errors.push(ConsistencyError::MissingDrawGroup { song: name() }),
            Some(group) if group > meta.lvl_max => {
                errors.push(ConsistencyError::DrawGroupAboveMax { song: name() })
            }
            Some(_) => {}
        }
    } else {
        match chart.lvl {
            None => errors.push(ConsistencyError::MissingLevel { song: name() }),
            Some(lvl) if lvl > meta.lvl_max => {
                errors.push(ConsistencyError::LevelAboveMax { song: name() })
            }
            Some(_) => {}
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::assets::KnownAssets;
    use crate::model::{Defaults, Difficulty, Meta};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn catalog(lvl_max: i64, lower: i64, upper: i64, songs: Vec<Song>) -> CatalogDocument {
        CatalogDocument {
            meta: Meta {
                styles: vec!["single".to_string()],
                difficulties: vec![Difficulty {
                    key: "basic".to_string(),
                    color: None,
                }],
                flags: Vec::new(),
                lvl_max,
                uses_draw_groups: false,
            },
            defaults: Defaults {
                style: Some("single".to_string()),
                difficulties: vec!["basic".to_string()],
                flags: Vec::new(),
                lower_lvl_bound: lower,
                upper_lvl_bound: upper,
            },
            i18n: BTreeMap::new(),
            songs,
        }
    }

    fn song(name: &str, chart: Chart) -> Song {
        Song {
            name: name.to_string(),
            artist: None,
            name_translation: None,
            artist_translation: None,
            search_hint: None,
            genre: None,
            folder: None,
            bpm: None,
            jacket: None,
            flags: Vec::new(),
            charts: vec![chart],
        }
    }

    fn chart(lvl: Option<i64>, draw_group: Option<i64>) -> Chart {
        Chart {
            style: "single".to_string(),
            diff_class: "basic".to_string(),
            lvl,
            draw_group,
            step: None,
            shock: None,
            flags: Vec::new(),
        }
    }

    proptest! {
        /// Any catalog whose values all sit inside their limits is clean.
        #[test]
        fn in_range_catalog_is_clean(
            lvl_max in 1i64..40,
            a in 0i64..40,
            b in 0i64..40,
            lvl in 1i64..40,
        ) {
            let (lower, upper) = (a.min(b).min(lvl_max), a.max(b).min(lvl_max));
            let doc = catalog(lvl_max, lower, upper, vec![song("S", chart(Some(lvl.min(lvl_max)), None))]);
            prop_assert!(check_consistency(&doc, &KnownAssets::default()).is_empty());
        }

        /// A non-positive level max is always reported.
        #[test]
        fn low_level_max_reported(lvl_max in -50i64..1) {
            let doc = catalog(lvl_max, 0, 0, Vec::new());
            let errors = check_consistency(&doc, &KnownAssets::default());
            prop_assert!(errors.contains(&ConsistencyError::LevelMaxBelowOne));
        }

        /// Reversed bounds are always reported.
        #[test]
        fn reversed_bounds_reported(upper in 0i64..20, gap in 1i64..20) {
            let doc = catalog(40, upper + gap, upper, Vec::new());
            let errors = check_consistency(&doc, &KnownAssets::default());
            prop_assert!(errors.contains(&ConsistencyError::BoundsReversed));
        }

        /// One missing-translation entry per untranslated key of a secondary locale.
        #[test]
        fn one_entry_per_missing_translation(
            styles in prop::collection::btree_set("[a-z]{3,8}", 1..6),
            translated in prop::collection::vec(any::<bool>(), 6),
        ) {
            let mut doc = catalog(10, 1, 5, Vec::new());
            let styles: Vec<String> = styles.into_iter().collect();
            doc.meta.styles = styles.clone();
            doc.meta.difficulties.clear();
            doc.defaults.difficulties.clear();
            doc.defaults.style = None;

            let mut en = LocaleStrings::default();
            let mut fr = LocaleStrings::default();
            let mut missing = 0usize;
            for (style, keep) in styles.iter().zip(&translated) {
                en.entries.insert(format!("meta.{style}"), serde_json::json!("x"));
                if *keep {
                    fr.entries.insert(format!("meta.{style}"), serde_json::json!("y"));
                } else {
                    missing += 1;
                }
            }
            doc.i18n.insert("en".to_string(), en);
            doc.i18n.insert("fr".to_string(), fr);

            let errors = check_consistency(&doc, &KnownAssets::default());
            let reported = errors
                .iter()
                .filter(|e| matches!(e, ConsistencyError::MissingTranslation { locale, .. } if locale == "fr"))
                .count();
            prop_assert_eq!(reported, missing);
            prop_assert_eq!(errors.len(), missing);
        }

        /// Draw-group catalogs report every chart lacking a draw group.
        #[test]
        fn missing_draw_group_reported(name in "[A-Za-z ]{1,20}", lvl in prop::option::of(1i64..20)) {
            let mut doc = catalog(20, 1, 5, vec![song(&name, chart(lvl, None))]);
            doc.meta.uses_draw_groups = true;
            let errors = check_consistency(&doc, &KnownAssets::default());
            prop_assert_eq!(errors, vec![ConsistencyError::MissingDrawGroup { song: name }]);
        }
    }
}
