//! # Catalog Model
//!
//! The typed record a catalog document deserializes into once it has passed
//! structural validation. Field names follow the on-disk camelCase keys.
//!
//! The record tolerates unknown fields: how strict a catalog must be is
//! decided by the schema, not by these types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Locale code of the base translation every other locale is checked against.
pub const BASE_LOCALE: &str = "en";

/// Prefix of the translation path for style, difficulty and flag keys.
pub const META_TRANSLATION_PREFIX: &str = "meta.";

/// Key of the abbreviated-difficulty sub-dictionary.
pub const ABBREVIATION_KEY: &str = "$abbr";

/// One catalog document: a game's styles, difficulties, songs and charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Enumerations of valid keys and level limits.
    pub meta: Meta,
    /// Default draw settings offered by the catalog.
    pub defaults: Defaults,
    /// Display strings keyed by locale code.
    pub i18n: BTreeMap<String, LocaleStrings>,
    /// Songs in document order.
    pub songs: Vec<Song>,
}

impl CatalogDocument {
    /// Deserialize a structurally valid JSON value into the typed record.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Total number of charts across all songs.
    pub fn chart_count(&self) -> usize {
        self.songs.iter().map(|s| s.charts.len()).sum()
    }

    /// Locales other than [`BASE_LOCALE`], in sorted order.
    pub fn secondary_locales(&self) -> impl Iterator<Item = (&str, &LocaleStrings)> {
        self.i18n
            .iter()
            .filter(|(code, _)| code.as_str() != BASE_LOCALE)
            .map(|(code, strings)| (code.as_str(), strings))
    }
}

/// Catalog-wide enumerations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Valid chart styles (e.g. `single`, `double`).
    pub styles: Vec<String>,
    /// Valid difficulty classes, easiest first.
    pub difficulties: Vec<Difficulty>,
    /// Valid chart and song flags.
    #[serde(default)]
    pub flags: Vec<String>,
    /// Highest level (or draw group) a chart may carry.
    #[serde(deserialize_with = "integral::deserialize")]
    pub lvl_max: i64,
    /// Charts are grouped by `drawGroup` instead of by `lvl`.
    #[serde(default)]
    pub uses_draw_groups: bool,
}

impl Meta {
    /// Difficulty keys in meta order.
    pub fn difficulty_keys(&self) -> impl Iterator<Item = &str> {
        self.difficulties.iter().map(|d| d.key.as_str())
    }

    /// Union of style, difficulty and flag keys, in meta order, without
    /// duplicates. These are the keys that need display strings.
    pub fn translatable_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        let candidates = self
            .styles
            .iter()
            .map(String::as_str)
            .chain(self.difficulty_keys())
            .chain(self.flags.iter().map(String::as_str));
        for key in candidates {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// A difficulty class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Key referenced by `Chart::diff_class`.
    pub key: String,
    /// Display color, as a CSS color string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Default draw settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub difficulties: Vec<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(deserialize_with = "integral::deserialize")]
    pub lower_lvl_bound: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub upper_lvl_bound: i64,
}

/// Display strings for one locale.
///
/// Entries are either flat (`"meta.single": "Single"`) or nested
/// (`"meta": { "single": "Single" }`); [`LocaleStrings::translation`]
/// resolves both forms. Abbreviations live in `$abbr`, either at the top of
/// the locale or inside `meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleStrings {
    /// Abbreviated difficulty names keyed by difficulty key.
    #[serde(rename = "$abbr", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub abbr: BTreeMap<String, String>,
    /// Every other entry.
    #[serde(flatten)]
    pub entries: serde_json::Map<String, Value>,
}

impl LocaleStrings {
    /// Look up a non-empty display string by dotted path.
    pub fn translation(&self, path: &str) -> Option<&str> {
        if let Some(text) = self.entries.get(path).and_then(Value::as_str) {
            return non_empty(text);
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.entries.get(first)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str().and_then(non_empty)
    }

    /// Display string for a style, difficulty or flag key.
    pub fn meta_translation(&self, key: &str) -> Option<&str> {
        self.translation(&format!("{META_TRANSLATION_PREFIX}{key}"))
    }

    /// Non-empty abbreviation for a difficulty key, from the locale's
    /// top-level `$abbr` or from `meta.$abbr`.
    pub fn abbreviation(&self, key: &str) -> Option<&str> {
        if let Some(text) = self.abbr.get(key).map(String::as_str).and_then(non_empty) {
            return Some(text);
        }
        self.entries
            .get("meta")?
            .get(ABBREVIATION_KEY)?
            .get(key)?
            .as_str()
            .and_then(non_empty)
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// A song and its charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<String>,
    /// Filename of the jacket image, relative to the jackets directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jacket: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    pub charts: Vec<Chart>,
}

/// One playable difficulty variant of a song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub style: String,
    pub diff_class: String,
    /// Numeric level; used when the catalog does not use draw groups.
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub lvl: Option<i64>,
    /// Draw group; required when the catalog uses draw groups.
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub draw_group: Option<i64>,
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub step: Option<u32>,
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub shock: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

/// Schema `integer` admits integral floats such as `15.0`; the typed record
/// accepts them too, so a document that passes the schema always reaches
/// the consistency rules.
mod integral {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Number;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        let n = Number::deserialize(deserializer)?;
        to_integer(&n).ok_or_else(|| D::Error::custom(format!("expected an integer, found {n}")))
    }

    pub fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        match Option::<Number>::deserialize(deserializer)? {
            None => Ok(None),
            Some(n) => to_integer(&n)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected an integer, found {n}"))),
        }
    }

    fn to_integer<T: TryFrom<i64>>(n: &Number) -> Option<T> {
        let i = match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                    return None;
                }
                f as i64
            }
        };
        T::try_from(i).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "meta": {
                "styles": ["single", "double"],
                "difficulties": [
                    {"key": "basic", "color": "#ff0"},
                    {"key": "expert", "color": "#0f0"}
                ],
                "flags": ["unlock"],
                "lvlMax": 19
            },
            "defaults": {
                "style": "single",
                "difficulties": ["expert"],
                "flags": [],
                "lowerLvlBound": 10,
                "upperLvlBound": 14
            },
            "i18n": {
                "en": {
                    "name": "Sample",
                    "meta": {"single": "Single"},
                    "meta.double": "Double",
                    "$abbr": {"basic": "BSP"}
                }
            },
            "songs": [
                {
                    "name": "Paranoia",
                    "artist": "180",
                    "charts": [{"style": "single", "diffClass": "expert", "lvl": 14, "step": 400}]
                }
            ]
        })
    }

    #[test]
    fn deserializes_camel_case_document() {
        let doc = CatalogDocument::from_value(sample()).unwrap();
        assert_eq!(doc.meta.lvl_max, 19);
        assert!(!doc.meta.uses_draw_groups);
        assert_eq!(doc.defaults.upper_lvl_bound, 14);
        assert_eq!(doc.songs[0].charts[0].diff_class, "expert");
        assert_eq!(doc.songs[0].charts[0].lvl, Some(14));
        assert_eq!(doc.chart_count(), 1);
    }

    #[test]
    fn translation_resolves_flat_and_nested_paths() {
        let doc = CatalogDocument::from_value(sample()).unwrap();
        let en = &doc.i18n["en"];
        assert_eq!(en.meta_translation("single"), Some("Single"));
        assert_eq!(en.meta_translation("double"), Some("Double"));
        assert_eq!(en.meta_translation("unlock"), None);
        assert_eq!(en.abbreviation("basic"), Some("BSP"));
        assert_eq!(en.abbreviation("expert"), None);
    }

    #[test]
    fn integral_floats_deserialize_as_integers() {
        let mut v = sample();
        v["meta"]["lvlMax"] = json!(19.0);
        v["defaults"]["lowerLvlBound"] = json!(10.0);
        v["songs"][0]["charts"][0]["lvl"] = json!(15.0);
        v["songs"][0]["charts"][0]["step"] = json!(400.0);

        let doc = CatalogDocument::from_value(v).unwrap();
        assert_eq!(doc.meta.lvl_max, 19);
        assert_eq!(doc.defaults.lower_lvl_bound, 10);
        assert_eq!(doc.songs[0].charts[0].lvl, Some(15));
        assert_eq!(doc.songs[0].charts[0].step, Some(400));
    }

    #[test]
    fn fractional_and_out_of_range_numbers_are_rejected() {
        let mut v = sample();
        v["songs"][0]["charts"][0]["lvl"] = json!(14.5);
        assert!(CatalogDocument::from_value(v).is_err());

        let mut v = sample();
        v["songs"][0]["charts"][0]["step"] = json!(-1);
        assert!(CatalogDocument::from_value(v).is_err());
    }

    #[test]
    fn abbreviation_nested_under_meta() {
        let strings: LocaleStrings = serde_json::from_value(json!({
            "meta": {"basic": "Basic", "$abbr": {"basic": "Bas"}}
        }))
        .unwrap();
        assert_eq!(strings.abbreviation("basic"), Some("Bas"));
        assert_eq!(strings.abbreviation("expert"), None);
    }

    #[test]
    fn empty_translation_counts_as_missing() {
        let strings: LocaleStrings =
            serde_json::from_value(json!({"meta.single": "", "$abbr": {"basic": ""}})).unwrap();
        assert_eq!(strings.meta_translation("single"), None);
        assert_eq!(strings.abbreviation("basic"), None);
    }

    #[test]
    fn translatable_keys_are_deduplicated_in_meta_order() {
        let meta: Meta = serde_json::from_value(json!({
            "styles": ["single", "shared"],
            "difficulties": [{"key": "shared"}, {"key": "hard"}],
            "flags": ["hard", "secret"],
            "lvlMax": 10
        }))
        .unwrap();
        assert_eq!(
            meta.translatable_keys(),
            vec!["single", "shared", "hard", "secret"]
        );
    }

    #[test]
    fn secondary_locales_skip_base() {
        let mut value = sample();
        value["i18n"]["ja"] = json!({"name": "サンプル"});
        value["i18n"]["de"] = json!({"name": "Beispiel"});
        let doc = CatalogDocument::from_value(value).unwrap();
        let codes: Vec<&str> = doc.secondary_locales().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["de", "ja"]);
    }

    #[test]
    fn rejects_non_array_songs() {
        let mut value = sample();
        value["songs"] = json!("nope");
        assert!(CatalogDocument::from_value(value).is_err());
    }
}
