//! Source and target settings documents.
//!
//! Both are stored as PHP-serialized blobs in the options table and handled
//! here as JSON values after decoding.

use crate::constants::{
    BUILTIN_POST_TYPES, BUILTIN_TAXONOMIES, EXCLUDED_POST_TYPES, EXCLUDED_TAXONOMIES,
};
use crate::error::{MigrationError, MigrationResult};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Snapshot of the source plugin settings used by the migration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WpmlSettings {
    pub default_language: String,
    pub languages_order: Vec<String>,
    /// Keys of `custom_posts_sync_option`
    pub synced_post_types: Vec<String>,
    /// Keys of `taxonomies_sync_option`
    pub synced_taxonomies: Vec<String>,
}

impl WpmlSettings {
    pub fn from_json(value: &JsonValue) -> MigrationResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            MigrationError::PreconditionFailed("source settings are not a key-value map".into())
        })?;

        let default_language = object
            .get("default_language")
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                MigrationError::PreconditionFailed(
                    "source settings have no default language".into(),
                )
            })?
            .to_string();

        let languages_order = match object.get("languages_order") {
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect(),
            Some(JsonValue::Object(map)) => map
                .values()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            default_language,
            languages_order,
            synced_post_types: string_keys(object.get("custom_posts_sync_option")),
            synced_taxonomies: string_keys(object.get("taxonomies_sync_option")),
        })
    }

    /// Post types whose translation groups are migrated, in processing order.
    pub fn translated_post_types(&self) -> Vec<String> {
        merge_types(BUILTIN_POST_TYPES, &self.synced_post_types, EXCLUDED_POST_TYPES)
    }

    /// Taxonomies whose translation groups are migrated, in processing order.
    pub fn translated_taxonomies(&self) -> Vec<String> {
        merge_types(BUILTIN_TAXONOMIES, &self.synced_taxonomies, EXCLUDED_TAXONOMIES)
    }
}

/// Non-numeric keys of a sync option map. Integer keys come from PHP lists and
/// never name a type.
fn string_keys(value: Option<&JsonValue>) -> Vec<String> {
    match value {
        Some(JsonValue::Object(map)) => map
            .keys()
            .filter(|k| k.parse::<i64>().is_err())
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

fn merge_types(builtin: &[&str], synced: &[String], excluded: &[&str]) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for t in builtin.iter().map(|s| s.to_string()).chain(synced.iter().cloned()) {
        if !types.contains(&t) && !excluded.contains(&t.as_str()) {
            types.push(t);
        }
    }
    types
}

/// The target plugin settings document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylangSettings {
    values: Map<String, JsonValue>,
}

impl PolylangSettings {
    /// Anything but an object (missing option, empty PHP array) starts empty.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.values.clone())
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    pub fn default_language(&self) -> Option<&str> {
        self.values.get("default_lang").and_then(JsonValue::as_str)
    }

    pub fn set_default_language(&mut self, code: &str) {
        self.values
            .insert("default_lang".into(), JsonValue::String(code.to_string()));
    }

    /// Set `nav_menus[theme][location][language] = menu_id`.
    pub fn set_nav_menu(&mut self, theme: &str, location: &str, language: &str, menu_id: i64) {
        let nav_menus = object_entry(&mut self.values, "nav_menus");
        let theme_menus = object_entry(nav_menus, theme);
        let location_menus = object_entry(theme_menus, location);
        location_menus.insert(language.to_string(), JsonValue::from(menu_id));
    }

    pub fn nav_menu(&self, theme: &str, location: &str, language: &str) -> Option<i64> {
        self.values
            .get("nav_menus")?
            .get(theme)?
            .get(location)?
            .get(language)?
            .as_i64()
    }
}

/// Menu locations of the active theme: `location -> menu term id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuLocations {
    pub theme: String,
    pub locations: BTreeMap<String, i64>,
}

/// Child object at `key`, replacing any non-object value (PHP empty arrays
/// decode as JSON lists).
fn object_entry<'a>(
    map: &'a mut Map<String, JsonValue>,
    key: &str,
) -> &'a mut Map<String, JsonValue> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if !entry.is_object() {
        *entry = JsonValue::Object(Map::new());
    }
    match entry {
        JsonValue::Object(child) => child,
        _ => unreachable!("entry was just replaced by an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wpml_settings_requires_default_language() {
        let err = WpmlSettings::from_json(&json!({"languages_order": ["fr"]})).unwrap_err();
        assert!(err.is_precondition());
        assert!(WpmlSettings::from_json(&json!("nope")).is_err());
    }

    #[test]
    fn test_translated_post_types() {
        let settings = WpmlSettings::from_json(&json!({
            "default_language": "en",
            "custom_posts_sync_option": {"product": 1, "page": 1, "wp_template": 1, "0": 1}
        }))
        .unwrap();
        assert_eq!(
            settings.translated_post_types(),
            vec!["post", "page", "wp_block", "product"]
        );
    }

    #[test]
    fn test_translated_taxonomies() {
        let settings = WpmlSettings::from_json(&json!({
            "default_language": "en",
            "languages_order": ["fr", "en"],
            "taxonomies_sync_option": {"product_cat": 1, "wp_theme": 1}
        }))
        .unwrap();
        assert_eq!(
            settings.translated_taxonomies(),
            vec!["category", "post_tag", "product_cat"]
        );
        assert_eq!(settings.languages_order, vec!["fr", "en"]);
    }

    #[test]
    fn test_polylang_nav_menus_replace_empty_lists() {
        let mut settings = PolylangSettings::from_json(json!({"nav_menus": [], "rewrite": 1}));
        settings.set_nav_menu("twentytwenty", "primary", "fr", 12);
        settings.set_nav_menu("twentytwenty", "primary", "en", 11);
        assert_eq!(settings.nav_menu("twentytwenty", "primary", "fr"), Some(12));
        assert_eq!(settings.get("rewrite"), Some(&json!(1)));
    }

    #[test]
    fn test_polylang_default_language() {
        let mut settings = PolylangSettings::from_json(JsonValue::Null);
        assert_eq!(settings.default_language(), None);
        settings.set_default_language("en");
        assert_eq!(settings.default_language(), Some("en"));
    }
}
