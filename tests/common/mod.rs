//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;
use wpml_to_polylang::config::MigrationConfig;
use wpml_to_polylang::migration::MigrationRunner;
use wpml_to_polylang::status::InMemoryStatusStore;
use wpml_to_polylang::store::{InMemorySource, InMemoryTarget};

/// Small pages so every processor takes several steps.
pub fn test_config() -> MigrationConfig {
    MigrationConfig::default()
        .with_batch_size(1)
        .with_page_pause_ms(0)
}

pub fn source_settings() -> serde_json::Value {
    json!({
        "default_language": "en",
        "languages_order": ["en", "fr"],
        "custom_posts_sync_option": {"book": "1"},
        "taxonomies_sync_option": {"genre": "1"},
    })
}

/// English and French site: one translated post, one translated category,
/// one translated menu and a few strings.
pub fn bilingual_source() -> InMemorySource {
    InMemorySource::new()
        .with_settings(source_settings())
        .with_language("en", "en_US", "English")
        .with_language("fr", "fr_FR", "Français")
        .with_translation("post_post", 1, "en", 10)
        .with_translation("post_post", 1, "fr", 11)
        .with_translation("tax_category", 2, "en", 20)
        .with_translation("tax_category", 2, "fr", 21)
        .with_translation("tax_nav_menu", 3, "en", 30)
        .with_translation("tax_nav_menu", 3, "fr", 31)
        .with_string("theme", "Hello", "fr", "Bonjour")
        .with_string("plugin", "Yes", "fr", "Oui")
        .with_mo_domain("plugin")
}

/// Target matching [`bilingual_source`]: posts 12 and 13 were never translated.
pub fn bilingual_target() -> InMemoryTarget {
    InMemoryTarget::new()
        .with_post(10, "post")
        .with_post(11, "post")
        .with_post(12, "post")
        .with_post(13, "page")
        .with_term(20, "news", "category")
        .with_term(21, "actualites", "category")
        .with_menu_locations("twentytwenty", &[("primary", 30), ("footer", 0)])
}

pub struct Harness {
    pub source: Arc<InMemorySource>,
    pub target: Arc<InMemoryTarget>,
    pub status: Arc<InMemoryStatusStore>,
    pub runner: MigrationRunner,
}

pub fn harness(config: MigrationConfig, source: InMemorySource, target: InMemoryTarget) -> Harness {
    let source = Arc::new(source);
    let target = Arc::new(target);
    let status = Arc::new(InMemoryStatusStore::new());
    let runner = MigrationRunner::new(config, source.clone(), target.clone(), status.clone());
    Harness {
        source,
        target,
        status,
        runner,
    }
}
