use crate::error::MigrationResult;
use crate::models::{
    ContentShape, MenuLocations, NewLanguage, ObjectKind, ObjectScope, PolylangSettings,
    SourceLanguage, StringCatalog, StringTranslationRow, TargetLanguage, TranslationRow,
    UnassignedObjects,
};
use crate::processing::BatchCursor;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A term-taxonomy row to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTermTaxonomy {
    pub term_id: i64,
    pub taxonomy: String,
    pub description: String,
    pub count: i64,
}

/// Read side: the WPML tables of the source site.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Decoded `icl_sitepress_settings`; `None` when the option is absent.
    async fn settings(&self) -> MigrationResult<Option<JsonValue>>;

    /// Active languages with their native names, in discovery order.
    async fn languages(&self) -> MigrationResult<Vec<SourceLanguage>>;

    /// Number of distinct translation groups of a content shape.
    async fn count_groups(&self, shape: &ContentShape) -> MigrationResult<u64>;

    /// One page of distinct group ids, ordered by id.
    async fn group_ids(&self, shape: &ContentShape, cursor: &BatchCursor)
        -> MigrationResult<Vec<i64>>;

    /// Member rows of the given groups. For taxonomies `object_id` is the term id.
    async fn translations(
        &self,
        shape: &ContentShape,
        trids: &[i64],
    ) -> MigrationResult<Vec<TranslationRow>>;

    /// Every `nav_menu` translation row.
    async fn menu_translations(&self) -> MigrationResult<Vec<TranslationRow>>;

    /// String domains that the target manages itself (`.mo` backed).
    async fn excluded_string_domains(&self) -> MigrationResult<Vec<String>>;

    async fn count_string_translations(&self, excluded: &[String]) -> MigrationResult<u64>;

    /// One page of string translations, ordered by translation id.
    async fn string_translations(
        &self,
        excluded: &[String],
        cursor: &BatchCursor,
    ) -> MigrationResult<Vec<StringTranslationRow>>;
}

/// Generic term primitives of the target schema used by the group linker.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Insert `(object_id, term_taxonomy_id)` rows, ignoring existing ones.
    /// Returns the number of rows actually inserted.
    async fn insert_term_relationships(&self, rows: &[(i64, i64)]) -> MigrationResult<u64>;

    /// `slug -> term_id` for the slugs that already exist.
    async fn find_terms_by_slug(&self, slugs: &[String]) -> MigrationResult<HashMap<String, i64>>;

    /// Insert one term per slug, using the slug as name.
    async fn insert_terms(&self, slugs: &[String]) -> MigrationResult<()>;

    /// `slug -> term_taxonomy_id` for terms carrying `taxonomy`.
    async fn find_term_taxonomies(
        &self,
        taxonomy: &str,
        slugs: &[String],
    ) -> MigrationResult<HashMap<String, i64>>;

    async fn insert_term_taxonomies(&self, rows: &[NewTermTaxonomy]) -> MigrationResult<()>;
}

/// Write side: the Polylang model of the target site.
#[async_trait]
pub trait TargetStore: TermStore {
    /// Fails when the target cannot be reached.
    async fn health_check(&self) -> MigrationResult<()>;

    /// Existing languages ordered by `term_group`.
    async fn languages(&self) -> MigrationResult<Vec<TargetLanguage>>;

    /// Create the `language` and `term_language` terms of one language.
    async fn create_language(&self, language: &NewLanguage) -> MigrationResult<TargetLanguage>;

    /// Create the missing `term_language` term of an existing language and
    /// return its term taxonomy id.
    async fn create_term_language(&self, language: &TargetLanguage) -> MigrationResult<i64>;

    /// Remove `term_translations` groups and the default category language
    /// left behind by language creation.
    async fn cleanup_after_language_creation(&self) -> MigrationResult<()>;

    async fn settings(&self) -> MigrationResult<PolylangSettings>;

    async fn save_settings(&self, settings: &PolylangSettings) -> MigrationResult<()>;

    /// Menu locations of the active theme; `None` when the theme has none.
    async fn nav_menu_locations(&self) -> MigrationResult<Option<MenuLocations>>;

    /// Up to `limit` posts and `limit` terms in scope without a language.
    async fn objects_without_language(
        &self,
        scope: &ObjectScope,
        limit: u32,
    ) -> MigrationResult<UnassignedObjects>;

    async fn assign_language(
        &self,
        kind: ObjectKind,
        ids: &[i64],
        language: &TargetLanguage,
    ) -> MigrationResult<()>;

    async fn load_catalog(&self, language: &TargetLanguage) -> MigrationResult<StringCatalog>;

    async fn save_catalog(
        &self,
        language: &TargetLanguage,
        catalog: &StringCatalog,
    ) -> MigrationResult<()>;

    /// Recompute the object counts of the language terms.
    async fn finalize(&self) -> MigrationResult<()>;
}
