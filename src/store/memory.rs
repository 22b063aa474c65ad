//! In-process stores.
//!
//! [`InMemorySource`] is built once and read-only afterwards. [`InMemoryTarget`]
//! models the subset of the WordPress term tables the migration writes to:
//! terms, term-taxonomies and term relationships, plus posts, the target
//! settings document and per-language string catalogs.

use super::traits::{NewTermTaxonomy, SourceStore, TargetStore, TermStore};
use crate::codec::php::PhpValue;
use crate::constants::taxonomies::{
    LANGUAGE, TERM_LANGUAGE, TERM_LANGUAGE_SLUG_PREFIX, TERM_TRANSLATIONS,
};
use crate::constants::NAV_MENU_TAXONOMY;
use crate::error::{MigrationError, MigrationResult};
use crate::models::{
    ContentShape, MenuLocations, NewLanguage, ObjectKind, ObjectScope, PolylangSettings,
    SourceLanguage, StringCatalog, StringTranslationRow, TargetLanguage, TranslationRow,
    UnassignedObjects,
};
use crate::processing::BatchCursor;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet, HashMap};

fn page<T: Clone>(items: &[T], cursor: &BatchCursor) -> Vec<T> {
    let offset = usize::try_from(cursor.offset()).unwrap_or(usize::MAX);
    items
        .iter()
        .skip(offset)
        .take(cursor.limit() as usize)
        .cloned()
        .collect()
}

/// Source tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    settings: Option<JsonValue>,
    languages: Vec<SourceLanguage>,
    /// `(element_type, row)`
    translations: Vec<(String, TranslationRow)>,
    /// `(domain, row)`
    strings: Vec<(String, StringTranslationRow)>,
    mo_domains: Vec<String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: JsonValue) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_language(mut self, code: &str, locale: &str, name: &str) -> Self {
        self.languages.push(SourceLanguage {
            code: code.to_string(),
            locale: locale.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_translation(
        self,
        element_type: &str,
        trid: i64,
        language: &str,
        object_id: i64,
    ) -> Self {
        self.with_translation_row(element_type, TranslationRow::new(trid, language, object_id))
    }

    pub fn with_translation_row(mut self, element_type: &str, row: TranslationRow) -> Self {
        self.translations.push((element_type.to_string(), row));
        self
    }

    pub fn with_string(
        mut self,
        domain: &str,
        source: &str,
        language: &str,
        translation: &str,
    ) -> Self {
        self.strings.push((
            domain.to_string(),
            StringTranslationRow::new(source, language, translation),
        ));
        self
    }

    pub fn with_mo_domain(mut self, domain: &str) -> Self {
        self.mo_domains.push(domain.to_string());
        self
    }

    fn rows_of<'a>(
        &'a self,
        element_type: &'a str,
    ) -> impl Iterator<Item = &'a TranslationRow> + 'a {
        self.translations
            .iter()
            .filter(move |(et, _)| et == element_type)
            .map(|(_, row)| row)
    }

    fn distinct_trids(&self, shape: &ContentShape) -> Vec<i64> {
        let element_type = shape.element_type();
        self.rows_of(&element_type)
            .filter_map(|row| row.trid)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn visible_strings(&self, excluded: &[String]) -> Vec<StringTranslationRow> {
        self.strings
            .iter()
            .filter(|(domain, _)| !excluded.contains(domain))
            .map(|(_, row)| row.clone())
            .collect()
    }
}

#[async_trait]
impl SourceStore for InMemorySource {
    async fn settings(&self) -> MigrationResult<Option<JsonValue>> {
        Ok(self.settings.clone())
    }

    async fn languages(&self) -> MigrationResult<Vec<SourceLanguage>> {
        Ok(self.languages.clone())
    }

    async fn count_groups(&self, shape: &ContentShape) -> MigrationResult<u64> {
        Ok(self.distinct_trids(shape).len() as u64)
    }

    async fn group_ids(
        &self,
        shape: &ContentShape,
        cursor: &BatchCursor,
    ) -> MigrationResult<Vec<i64>> {
        Ok(page(&self.distinct_trids(shape), cursor))
    }

    async fn translations(
        &self,
        shape: &ContentShape,
        trids: &[i64],
    ) -> MigrationResult<Vec<TranslationRow>> {
        let element_type = shape.element_type();
        Ok(self
            .rows_of(&element_type)
            .filter(|row| row.trid.is_some_and(|t| trids.contains(&t)))
            .cloned()
            .collect())
    }

    async fn menu_translations(&self) -> MigrationResult<Vec<TranslationRow>> {
        let element_type = ContentShape::Taxonomy(NAV_MENU_TAXONOMY.to_string()).element_type();
        Ok(self.rows_of(&element_type).cloned().collect())
    }

    async fn excluded_string_domains(&self) -> MigrationResult<Vec<String>> {
        Ok(self.mo_domains.clone())
    }

    async fn count_string_translations(&self, excluded: &[String]) -> MigrationResult<u64> {
        Ok(self.visible_strings(excluded).len() as u64)
    }

    async fn string_translations(
        &self,
        excluded: &[String],
        cursor: &BatchCursor,
    ) -> MigrationResult<Vec<StringTranslationRow>> {
        Ok(page(&self.visible_strings(excluded), cursor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRow {
    pub term_id: i64,
    pub name: String,
    pub slug: String,
    pub term_group: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermTaxonomyRow {
    pub term_taxonomy_id: i64,
    pub term_id: i64,
    pub taxonomy: String,
    pub description: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub kind: ObjectKind,
    pub ids: Vec<i64>,
    pub language: String,
}

#[derive(Debug)]
struct TargetState {
    available: bool,
    next_term_id: i64,
    next_term_taxonomy_id: i64,
    terms: BTreeMap<i64, TermRow>,
    term_taxonomies: BTreeMap<i64, TermTaxonomyRow>,
    relationships: BTreeSet<(i64, i64)>,
    /// `post_id -> post_type`
    posts: BTreeMap<i64, String>,
    settings: PolylangSettings,
    menu_locations: Option<MenuLocations>,
    default_category: Option<i64>,
    catalogs: HashMap<String, StringCatalog>,
    assignments: Vec<Assignment>,
    finalized: bool,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            available: true,
            next_term_id: 1,
            next_term_taxonomy_id: 1,
            terms: BTreeMap::new(),
            term_taxonomies: BTreeMap::new(),
            relationships: BTreeSet::new(),
            posts: BTreeMap::new(),
            settings: PolylangSettings::default(),
            menu_locations: None,
            default_category: None,
            catalogs: HashMap::new(),
            assignments: Vec::new(),
            finalized: false,
        }
    }
}

impl TargetState {
    fn insert_term(&mut self, name: &str, slug: &str, term_group: i64) -> i64 {
        let term_id = self.next_term_id;
        self.next_term_id += 1;
        self.terms.insert(
            term_id,
            TermRow {
                term_id,
                name: name.to_string(),
                slug: slug.to_string(),
                term_group,
            },
        );
        term_id
    }

    fn insert_term_taxonomy(
        &mut self,
        term_id: i64,
        taxonomy: &str,
        description: &str,
        count: i64,
    ) -> i64 {
        let term_taxonomy_id = self.next_term_taxonomy_id;
        self.next_term_taxonomy_id += 1;
        self.term_taxonomies.insert(
            term_taxonomy_id,
            TermTaxonomyRow {
                term_taxonomy_id,
                term_id,
                taxonomy: taxonomy.to_string(),
                description: description.to_string(),
                count,
            },
        );
        term_taxonomy_id
    }

    fn term_taxonomy_of(&self, term_id: i64, taxonomy: &str) -> Option<&TermTaxonomyRow> {
        self.term_taxonomies
            .values()
            .find(|tt| tt.term_id == term_id && tt.taxonomy == taxonomy)
    }

    fn create_language(&mut self, language: &NewLanguage) -> MigrationResult<TargetLanguage> {
        if self.languages().iter().any(|l| l.code == language.slug) {
            return Err(MigrationError::Database(format!(
                "language {} already exists",
                language.slug
            )));
        }
        let term_id = self.insert_term(&language.name, &language.slug, language.term_group);
        let term_taxonomy_id =
            self.insert_term_taxonomy(term_id, LANGUAGE, &language.description(), 0);

        let tl_term_taxonomy_id = self.create_term_language(&language.slug, &language.name);

        Ok(TargetLanguage {
            code: language.slug.clone(),
            name: language.name.clone(),
            locale: language.locale.clone(),
            term_id,
            term_taxonomy_id,
            tl_term_taxonomy_id,
        })
    }

    fn create_term_language(&mut self, code: &str, name: &str) -> i64 {
        let tl_slug = format!("{TERM_LANGUAGE_SLUG_PREFIX}{code}");
        let tl_term_id = self.insert_term(name, &tl_slug, 0);
        self.insert_term_taxonomy(tl_term_id, TERM_LANGUAGE, "", 0)
    }

    fn languages(&self) -> Vec<TargetLanguage> {
        let mut languages: Vec<(i64, TargetLanguage)> = self
            .term_taxonomies
            .values()
            .filter(|tt| tt.taxonomy == LANGUAGE)
            .filter_map(|tt| {
                let term = self.terms.get(&tt.term_id)?;
                let tl_slug = format!("{TERM_LANGUAGE_SLUG_PREFIX}{}", term.slug);
                let tl_term_taxonomy_id = self
                    .term_taxonomies
                    .values()
                    .find(|other| {
                        other.taxonomy == TERM_LANGUAGE
                            && self.terms.get(&other.term_id).is_some_and(|t| t.slug == tl_slug)
                    })
                    .map_or(0, |other| other.term_taxonomy_id);
                let locale = PhpValue::decode(&tt.description)
                    .ok()
                    .and_then(|d| d.get("locale").and_then(PhpValue::as_str).map(str::to_string))
                    .unwrap_or_default();
                Some((
                    term.term_group,
                    TargetLanguage {
                        code: term.slug.clone(),
                        name: term.name.clone(),
                        locale,
                        term_id: term.term_id,
                        term_taxonomy_id: tt.term_taxonomy_id,
                        tl_term_taxonomy_id,
                    },
                ))
            })
            .collect();
        languages.sort_by_key(|(group, lang)| (*group, lang.term_id));
        languages.into_iter().map(|(_, lang)| lang).collect()
    }

    fn has_language(&self, object_id: i64, taxonomy: &str) -> bool {
        self.relationships.iter().any(|(object, tt_id)| {
            *object == object_id
                && self
                    .term_taxonomies
                    .get(tt_id)
                    .is_some_and(|tt| tt.taxonomy == taxonomy)
        })
    }
}

/// Target tables held in memory. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryTarget {
    state: Mutex<TargetState>,
}

impl InMemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// A target whose health check fails.
    pub fn unavailable() -> Self {
        let target = Self::new();
        target.state.lock().available = false;
        target
    }

    pub fn with_post(mut self, post_id: i64, post_type: &str) -> Self {
        self.state.get_mut().posts.insert(post_id, post_type.to_string());
        self
    }

    /// Add a term of `taxonomy` with a fixed id.
    pub fn with_term(mut self, term_id: i64, slug: &str, taxonomy: &str) -> Self {
        let state = self.state.get_mut();
        state.terms.insert(
            term_id,
            TermRow {
                term_id,
                name: slug.to_string(),
                slug: slug.to_string(),
                term_group: 0,
            },
        );
        state.next_term_id = state.next_term_id.max(term_id + 1);
        state.insert_term_taxonomy(term_id, taxonomy, "", 0);
        self
    }

    pub fn with_language(mut self, language: &NewLanguage) -> MigrationResult<Self> {
        self.state.get_mut().create_language(language)?;
        Ok(self)
    }

    pub fn with_settings(mut self, settings: PolylangSettings) -> Self {
        self.state.get_mut().settings = settings;
        self
    }

    pub fn with_menu_locations(mut self, theme: &str, locations: &[(&str, i64)]) -> Self {
        self.state.get_mut().menu_locations = Some(MenuLocations {
            theme: theme.to_string(),
            locations: locations
                .iter()
                .map(|(location, id)| (location.to_string(), *id))
                .collect(),
        });
        self
    }

    pub fn with_default_category(mut self, term_id: i64) -> Self {
        self.state.get_mut().default_category = Some(term_id);
        self
    }

    pub fn with_catalog(mut self, language: &str, catalog: StringCatalog) -> Self {
        self.state.get_mut().catalogs.insert(language.to_string(), catalog);
        self
    }

    pub fn with_relationship(mut self, object_id: i64, term_taxonomy_id: i64) -> Self {
        self.state
            .get_mut()
            .relationships
            .insert((object_id, term_taxonomy_id));
        self
    }

    pub fn terms_with_slug(&self, slug: &str) -> Vec<TermRow> {
        self.state
            .lock()
            .terms
            .values()
            .filter(|t| t.slug == slug)
            .cloned()
            .collect()
    }

    pub fn term_taxonomies(&self, taxonomy: &str) -> Vec<TermTaxonomyRow> {
        self.state
            .lock()
            .term_taxonomies
            .values()
            .filter(|tt| tt.taxonomy == taxonomy)
            .cloned()
            .collect()
    }

    pub fn relationships(&self) -> Vec<(i64, i64)> {
        self.state.lock().relationships.iter().copied().collect()
    }

    pub fn has_relationship(&self, object_id: i64, term_taxonomy_id: i64) -> bool {
        self.state
            .lock()
            .relationships
            .contains(&(object_id, term_taxonomy_id))
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        self.state.lock().assignments.clone()
    }

    pub fn catalog(&self, language: &str) -> Option<StringCatalog> {
        self.state.lock().catalogs.get(language).cloned()
    }

    pub fn current_settings(&self) -> PolylangSettings {
        self.state.lock().settings.clone()
    }

    pub fn target_languages(&self) -> Vec<TargetLanguage> {
        self.state.lock().languages()
    }

    pub fn is_finalized(&self) -> bool {
        self.state.lock().finalized
    }
}

#[async_trait]
impl TermStore for InMemoryTarget {
    async fn insert_term_relationships(&self, rows: &[(i64, i64)]) -> MigrationResult<u64> {
        let mut state = self.state.lock();
        let inserted = rows
            .iter()
            .filter(|row| state.relationships.insert(**row))
            .count();
        Ok(inserted as u64)
    }

    async fn find_terms_by_slug(&self, slugs: &[String]) -> MigrationResult<HashMap<String, i64>> {
        let state = self.state.lock();
        let mut found = HashMap::new();
        for term in state.terms.values().filter(|t| slugs.contains(&t.slug)) {
            found.entry(term.slug.clone()).or_insert(term.term_id);
        }
        Ok(found)
    }

    async fn insert_terms(&self, slugs: &[String]) -> MigrationResult<()> {
        let mut state = self.state.lock();
        for slug in slugs {
            state.insert_term(slug, slug, 0);
        }
        Ok(())
    }

    async fn find_term_taxonomies(
        &self,
        taxonomy: &str,
        slugs: &[String],
    ) -> MigrationResult<HashMap<String, i64>> {
        let state = self.state.lock();
        Ok(state
            .term_taxonomies
            .values()
            .filter(|tt| tt.taxonomy == taxonomy)
            .filter_map(|tt| {
                let term = state.terms.get(&tt.term_id)?;
                slugs
                    .contains(&term.slug)
                    .then(|| (term.slug.clone(), tt.term_taxonomy_id))
            })
            .collect())
    }

    async fn insert_term_taxonomies(&self, rows: &[NewTermTaxonomy]) -> MigrationResult<()> {
        let mut state = self.state.lock();
        for row in rows {
            state.insert_term_taxonomy(row.term_id, &row.taxonomy, &row.description, row.count);
        }
        Ok(())
    }
}

#[async_trait]
impl TargetStore for InMemoryTarget {
    async fn health_check(&self) -> MigrationResult<()> {
        if self.state.lock().available {
            Ok(())
        } else {
            Err(MigrationError::Database("target store is unavailable".into()))
        }
    }

    async fn languages(&self) -> MigrationResult<Vec<TargetLanguage>> {
        Ok(self.state.lock().languages())
    }

    async fn create_language(&self, language: &NewLanguage) -> MigrationResult<TargetLanguage> {
        self.state.lock().create_language(language)
    }

    async fn create_term_language(&self, language: &TargetLanguage) -> MigrationResult<i64> {
        Ok(self
            .state
            .lock()
            .create_term_language(&language.code, &language.name))
    }

    async fn cleanup_after_language_creation(&self) -> MigrationResult<()> {
        let mut state = self.state.lock();
        let groups: Vec<(i64, i64)> = state
            .term_taxonomies
            .values()
            .filter(|tt| tt.taxonomy == TERM_TRANSLATIONS)
            .map(|tt| (tt.term_taxonomy_id, tt.term_id))
            .collect();
        for (tt_id, term_id) in groups {
            state.term_taxonomies.remove(&tt_id);
            state.terms.remove(&term_id);
            state.relationships.retain(|(_, rel)| *rel != tt_id);
        }

        if let Some(category) = state.default_category {
            let term_language_ids: BTreeSet<i64> = state
                .term_taxonomies
                .values()
                .filter(|tt| tt.taxonomy == TERM_LANGUAGE)
                .map(|tt| tt.term_taxonomy_id)
                .collect();
            state.relationships.retain(|(object, tt_id)| {
                !(*object == category && term_language_ids.contains(tt_id))
            });
        }
        Ok(())
    }

    async fn settings(&self) -> MigrationResult<PolylangSettings> {
        Ok(self.state.lock().settings.clone())
    }

    async fn save_settings(&self, settings: &PolylangSettings) -> MigrationResult<()> {
        self.state.lock().settings = settings.clone();
        Ok(())
    }

    async fn nav_menu_locations(&self) -> MigrationResult<Option<MenuLocations>> {
        Ok(self.state.lock().menu_locations.clone())
    }

    async fn objects_without_language(
        &self,
        scope: &ObjectScope,
        limit: u32,
    ) -> MigrationResult<UnassignedObjects> {
        let state = self.state.lock();
        let limit = limit as usize;

        let posts = state
            .posts
            .iter()
            .filter(|(_, post_type)| scope.post_types.contains(post_type))
            .map(|(id, _)| *id)
            .filter(|id| !state.has_language(*id, LANGUAGE))
            .take(limit)
            .collect();

        let terms = state
            .term_taxonomies
            .values()
            .filter(|tt| scope.taxonomies.contains(&tt.taxonomy))
            .map(|tt| tt.term_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|id| !state.has_language(*id, TERM_LANGUAGE))
            .take(limit)
            .collect();

        Ok(UnassignedObjects { posts, terms })
    }

    async fn assign_language(
        &self,
        kind: ObjectKind,
        ids: &[i64],
        language: &TargetLanguage,
    ) -> MigrationResult<()> {
        let mut state = self.state.lock();
        let term_taxonomy_id = match kind {
            ObjectKind::Post => language.term_taxonomy_id,
            ObjectKind::Term => language.tl_term_taxonomy_id,
        };
        for id in ids {
            state.relationships.insert((*id, term_taxonomy_id));
        }
        state.assignments.push(Assignment {
            kind,
            ids: ids.to_vec(),
            language: language.code.clone(),
        });
        Ok(())
    }

    async fn load_catalog(&self, language: &TargetLanguage) -> MigrationResult<StringCatalog> {
        Ok(self
            .state
            .lock()
            .catalogs
            .get(&language.code)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_catalog(
        &self,
        language: &TargetLanguage,
        catalog: &StringCatalog,
    ) -> MigrationResult<()> {
        self.state
            .lock()
            .catalogs
            .insert(language.code.clone(), catalog.clone());
        Ok(())
    }

    async fn finalize(&self) -> MigrationResult<()> {
        let mut state = self.state.lock();
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for (_, tt_id) in &state.relationships {
            *counts.entry(*tt_id).or_default() += 1;
        }
        for tt in state
            .term_taxonomies
            .values_mut()
            .filter(|tt| tt.taxonomy == LANGUAGE || tt.taxonomy == TERM_LANGUAGE)
        {
            tt.count = counts.get(&tt.term_taxonomy_id).copied().unwrap_or(0);
        }
        state.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn french() -> NewLanguage {
        NewLanguage::from_source(
            &SourceLanguage {
                code: "fr".into(),
                locale: "fr_FR".into(),
                name: "Français".into(),
            },
            0,
        )
    }

    #[tokio::test]
    async fn test_source_pages_distinct_groups_in_order() {
        let source = InMemorySource::new()
            .with_translation("post_post", 9, "en", 1)
            .with_translation("post_post", 9, "fr", 2)
            .with_translation("post_post", 4, "en", 3)
            .with_translation("post_page", 5, "en", 4);
        let shape = ContentShape::PostType("post".into());

        assert_eq!(source.count_groups(&shape).await.unwrap(), 2);
        let first = BatchCursor::first(1);
        assert_eq!(source.group_ids(&shape, &first).await.unwrap(), vec![4]);
        assert_eq!(source.group_ids(&shape, &first.next()).await.unwrap(), vec![9]);
        assert!(source
            .group_ids(&shape, &first.next().next())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(source.translations(&shape, &[9]).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_string_domains_are_excluded() {
        let source = InMemorySource::new()
            .with_string("theme", "Hello", "fr", "Bonjour")
            .with_string("plugin-mo", "Yes", "fr", "Oui");
        let excluded = vec!["plugin-mo".to_string()];
        assert_eq!(source.count_string_translations(&excluded).await.unwrap(), 1);
        assert_eq!(source.count_string_translations(&[]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_language_creation_uses_both_taxonomies() {
        let target = InMemoryTarget::new();
        let created = target.create_language(&french()).await.unwrap();
        assert_ne!(created.term_taxonomy_id, created.tl_term_taxonomy_id);

        let languages = target.languages().await.unwrap();
        assert_eq!(languages, vec![created]);
        assert_eq!(languages[0].locale, "fr_FR");
        assert_eq!(target.terms_with_slug("pll_fr").len(), 1);
        assert!(target.create_language(&french()).await.is_err());
    }

    #[tokio::test]
    async fn test_relationship_inserts_ignore_duplicates() {
        let target = InMemoryTarget::new();
        assert_eq!(target.insert_term_relationships(&[(1, 2), (1, 3)]).await.unwrap(), 2);
        assert_eq!(target.insert_term_relationships(&[(1, 2)]).await.unwrap(), 0);
        assert_eq!(target.relationships(), vec![(1, 2), (1, 3)]);
    }

    #[tokio::test]
    async fn test_objects_without_language_respects_scope() {
        let target = InMemoryTarget::new()
            .with_post(1, "post")
            .with_post(2, "post")
            .with_post(3, "attachment")
            .with_term(40, "news", "category");
        let fr = target.create_language(&french()).await.unwrap();
        target.assign_language(ObjectKind::Post, &[1], &fr).await.unwrap();

        let scope = ObjectScope {
            post_types: vec!["post".into()],
            taxonomies: vec!["category".into()],
        };
        let unassigned = target.objects_without_language(&scope, 10).await.unwrap();
        assert_eq!(unassigned.posts, vec![2]);
        assert_eq!(unassigned.terms, vec![40]);
    }

    #[tokio::test]
    async fn test_cleanup_removes_term_groups_and_default_category_language() {
        let target = InMemoryTarget::new()
            .with_term(1, "uncategorized", "category")
            .with_default_category(1);
        let fr = target.create_language(&french()).await.unwrap();
        target.insert_terms(&["pll_abc".to_string()]).await.unwrap();
        let found = target
            .find_terms_by_slug(&["pll_abc".to_string()])
            .await
            .unwrap();
        let group_term = found["pll_abc"];
        target
            .insert_term_taxonomies(&[NewTermTaxonomy {
                term_id: group_term,
                taxonomy: TERM_TRANSLATIONS.into(),
                description: "a:0:{}".into(),
                count: 0,
            }])
            .await
            .unwrap();
        target.assign_language(ObjectKind::Term, &[1], &fr).await.unwrap();

        target.cleanup_after_language_creation().await.unwrap();
        assert!(target.term_taxonomies(TERM_TRANSLATIONS).is_empty());
        assert!(!target.has_relationship(1, fr.tl_term_taxonomy_id));
    }
}
