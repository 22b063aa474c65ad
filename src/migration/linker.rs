//! Translation group linking.
//!
//! One page of translation groups becomes, in the target model:
//!
//! 1. a language relation per member whose language is known,
//! 2. one group term per group (slug and name `pll_wpml_<trid>`),
//! 3. one group term-taxonomy holding the serialized `{language: object}` map,
//! 4. a relationship from every member to its group term-taxonomy.
//!
//! Steps 2 to 4 depend on ids produced by the previous step and run in that
//! order. Existing group terms and term-taxonomies are looked up first, so a
//! page can be linked again after an interrupted run without duplicating
//! groups.

use crate::error::{MigrationError, MigrationResult};
use crate::models::{LanguageTermIndex, TranslationGroups};
use crate::store::{NewTermTaxonomy, TermStore};
use std::collections::BTreeSet;
use tracing::debug;

/// What one `link_page` call wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub groups: usize,
    pub language_relations: u64,
    pub terms_created: usize,
    pub term_taxonomies_created: usize,
    pub group_relations: u64,
}

#[derive(Debug, Clone)]
pub struct TranslationGroupLinker {
    group_taxonomy: String,
    index: LanguageTermIndex,
}

impl TranslationGroupLinker {
    pub fn new(group_taxonomy: impl Into<String>, index: LanguageTermIndex) -> Self {
        Self {
            group_taxonomy: group_taxonomy.into(),
            index,
        }
    }

    pub fn group_taxonomy(&self) -> &str {
        &self.group_taxonomy
    }

    pub fn index(&self) -> &LanguageTermIndex {
        &self.index
    }

    /// `(object_id, language_term_taxonomy_id)` rows, deduplicated.
    pub fn language_relations(&self, groups: &TranslationGroups) -> Vec<(i64, i64)> {
        groups
            .values()
            .flat_map(|group| group.iter())
            .filter_map(|(language, object_id)| {
                self.index.get(language).map(|term_id| (object_id, term_id))
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub async fn link_page<T>(
        &self,
        store: &T,
        groups: &TranslationGroups,
    ) -> MigrationResult<LinkReport>
    where
        T: TermStore + ?Sized,
    {
        let groups: TranslationGroups = groups
            .iter()
            .filter(|(_, group)| !group.is_empty())
            .map(|(slug, group)| (slug.clone(), group.clone()))
            .collect();
        let mut report = LinkReport {
            groups: groups.len(),
            ..LinkReport::default()
        };
        if groups.is_empty() {
            return Ok(report);
        }

        report.language_relations = store
            .insert_term_relationships(&self.language_relations(&groups))
            .await?;

        let slugs: Vec<String> = groups.keys().cloned().collect();

        let existing_terms = store.find_terms_by_slug(&slugs).await?;
        let new_slugs: Vec<String> = slugs
            .iter()
            .filter(|slug| !existing_terms.contains_key(*slug))
            .cloned()
            .collect();
        if !new_slugs.is_empty() {
            store.insert_terms(&new_slugs).await?;
        }
        report.terms_created = new_slugs.len();
        let term_ids = if new_slugs.is_empty() {
            existing_terms
        } else {
            store.find_terms_by_slug(&slugs).await?
        };

        let existing_term_taxonomies = store
            .find_term_taxonomies(&self.group_taxonomy, &slugs)
            .await?;
        let mut new_term_taxonomies = Vec::new();
        for (slug, group) in &groups {
            if existing_term_taxonomies.contains_key(slug) {
                continue;
            }
            let term_id = term_ids.get(slug).copied().ok_or_else(|| {
                MigrationError::Database(format!("group term {slug} missing after insert"))
            })?;
            new_term_taxonomies.push(NewTermTaxonomy {
                term_id,
                taxonomy: self.group_taxonomy.clone(),
                description: group.payload().encode(),
                count: group.len() as i64,
            });
        }
        if !new_term_taxonomies.is_empty() {
            store.insert_term_taxonomies(&new_term_taxonomies).await?;
        }
        report.term_taxonomies_created = new_term_taxonomies.len();
        let term_taxonomy_ids = if new_term_taxonomies.is_empty() {
            existing_term_taxonomies
        } else {
            store
                .find_term_taxonomies(&self.group_taxonomy, &slugs)
                .await?
        };

        let mut group_relations = BTreeSet::new();
        for (slug, group) in &groups {
            let term_taxonomy_id = term_taxonomy_ids.get(slug).copied().ok_or_else(|| {
                MigrationError::Database(format!("group term-taxonomy {slug} missing after insert"))
            })?;
            group_relations.extend(group.object_ids().map(|id| (id, term_taxonomy_id)));
        }
        let group_relations: Vec<(i64, i64)> = group_relations.into_iter().collect();
        report.group_relations = store.insert_term_relationships(&group_relations).await?;

        debug!(
            taxonomy = %self.group_taxonomy,
            groups = report.groups,
            language_relations = report.language_relations,
            terms_created = report.terms_created,
            group_relations = report.group_relations,
            "Linked translation groups"
        );
        Ok(report)
    }
}
