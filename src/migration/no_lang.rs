use super::context::MigrationContext;
use crate::error::{MigrationError, MigrationResult};
use crate::models::{ObjectKind, ObjectScope, TargetLanguage};
use crate::status::MigrationState;
use tracing::{info, warn};

/// Result of a [`DefaultLanguageAssigner`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignOutcome {
    pub posts: usize,
    pub terms: usize,
    pub batches: u32,
    /// False when the deadline stopped the loop early
    pub completed: bool,
}

/// Tags every translatable post and term without a language with the default
/// language, one batch per kind at a time, until both kinds come back empty.
pub struct DefaultLanguageAssigner<'a> {
    ctx: &'a MigrationContext,
    languages: &'a [TargetLanguage],
}

impl<'a> DefaultLanguageAssigner<'a> {
    pub fn new(ctx: &'a MigrationContext, languages: &'a [TargetLanguage]) -> Self {
        Self { ctx, languages }
    }

    /// The default language, provided both of its taxonomy terms exist.
    fn default_language(&self) -> MigrationResult<&'a TargetLanguage> {
        let code = &self.ctx.settings.default_language;
        self.languages
            .iter()
            .find(|l| &l.code == code && l.term_taxonomy_id != 0 && l.tl_term_taxonomy_id != 0)
            .ok_or_else(|| MigrationError::UnknownLanguage(code.clone()))
    }

    pub async fn run(&self) -> MigrationResult<AssignOutcome> {
        self.ctx
            .status
            .set(MigrationState::ObjectsWithNoLanguage)
            .await?;

        // Assigning an unknown language never shrinks the backlog
        let language = self.default_language()?;
        let scope = ObjectScope {
            post_types: self.ctx.settings.translated_post_types(),
            taxonomies: self.ctx.settings.translated_taxonomies(),
        };

        let mut outcome = AssignOutcome::default();
        loop {
            if self.ctx.deadline.is_exhausted() {
                warn!(
                    run_id = %self.ctx.run_id(),
                    batches = outcome.batches,
                    "Execution budget exhausted while assigning the default language"
                );
                return Ok(outcome);
            }

            let batch = self
                .ctx
                .target
                .objects_without_language(&scope, self.ctx.config.batch_size)
                .await?;
            if batch.is_empty() {
                break;
            }

            if !batch.posts.is_empty() {
                self.ctx
                    .status
                    .set(MigrationState::ObjectsWithNoLanguagePosts)
                    .await?;
                self.ctx
                    .target
                    .assign_language(ObjectKind::Post, &batch.posts, language)
                    .await?;
                outcome.posts += batch.posts.len();
            }
            if !batch.terms.is_empty() {
                self.ctx
                    .status
                    .set(MigrationState::ObjectsWithNoLanguageTerms)
                    .await?;
                self.ctx
                    .target
                    .assign_language(ObjectKind::Term, &batch.terms, language)
                    .await?;
                outcome.terms += batch.terms.len();
            }
            outcome.batches += 1;
        }

        outcome.completed = true;
        info!(
            run_id = %self.ctx.run_id(),
            language = %language.code,
            posts = outcome.posts,
            terms = outcome.terms,
            "Default language assigned"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MigrationConfig;
    use crate::models::{NewLanguage, SourceLanguage, WpmlSettings};
    use crate::processing::Deadline;
    use crate::status::{InMemoryStatusStore, MigrationStatus};
    use crate::store::memory::Assignment;
    use crate::store::{InMemorySource, InMemoryTarget};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    fn english() -> NewLanguage {
        let language = SourceLanguage {
            code: "en".into(),
            locale: "en_US".into(),
            name: "English".into(),
        };
        NewLanguage::from_source(&language, 0)
    }

    /// Posts 1 and 2 and category term 5, none of them tagged with a language.
    fn untagged_target() -> Arc<InMemoryTarget> {
        let target = InMemoryTarget::new()
            .with_post(1, "post")
            .with_post(2, "post")
            .with_post(3, "revision")
            .with_term(5, "news", "category")
            .with_language(&english())
            .unwrap();
        Arc::new(target)
    }

    fn context(
        target: Arc<InMemoryTarget>,
        batch_size: u32,
        deadline: Deadline,
        default_language: &str,
    ) -> (Arc<InMemoryStatusStore>, MigrationContext) {
        let store = Arc::new(InMemoryStatusStore::new());
        let ctx = MigrationContext {
            config: MigrationConfig::default().with_batch_size(batch_size),
            source: Arc::new(InMemorySource::new()),
            target,
            status: MigrationStatus::new(store.clone(), Uuid::new_v4()),
            deadline,
            settings: WpmlSettings {
                default_language: default_language.into(),
                languages_order: vec!["en".into()],
                synced_post_types: Vec::new(),
                synced_taxonomies: Vec::new(),
            },
        };
        (store, ctx)
    }

    fn assignment(kind: ObjectKind, ids: &[i64]) -> Assignment {
        Assignment {
            kind,
            ids: ids.to_vec(),
            language: "en".into(),
        }
    }

    #[tokio::test]
    async fn test_assigns_one_batch_per_kind_until_empty() {
        let target = untagged_target();
        let languages = target.target_languages();
        let (store, ctx) = context(target.clone(), 1, Deadline::from_secs(60), "en");

        let outcome = DefaultLanguageAssigner::new(&ctx, &languages)
            .run()
            .await
            .unwrap();

        assert_eq!(
            outcome,
            AssignOutcome {
                posts: 2,
                terms: 1,
                batches: 2,
                completed: true,
            }
        );
        assert_eq!(
            target.assignments(),
            vec![
                assignment(ObjectKind::Post, &[1]),
                assignment(ObjectKind::Term, &[5]),
                assignment(ObjectKind::Post, &[2]),
            ]
        );
        assert!(!target.has_relationship(3, languages[0].term_taxonomy_id));

        let states = store.states();
        assert_eq!(states.first(), Some(&MigrationState::ObjectsWithNoLanguage));
        assert!(states.contains(&MigrationState::ObjectsWithNoLanguagePosts));
        assert!(states.contains(&MigrationState::ObjectsWithNoLanguageTerms));
    }

    #[tokio::test]
    async fn test_large_batch_assigns_each_kind_once() {
        let target = untagged_target();
        let languages = target.target_languages();
        let (_, ctx) = context(target.clone(), 10, Deadline::from_secs(60), "en");

        let outcome = DefaultLanguageAssigner::new(&ctx, &languages)
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.batches, 1);
        assert!(outcome.completed);
        assert_eq!(
            target.assignments(),
            vec![
                assignment(ObjectKind::Post, &[1, 2]),
                assignment(ObjectKind::Term, &[5]),
            ]
        );
    }

    #[tokio::test]
    async fn test_exhausted_deadline_stops_before_first_batch() {
        let target = untagged_target();
        let languages = target.target_languages();
        let (_, ctx) = context(target.clone(), 1, Deadline::new(Duration::ZERO), "en");

        let outcome = DefaultLanguageAssigner::new(&ctx, &languages)
            .run()
            .await
            .unwrap();

        assert!(!outcome.completed);
        assert_eq!(outcome.batches, 0);
        assert!(target.assignments().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_default_language_fails() {
        let target = untagged_target();
        let languages = target.target_languages();
        let (_, ctx) = context(target.clone(), 1, Deadline::from_secs(60), "de");

        let err = DefaultLanguageAssigner::new(&ctx, &languages)
            .run()
            .await
            .unwrap_err();

        assert_eq!(err, MigrationError::UnknownLanguage("de".into()));
        assert!(target.assignments().is_empty());
    }

    #[tokio::test]
    async fn test_default_language_without_term_language_fails() {
        let target = untagged_target();
        let mut languages = target.target_languages();
        languages[0].tl_term_taxonomy_id = 0;
        let (_, ctx) = context(target.clone(), 1, Deadline::from_secs(60), "en");

        let err = DefaultLanguageAssigner::new(&ctx, &languages)
            .run()
            .await
            .unwrap_err();

        assert_eq!(err, MigrationError::UnknownLanguage("en".into()));
        assert!(target.assignments().is_empty());
    }
}
