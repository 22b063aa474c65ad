use super::linker::{LinkReport, TranslationGroupLinker};
use crate::error::{MigrationError, MigrationResult};
use crate::logging::log_page_operation;
use crate::models::{group_rows, ContentShape, LanguageTermIndex};
use crate::processing::{BatchCursor, StepProgress, Steppable};
use crate::status::MigrationStatus;
use crate::store::{SourceStore, TargetStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Links the translation groups of one post type or taxonomy, one page of
/// group ids at a time.
pub struct ContentTypeProcessor {
    shape: ContentShape,
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    status: MigrationStatus,
    linker: TranslationGroupLinker,
    report: LinkReport,
}

impl ContentTypeProcessor {
    /// Fails with `MissingLanguages` when `index` is empty: languages must
    /// exist in the target before any group can be linked.
    pub fn new(
        shape: ContentShape,
        source: Arc<dyn SourceStore>,
        target: Arc<dyn TargetStore>,
        status: MigrationStatus,
        index: LanguageTermIndex,
    ) -> MigrationResult<Self> {
        if index.is_empty() {
            return Err(MigrationError::MissingLanguages {
                content_type: shape.name().to_string(),
            });
        }
        let linker = TranslationGroupLinker::new(shape.group_taxonomy(), index);
        Ok(Self {
            shape,
            source,
            target,
            status,
            linker,
            report: LinkReport::default(),
        })
    }

    pub fn shape(&self) -> &ContentShape {
        &self.shape
    }

    /// Totals over every page processed so far.
    pub fn report(&self) -> LinkReport {
        self.report
    }
}

#[async_trait]
impl Steppable for ContentTypeProcessor {
    type Page = Vec<i64>;

    fn label(&self) -> String {
        self.shape.to_string()
    }

    async fn total(&mut self) -> MigrationResult<u64> {
        self.source.count_groups(&self.shape).await
    }

    async fn fetch(&mut self, cursor: &BatchCursor) -> MigrationResult<Vec<i64>> {
        self.source.group_ids(&self.shape, cursor).await
    }

    async fn process(&mut self, trids: Vec<i64>, progress: &StepProgress) -> MigrationResult<()> {
        if trids.is_empty() {
            return Ok(());
        }
        self.status
            .update(
                self.shape.processing_state(),
                Some(progress.percentage),
                Some(self.shape.name()),
            )
            .await?;

        let rows = self.source.translations(&self.shape, &trids).await?;
        let groups = group_rows(&rows);
        let page = self.linker.link_page(self.target.as_ref(), &groups).await?;

        self.report.groups += page.groups;
        self.report.language_relations += page.language_relations;
        self.report.terms_created += page.terms_created;
        self.report.term_taxonomies_created += page.term_taxonomies_created;
        self.report.group_relations += page.group_relations;

        log_page_operation(
            self.status.run_id(),
            &self.label(),
            progress.step,
            progress.percentage,
            trids.len(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::taxonomies::TERM_TRANSLATIONS;
    use crate::processing::{Deadline, DriveOutcome, SteppableProcessor};
    use crate::status::{InMemoryStatusStore, MigrationState};
    use crate::store::{InMemorySource, InMemoryTarget};
    use uuid::Uuid;

    fn status() -> (Arc<InMemoryStatusStore>, MigrationStatus) {
        let store = Arc::new(InMemoryStatusStore::new());
        let status = MigrationStatus::new(store.clone(), Uuid::new_v4());
        (store, status)
    }

    #[test]
    fn test_refuses_empty_index() {
        let (_, status) = status();
        let err = ContentTypeProcessor::new(
            ContentShape::PostType("page".into()),
            Arc::new(InMemorySource::new()),
            Arc::new(InMemoryTarget::new()),
            status,
            LanguageTermIndex::default(),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            MigrationError::MissingLanguages {
                content_type: "page".into()
            }
        );
    }

    #[tokio::test]
    async fn test_taxonomy_groups_use_term_translations() {
        let source = InMemorySource::new()
            .with_translation("tax_category", 1, "en", 5)
            .with_translation("tax_category", 1, "fr", 6)
            .with_translation("tax_category", 2, "en", 7)
            .with_translation("tax_category", 3, "fr", 8);
        let target = Arc::new(InMemoryTarget::new());
        let (store, status) = status();
        let index: LanguageTermIndex = [("en", 30), ("fr", 31)].into_iter().collect();

        let processor = ContentTypeProcessor::new(
            ContentShape::Taxonomy("category".into()),
            Arc::new(source),
            target.clone(),
            status,
            index,
        )
        .unwrap();
        let mut driver = SteppableProcessor::new(processor, 2, Deadline::from_secs(60));
        assert_eq!(driver.run().await.unwrap(), DriveOutcome::Completed { steps: 2 });

        assert_eq!(target.term_taxonomies(TERM_TRANSLATIONS).len(), 3);
        assert!(target.has_relationship(6, 31));
        assert_eq!(driver.inner().report().groups, 3);

        let history = store.history();
        assert_eq!(history.len(), 2);
        assert!(history
            .iter()
            .all(|r| r.status == MigrationState::TaxonomyProcessing
                && r.content_type.as_deref() == Some("category")));
        assert_eq!(history[0].percentage, Some(66));
        assert_eq!(history[1].percentage, Some(100));
    }
}
