use crate::error::MigrationResult;
use crate::logging::log_page_operation;
use crate::models::{StringTranslationRow, TargetLanguage};
use crate::processing::{BatchCursor, PageData, StepProgress, Steppable};
use crate::status::{MigrationState, MigrationStatus};
use crate::store::{SourceStore, TargetStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// One page of string translations grouped by language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringPage {
    /// Raw rows returned by the source, including the ones dropped below
    pub rows_fetched: usize,
    /// `language -> [(source, translation)]` in source order
    pub by_language: BTreeMap<String, Vec<(String, String)>>,
}

impl StringPage {
    /// Rows with an empty source or translation are dropped.
    pub fn from_rows(rows: Vec<StringTranslationRow>) -> Self {
        let rows_fetched = rows.len();
        let mut by_language: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
        for row in &rows {
            if let Some(pair) = row.pair() {
                by_language.entry(row.language.clone()).or_default().push(pair);
            }
        }
        Self {
            rows_fetched,
            by_language,
        }
    }
}

impl PageData for StringPage {
    fn is_exhausted(&self) -> bool {
        self.rows_fetched == 0
    }
}

/// Merges the source string translations into the target's per-language
/// catalogs. Merging is additive: existing entries are kept unless the page
/// carries the same source string.
pub struct StringCatalogMerger {
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    status: MigrationStatus,
    languages: HashMap<String, TargetLanguage>,
    excluded_domains: Vec<String>,
    merged: usize,
}

impl StringCatalogMerger {
    pub fn new(
        source: Arc<dyn SourceStore>,
        target: Arc<dyn TargetStore>,
        status: MigrationStatus,
        languages: &[TargetLanguage],
        excluded_domains: Vec<String>,
    ) -> Self {
        Self {
            source,
            target,
            status,
            languages: languages
                .iter()
                .map(|l| (l.code.clone(), l.clone()))
                .collect(),
            excluded_domains,
            merged: 0,
        }
    }

    /// Entries merged so far.
    pub fn merged(&self) -> usize {
        self.merged
    }
}

#[async_trait]
impl Steppable for StringCatalogMerger {
    type Page = StringPage;

    fn label(&self) -> String {
        "string translations".to_string()
    }

    async fn total(&mut self) -> MigrationResult<u64> {
        self.source
            .count_string_translations(&self.excluded_domains)
            .await
    }

    async fn fetch(&mut self, cursor: &BatchCursor) -> MigrationResult<StringPage> {
        let rows = self
            .source
            .string_translations(&self.excluded_domains, cursor)
            .await?;
        Ok(StringPage::from_rows(rows))
    }

    async fn process(&mut self, page: StringPage, progress: &StepProgress) -> MigrationResult<()> {
        self.status
            .update(
                MigrationState::StringTranslations,
                Some(progress.percentage),
                None,
            )
            .await?;

        for (code, pairs) in page.by_language {
            let Some(language) = self.languages.get(&code) else {
                debug!(language = %code, "Skipping strings of a language unknown to the target");
                continue;
            };
            let mut catalog = self.target.load_catalog(language).await?;
            self.merged += pairs.len();
            catalog.merge(pairs);
            self.target.save_catalog(language, &catalog).await?;
        }

        log_page_operation(
            self.status.run_id(),
            &self.label(),
            progress.step,
            progress.percentage,
            page.rows_fetched,
        );
        Ok(())
    }
}
