use super::context::MigrationContext;
use crate::error::MigrationResult;
use crate::models::{order_languages, NewLanguage, TargetLanguage};
use crate::status::MigrationState;
use tracing::{debug, info, warn};

/// Creates the target languages from the active source languages.
pub struct LanguagesStage<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> LanguagesStage<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// Returns every target language after creation, in language order. A
    /// language found without its `term_language` term gets one created.
    pub async fn run(&self) -> MigrationResult<Vec<TargetLanguage>> {
        self.ctx.status.set(MigrationState::Languages).await?;

        let existing = self.ctx.target.languages().await?;
        let discovered = self.ctx.source.languages().await?;
        let ordered = order_languages(discovered, &self.ctx.settings.languages_order);

        let mut created = 0usize;
        for (position, language) in ordered.iter().enumerate() {
            if existing.iter().any(|l| l.code == language.code) {
                debug!(code = %language.code, "Language already exists in target");
                continue;
            }
            let new_language = NewLanguage::from_source(language, position);
            self.ctx.target.create_language(&new_language).await?;
            created += 1;
        }

        if created > 0 {
            self.ctx.target.cleanup_after_language_creation().await?;
        }

        let mut languages = self.ctx.target.languages().await?;
        let mut repaired = 0usize;
        for language in languages.iter_mut().filter(|l| l.tl_term_taxonomy_id == 0) {
            warn!(code = %language.code, "Language has no term_language term, creating it");
            language.tl_term_taxonomy_id = self.ctx.target.create_term_language(language).await?;
            repaired += 1;
        }

        info!(
            run_id = %self.ctx.run_id(),
            created,
            repaired,
            existing = existing.len(),
            "Languages migrated"
        );
        Ok(languages)
    }
}
