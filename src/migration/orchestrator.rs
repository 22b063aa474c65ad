//! The migration run: preconditions, then every stage in fixed order.
//!
//! Languages, options, post types, taxonomies, menus, objects without a
//! language, string translations. Each content type drives its own
//! [`SteppableProcessor`](crate::processing::SteppableProcessor) to completion
//! before the next one starts.

use super::content_type::ContentTypeProcessor;
use super::context::MigrationContext;
use super::languages::LanguagesStage;
use super::menus::MenusStage;
use super::no_lang::DefaultLanguageAssigner;
use super::options::OptionsStage;
use super::strings::StringCatalogMerger;
use crate::config::MigrationConfig;
use crate::error::{MigrationError, MigrationResult};
use crate::logging::{log_error, log_stage_operation};
use crate::models::{ContentShape, LanguageTaxonomy, LanguageTermIndex, WpmlSettings};
use crate::processing::Deadline;
use crate::status::{MigrationState, MigrationStatus, StatusStore};
use crate::store::{SourceStore, TargetStore};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// How a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// The execution budget ran out during `stage`; the last written status
    /// is left in place.
    Interrupted { stage: MigrationState },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Runs one migration from start to finish against a source and a target.
#[derive(Clone)]
pub struct MigrationRunner {
    config: MigrationConfig,
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    status_store: Arc<dyn StatusStore>,
}

impl MigrationRunner {
    pub fn new(
        config: MigrationConfig,
        source: Arc<dyn SourceStore>,
        target: Arc<dyn TargetStore>,
        status_store: Arc<dyn StatusStore>,
    ) -> Self {
        Self {
            config,
            source,
            target,
            status_store,
        }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    pub fn status_store(&self) -> Arc<dyn StatusStore> {
        Arc::clone(&self.status_store)
    }

    /// Run every stage under a fresh run id and the configured budget.
    pub async fn run(&self) -> MigrationResult<RunOutcome> {
        let deadline = Deadline::new(self.config.execution_budget());
        self.run_with(Uuid::new_v4(), deadline).await
    }

    /// Run every stage. A failed precondition writes `ERRORED` before any
    /// other write and returns the error; so does a content type that finds
    /// no target languages. Other failures propagate and leave the status at
    /// the last stage reached.
    pub async fn run_with(&self, run_id: Uuid, deadline: Deadline) -> MigrationResult<RunOutcome> {
        let status = MigrationStatus::new(Arc::clone(&self.status_store), run_id);

        let ctx = match self.prepare(status.clone(), deadline).await {
            Ok(ctx) => ctx,
            Err(err) => {
                log_error(
                    Some(status.run_id()),
                    "migration_runner",
                    "preconditions",
                    &err.to_string(),
                );
                status.set(MigrationState::Errored).await?;
                return Err(err);
            }
        };

        log_stage_operation(ctx.run_id(), "migration", "started", None);
        let outcome = match self.execute(&ctx).await {
            Ok(outcome) => outcome,
            Err(err) if err.is_precondition() => {
                log_error(Some(ctx.run_id()), "migration_runner", "execute", &err.to_string());
                ctx.status.set(MigrationState::Errored).await?;
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        log_stage_operation(
            ctx.run_id(),
            "migration",
            if outcome.is_completed() {
                "completed"
            } else {
                "interrupted"
            },
            None,
        );
        Ok(outcome)
    }

    async fn prepare(
        &self,
        status: MigrationStatus,
        deadline: Deadline,
    ) -> MigrationResult<MigrationContext> {
        self.config
            .validate()
            .map_err(|e| MigrationError::PreconditionFailed(e.to_string()))?;

        self.target
            .health_check()
            .await
            .map_err(|e| MigrationError::PreconditionFailed(format!("target unavailable: {e}")))?;

        let raw = self.source.settings().await?.ok_or_else(|| {
            MigrationError::PreconditionFailed("source settings not found".into())
        })?;
        let settings = WpmlSettings::from_json(&raw)?;

        Ok(MigrationContext {
            config: self.config.clone(),
            source: Arc::clone(&self.source),
            target: Arc::clone(&self.target),
            status,
            deadline,
            settings,
        })
    }

    async fn execute(&self, ctx: &MigrationContext) -> MigrationResult<RunOutcome> {
        let languages = LanguagesStage::new(ctx).run().await?;
        OptionsStage::new(ctx).run().await?;

        ctx.status.set(MigrationState::PostTypesStarted).await?;
        let index = LanguageTermIndex::build(&languages, LanguageTaxonomy::Language);
        for post_type in ctx.settings.translated_post_types() {
            let shape = ContentShape::PostType(post_type);
            if !self.run_content_type(ctx, shape, &index).await? {
                return Ok(interrupted(MigrationState::PostTypeProcessing));
            }
        }

        ctx.status.set(MigrationState::TaxonomiesStarted).await?;
        let index = LanguageTermIndex::build(&languages, LanguageTaxonomy::TermLanguage);
        for taxonomy in ctx.settings.translated_taxonomies() {
            let shape = ContentShape::Taxonomy(taxonomy);
            if !self.run_content_type(ctx, shape, &index).await? {
                return Ok(interrupted(MigrationState::TaxonomyProcessing));
            }
        }

        if ctx.deadline.is_exhausted() {
            return Ok(interrupted(MigrationState::Menus));
        }
        MenusStage::new(ctx).run().await?;

        let assigned = DefaultLanguageAssigner::new(ctx, &languages).run().await?;
        if !assigned.completed {
            return Ok(interrupted(MigrationState::ObjectsWithNoLanguage));
        }

        ctx.status
            .update(MigrationState::StringTranslations, Some(0), None)
            .await?;
        let excluded = self.excluded_string_domains(ctx).await?;
        let merger = StringCatalogMerger::new(
            Arc::clone(&ctx.source),
            Arc::clone(&ctx.target),
            ctx.status.clone(),
            &languages,
            excluded,
        );
        if !ctx.driver(merger).run().await?.is_completed() {
            return Ok(interrupted(MigrationState::StringTranslations));
        }

        ctx.target.finalize().await?;
        ctx.status.set(MigrationState::Completed).await?;
        info!(run_id = %ctx.run_id(), "Migration completed");
        Ok(RunOutcome::Completed)
    }

    /// Drive one content type. Returns false when the deadline stopped it.
    async fn run_content_type(
        &self,
        ctx: &MigrationContext,
        shape: ContentShape,
        index: &LanguageTermIndex,
    ) -> MigrationResult<bool> {
        log_stage_operation(ctx.run_id(), shape.name(), "started", None);
        let processor = ContentTypeProcessor::new(
            shape,
            Arc::clone(&ctx.source),
            Arc::clone(&ctx.target),
            ctx.status.clone(),
            index.clone(),
        )?;

        let mut driver = ctx.driver(processor);
        let outcome = driver.run().await?;
        let report = driver.inner().report();
        let shape = driver.inner().shape();
        log_stage_operation(
            ctx.run_id(),
            shape.name(),
            if outcome.is_completed() {
                "completed"
            } else {
                "interrupted"
            },
            Some(&format!(
                "steps={} groups={} terms_created={}",
                outcome.steps(),
                report.groups,
                report.terms_created
            )),
        );
        Ok(outcome.is_completed())
    }

    /// Domains reported by the source plus the configured ones, deduplicated.
    async fn excluded_string_domains(
        &self,
        ctx: &MigrationContext,
    ) -> MigrationResult<Vec<String>> {
        let mut domains = ctx.source.excluded_string_domains().await?;
        for domain in &ctx.config.excluded_string_domains {
            if !domains.contains(domain) {
                domains.push(domain.clone());
            }
        }
        Ok(domains)
    }
}

fn interrupted(stage: MigrationState) -> RunOutcome {
    warn!(stage = %stage, "Migration interrupted by the execution budget");
    RunOutcome::Interrupted { stage }
}

impl std::fmt::Debug for MigrationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRunner")
            .field("config", &self.config)
            .finish()
    }
}
