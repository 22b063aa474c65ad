use super::context::MigrationContext;
use crate::error::MigrationResult;
use crate::status::MigrationState;

/// Copies the default language into the target settings document.
pub struct OptionsStage<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> OptionsStage<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self) -> MigrationResult<()> {
        self.ctx.status.set(MigrationState::Options).await?;

        let mut settings = self.ctx.target.settings().await?;
        settings.set_default_language(&self.ctx.settings.default_language);
        self.ctx.target.save_settings(&settings).await
    }
}
