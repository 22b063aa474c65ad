use crate::config::MigrationConfig;
use crate::models::WpmlSettings;
use crate::processing::{Deadline, Steppable, SteppableProcessor};
use crate::status::MigrationStatus;
use crate::store::{SourceStore, TargetStore};
use std::sync::Arc;
use uuid::Uuid;

/// Everything a stage needs, populated once by the runner after the
/// preconditions passed.
#[derive(Clone)]
pub struct MigrationContext {
    pub config: MigrationConfig,
    pub source: Arc<dyn SourceStore>,
    pub target: Arc<dyn TargetStore>,
    pub status: MigrationStatus,
    pub deadline: Deadline,
    pub settings: WpmlSettings,
}

impl MigrationContext {
    pub fn run_id(&self) -> Uuid {
        self.status.run_id()
    }

    /// A fresh driver for one steppable, sharing the run's deadline.
    pub fn driver<S: Steppable>(&self, steppable: S) -> SteppableProcessor<S> {
        SteppableProcessor::new(steppable, self.config.batch_size, self.deadline)
            .with_page_pause(self.config.page_pause())
    }
}

impl std::fmt::Debug for MigrationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationContext")
            .field("run_id", &self.run_id())
            .field("config", &self.config)
            .field("settings", &self.settings)
            .finish()
    }
}
