//! Trigger paths of a migration run.
//!
//! The background path ([`MigrationScheduler::schedule`]) spawns at most one
//! deferred run and has no caller to report to: failures are only logged and
//! the status freezes at the last stage reached. The interactive path
//! ([`MigrationScheduler::run_interactive`]) runs in the caller's task and
//! turns any failure into `ERRORED`. Both paths hold the same lock while
//! they start a run, so an interactive run never overlaps a scheduled one.

use super::orchestrator::{MigrationRunner, RunOutcome};
use crate::error::{MigrationError, MigrationResult};
use crate::logging::log_error;
use crate::processing::Deadline;
use crate::status::{MigrationState, MigrationStatus};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

pub struct MigrationScheduler {
    runner: MigrationRunner,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl MigrationScheduler {
    pub fn new(runner: MigrationRunner) -> Self {
        Self {
            runner,
            pending: Mutex::new(None),
        }
    }

    fn status(&self, run_id: Uuid) -> MigrationStatus {
        MigrationStatus::new(self.runner.status_store(), run_id)
    }

    fn deadline(&self) -> Deadline {
        Deadline::new(self.runner.config().execution_budget())
    }

    /// Whether a scheduled run has not finished yet, or an interactive run
    /// is in progress.
    pub fn is_pending(&self) -> bool {
        match self.pending.try_lock() {
            Ok(pending) => pending.as_ref().is_some_and(|handle| !handle.is_finished()),
            Err(_) => true,
        }
    }

    /// Schedule one deferred run and return its run id. Returns `None`,
    /// without scheduling anything, while a previous run is still pending.
    pub async fn schedule(&self) -> MigrationResult<Option<Uuid>> {
        let mut pending = self.pending.lock().await;
        if pending.as_ref().is_some_and(|handle| !handle.is_finished()) {
            info!("Migration already scheduled");
            return Ok(None);
        }

        let run_id = Uuid::new_v4();
        self.status(run_id).set(MigrationState::Waiting).await?;

        let runner = self.runner.clone();
        let budget = runner.config().execution_budget();
        *pending = Some(tokio::spawn(async move {
            // The budget starts when the deferred run does
            match runner.run_with(run_id, Deadline::new(budget)).await {
                Ok(outcome) => info!(%run_id, ?outcome, "Scheduled migration finished"),
                Err(err) => log_error(
                    Some(run_id),
                    "migration_scheduler",
                    "scheduled_run",
                    &err.to_string(),
                ),
            }
        }));
        info!(%run_id, "Migration scheduled");
        Ok(Some(run_id))
    }

    /// Run now in the caller's task. Any failure is recorded as `ERRORED`
    /// and returned. Scheduling waits until this run is over.
    pub async fn run_interactive(&self) -> MigrationResult<RunOutcome> {
        let pending = self.pending.lock().await;
        if pending.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(MigrationError::Scheduling(
                "a scheduled migration is still running".into(),
            ));
        }

        let run_id = Uuid::new_v4();
        let result = self.runner.run_with(run_id, self.deadline()).await;
        drop(pending);

        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                log_error(
                    Some(run_id),
                    "migration_scheduler",
                    "interactive_run",
                    &err.to_string(),
                );
                self.status(run_id).set(MigrationState::Errored).await?;
                Err(err)
            }
        }
    }

    /// Wait for the pending run, if any.
    pub async fn wait(&self) -> MigrationResult<()> {
        let handle = self.pending.lock().await.take();
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| MigrationError::Scheduling(format!("scheduled run failed: {e}")))?;
        }
        Ok(())
    }

    /// Abort a pending run and delete the status record.
    pub async fn clear(&self) -> MigrationResult<()> {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
        self.runner.status_store().clear().await
    }
}
