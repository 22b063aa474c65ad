use super::record::MigrationStatusRecord;
use super::states::MigrationState;
use crate::error::MigrationResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Durable storage for the single status record.
///
/// `write` must replace the whole record in one atomic operation so that
/// concurrent readers always observe a complete snapshot.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn write(&self, record: &MigrationStatusRecord) -> MigrationResult<()>;

    /// `None` when no run has started or the record was cleared.
    async fn read(&self) -> MigrationResult<Option<MigrationStatusRecord>>;

    async fn clear(&self) -> MigrationResult<()>;
}

/// Status store kept in process memory. Every write is also appended to a
/// history so callers can inspect the sequence of transitions.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    current: RwLock<Option<String>>,
    history: RwLock<Vec<MigrationStatusRecord>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<MigrationStatusRecord> {
        self.history.read().clone()
    }

    pub fn states(&self) -> Vec<MigrationState> {
        self.history.read().iter().map(|r| r.status).collect()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn write(&self, record: &MigrationStatusRecord) -> MigrationResult<()> {
        let encoded = record.to_json()?;
        *self.current.write() = Some(encoded);
        self.history.write().push(record.clone());
        Ok(())
    }

    async fn read(&self) -> MigrationResult<Option<MigrationStatusRecord>> {
        let current = self.current.read().clone();
        current
            .as_deref()
            .map(MigrationStatusRecord::from_json)
            .transpose()
    }

    async fn clear(&self) -> MigrationResult<()> {
        *self.current.write() = None;
        Ok(())
    }
}

/// Status writer shared by the processors of one run.
#[derive(Clone)]
pub struct MigrationStatus {
    store: Arc<dyn StatusStore>,
    run_id: Uuid,
}

impl MigrationStatus {
    pub fn new(store: Arc<dyn StatusStore>, run_id: Uuid) -> Self {
        Self { store, run_id }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub async fn set(&self, state: MigrationState) -> MigrationResult<()> {
        self.update(state, None, None).await
    }

    /// Overwrite the record and log the transition.
    pub async fn update(
        &self,
        state: MigrationState,
        percentage: Option<u8>,
        content_type: Option<&str>,
    ) -> MigrationResult<()> {
        let record = MigrationStatusRecord::with_progress(state, percentage, content_type);
        self.store.write(&record).await?;

        info!(
            run_id = %self.run_id,
            status = record.status.code(),
            percentage = record.percentage,
            content_type = record.content_type.as_deref(),
            "{}",
            record.message()
        );
        Ok(())
    }

    pub async fn get(&self) -> MigrationResult<Option<MigrationStatusRecord>> {
        self.store.read().await
    }

    pub async fn clear(&self) -> MigrationResult<()> {
        self.store.clear().await
    }
}

impl std::fmt::Debug for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStatus")
            .field("run_id", &self.run_id)
            .finish()
    }
}
