//! The steppable contract and its drive loop.
//!
//! A [`Steppable`] exposes a total, a page per step and a page processor. The
//! [`SteppableProcessor`] fetches a page, processes it, advances the step and
//! stops the first time a fetched page is empty. `fetch` must strictly advance
//! through the underlying data with each step or the loop never ends.

use super::cursor::{BatchCursor, ProcessingState};
use super::deadline::Deadline;
use crate::error::MigrationResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// A fetched page. An exhausted page ends the drive loop.
pub trait PageData {
    fn is_exhausted(&self) -> bool;
}

impl<T> PageData for Vec<T> {
    fn is_exhausted(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> PageData for BTreeMap<K, V> {
    fn is_exhausted(&self) -> bool {
        self.is_empty()
    }
}

/// Step number and completion percentage handed to `process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProgress {
    pub step: u32,
    pub percentage: u8,
}

#[async_trait]
pub trait Steppable: Send {
    type Page: PageData + Send;

    /// Name used in logs.
    fn label(&self) -> String;

    /// Number of top-level units to process.
    async fn total(&mut self) -> MigrationResult<u64>;

    /// Units for the cursor's step; empty once the data is exhausted.
    async fn fetch(&mut self, cursor: &BatchCursor) -> MigrationResult<Self::Page>;

    /// Process one page. An empty page is a no-op.
    async fn process(&mut self, page: Self::Page, progress: &StepProgress) -> MigrationResult<()>;
}

/// How a drive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// An empty page was fetched after `steps` processed pages.
    Completed { steps: u32 },
    /// The deadline passed before the next fetch.
    BudgetExhausted { steps: u32 },
}

impl DriveOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn steps(&self) -> u32 {
        match self {
            Self::Completed { steps } | Self::BudgetExhausted { steps } => *steps,
        }
    }
}

/// Drives one [`Steppable`] to completion. Not shareable; one instance per
/// content type.
pub struct SteppableProcessor<S: Steppable> {
    inner: S,
    state: ProcessingState,
    batch_size: u32,
    deadline: Deadline,
    page_pause: Duration,
}

impl<S: Steppable> SteppableProcessor<S> {
    pub fn new(inner: S, batch_size: u32, deadline: Deadline) -> Self {
        Self {
            inner,
            state: ProcessingState::default(),
            batch_size: batch_size.max(1),
            deadline,
            page_pause: Duration::ZERO,
        }
    }

    /// Sleep between pages to ease pressure on the database.
    pub fn with_page_pause(mut self, pause: Duration) -> Self {
        self.page_pause = pause;
        self
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Percentage for the current step. The total is fetched once and cached.
    async fn percentage(&mut self) -> MigrationResult<u8> {
        let total = match self.state.total {
            Some(total) => total,
            None => {
                let total = self.inner.total().await?;
                self.state.total = Some(total);
                total
            }
        };
        self.state.percentage = self.state.cursor(self.batch_size).percentage(total);
        Ok(self.state.percentage)
    }

    pub async fn run(&mut self) -> MigrationResult<DriveOutcome> {
        loop {
            if self.deadline.is_exhausted() {
                warn!(
                    processor = %self.inner.label(),
                    step = self.state.step,
                    elapsed_secs = self.deadline.elapsed().as_secs(),
                    budget_secs = self.deadline.budget().as_secs(),
                    "Execution budget exhausted, stopping before next page"
                );
                return Ok(DriveOutcome::BudgetExhausted {
                    steps: self.state.steps_completed(),
                });
            }

            let cursor = self.state.cursor(self.batch_size);
            let page = self.inner.fetch(&cursor).await?;
            if page.is_exhausted() {
                debug!(
                    processor = %self.inner.label(),
                    steps = self.state.steps_completed(),
                    "Steppable processing complete"
                );
                return Ok(DriveOutcome::Completed {
                    steps: self.state.steps_completed(),
                });
            }

            let progress = StepProgress {
                step: cursor.step,
                percentage: self.percentage().await?,
            };
            self.inner.process(page, &progress).await?;
            self.state.advance();

            if !self.page_pause.is_zero() {
                tokio::time::sleep(self.page_pause).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pages through `0..total`, recording what it processed.
    struct RangeSource {
        total: u64,
        total_calls: u32,
        fetches: u32,
        processed: Vec<u64>,
        progress: Vec<StepProgress>,
    }

    impl RangeSource {
        fn new(total: u64) -> Self {
            Self {
                total,
                total_calls: 0,
                fetches: 0,
                processed: Vec::new(),
                progress: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Steppable for RangeSource {
        type Page = Vec<u64>;

        fn label(&self) -> String {
            "range".to_string()
        }

        async fn total(&mut self) -> MigrationResult<u64> {
            self.total_calls += 1;
            Ok(self.total)
        }

        async fn fetch(&mut self, cursor: &BatchCursor) -> MigrationResult<Vec<u64>> {
            self.fetches += 1;
            let start = cursor.offset().min(self.total);
            let end = (start + u64::from(cursor.limit())).min(self.total);
            Ok((start..end).collect())
        }

        async fn process(
            &mut self,
            page: Vec<u64>,
            progress: &StepProgress,
        ) -> MigrationResult<()> {
            self.processed.extend(page);
            self.progress.push(*progress);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_runs_ceil_total_over_batch_steps() {
        let mut driver = SteppableProcessor::new(RangeSource::new(12), 5, Deadline::from_secs(60));
        let outcome = driver.run().await.unwrap();

        assert_eq!(outcome, DriveOutcome::Completed { steps: 3 });
        let source = driver.into_inner();
        assert_eq!(source.fetches, 4);
        assert_eq!(source.processed, (0..12).collect::<Vec<_>>());
        assert_eq!(source.total_calls, 1);
    }

    #[tokio::test]
    async fn test_progress_matches_percentage_contract() {
        let mut driver =
            SteppableProcessor::new(RangeSource::new(12000), 5000, Deadline::from_secs(60));
        driver.run().await.unwrap();
        let percentages: Vec<u8> = driver.inner().progress.iter().map(|p| p.percentage).collect();
        assert_eq!(percentages, vec![41, 83, 100]);
        assert_eq!(driver.state().total, Some(12000));
    }

    #[tokio::test]
    async fn test_empty_source_completes_without_processing() {
        let mut driver = SteppableProcessor::new(RangeSource::new(0), 5, Deadline::from_secs(60));
        assert_eq!(driver.run().await.unwrap(), DriveOutcome::Completed { steps: 0 });
        assert_eq!(driver.inner().total_calls, 0);
        assert!(driver.inner().progress.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_budget_stops_before_fetching() {
        let mut driver =
            SteppableProcessor::new(RangeSource::new(10), 5, Deadline::new(Duration::ZERO));
        let outcome = driver.run().await.unwrap();
        assert_eq!(outcome, DriveOutcome::BudgetExhausted { steps: 0 });
        assert!(!outcome.is_completed());
        assert_eq!(driver.inner().fetches, 0);
    }
}
