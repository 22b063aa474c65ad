mod common;

use common::{bilingual_source, bilingual_target, harness, test_config};
use wpml_to_polylang::migration::MigrationScheduler;
use wpml_to_polylang::status::{MigrationState, StatusStore};
use wpml_to_polylang::store::InMemoryTarget;
use wpml_to_polylang::{MigrationError, RunOutcome};

#[tokio::test]
async fn test_scheduled_run_writes_waiting_then_completes() {
    let h = harness(test_config(), bilingual_source(), bilingual_target());
    let scheduler = MigrationScheduler::new(h.runner.clone());

    assert!(scheduler.schedule().await.unwrap().is_some());
    scheduler.wait().await.unwrap();

    let states = h.status.states();
    assert_eq!(states.first(), Some(&MigrationState::Waiting));
    assert_eq!(states.last(), Some(&MigrationState::Completed));
    assert!(!scheduler.is_pending());
}

#[tokio::test]
async fn test_schedule_is_idempotent_while_pending() {
    let h = harness(test_config(), bilingual_source(), bilingual_target());
    let scheduler = MigrationScheduler::new(h.runner.clone());

    let first = scheduler.schedule().await.unwrap();
    assert!(first.is_some());
    if scheduler.is_pending() {
        assert_eq!(scheduler.schedule().await.unwrap(), None);
    }
    scheduler.wait().await.unwrap();

    // Only one run created languages
    assert_eq!(h.target.target_languages().len(), 2);
    // Scheduling again once finished is allowed, under a new run id
    let second = scheduler.schedule().await.unwrap();
    assert!(second.is_some());
    assert_ne!(second, first);
    scheduler.wait().await.unwrap();
}

#[tokio::test]
async fn test_interactive_run_reports_failure_as_errored() {
    let h = harness(test_config(), bilingual_source(), InMemoryTarget::unavailable());
    let scheduler = MigrationScheduler::new(h.runner.clone());

    assert!(scheduler.run_interactive().await.is_err());
    let record = h.status.read().await.unwrap().unwrap();
    assert_eq!(record.status, MigrationState::Errored);
}

#[tokio::test]
async fn test_interactive_run_completes() {
    let h = harness(test_config(), bilingual_source(), bilingual_target());
    let scheduler = MigrationScheduler::new(h.runner.clone());

    let outcome = scheduler.run_interactive().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
}

#[tokio::test]
async fn test_clear_removes_status_record() {
    let h = harness(test_config(), bilingual_source(), bilingual_target());
    let scheduler = MigrationScheduler::new(h.runner.clone());

    scheduler.run_interactive().await.unwrap();
    assert!(h.status.read().await.unwrap().is_some());

    scheduler.clear().await.unwrap();
    assert!(h.status.read().await.unwrap().is_none());
    assert!(!scheduler.is_pending());
}

#[tokio::test]
async fn test_schedule_waits_for_interactive_run() {
    let h = harness(test_config(), bilingual_source(), bilingual_target());
    let scheduler = MigrationScheduler::new(h.runner.clone());

    let (interactive, scheduled) =
        tokio::join!(scheduler.run_interactive(), scheduler.schedule());
    assert_eq!(interactive.unwrap(), RunOutcome::Completed);
    assert!(scheduled.unwrap().is_some());
    scheduler.wait().await.unwrap();

    // The scheduled run only started once the interactive one completed
    let states = h.status.states();
    let first_completed = states
        .iter()
        .position(|s| *s == MigrationState::Completed)
        .unwrap();
    let waiting = states
        .iter()
        .position(|s| *s == MigrationState::Waiting)
        .unwrap();
    assert!(waiting > first_completed);
    assert_eq!(states.last(), Some(&MigrationState::Completed));
}

#[tokio::test]
async fn test_interactive_run_refused_while_scheduled_run_pending() {
    let h = harness(test_config(), bilingual_source(), bilingual_target());
    let scheduler = MigrationScheduler::new(h.runner.clone());

    scheduler.schedule().await.unwrap();
    if scheduler.is_pending() {
        let err = scheduler.run_interactive().await.unwrap_err();
        assert!(matches!(err, MigrationError::Scheduling(_)));
    }
    scheduler.wait().await.unwrap();
    assert_eq!(h.status.states().last(), Some(&MigrationState::Completed));
}
