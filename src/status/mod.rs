//! # Migration Status
//!
//! The process-wide progress record. It is rewritten after every meaningful
//! transition, read by external pollers, and is the only state that survives
//! a process restart.
//!
//! - [`states`] - status codes and their ordering
//! - [`record`] - the persisted record and its human-readable message
//! - [`persistence`] - the store seam and the status writer used by processors

pub mod persistence;
pub mod record;
pub mod states;

pub use persistence::{InMemoryStatusStore, MigrationStatus, StatusStore};
pub use record::MigrationStatusRecord;
pub use states::MigrationState;
