//! # Steppable Processing
//!
//! Paginated processing of datasets too large to hold in memory or to finish
//! in one request.
//!
//! - [`cursor`] - offset and percentage math for one step
//! - [`deadline`] - the execution budget checked between pages
//! - [`steppable`] - the `Steppable` contract and its drive loop

pub mod cursor;
pub mod deadline;
pub mod steppable;

pub use cursor::{BatchCursor, ProcessingState};
pub use deadline::Deadline;
pub use steppable::{DriveOutcome, PageData, StepProgress, Steppable, SteppableProcessor};
