//! # Store Collaborators
//!
//! The migration engine reads the source plugin tables through [`SourceStore`]
//! and writes the target model through [`TargetStore`]. The relational
//! implementations live in [`crate::database`]; [`memory`] holds in-process
//! versions with the same semantics.

pub mod memory;
pub mod traits;

pub use memory::{InMemorySource, InMemoryTarget};
pub use traits::{NewTermTaxonomy, SourceStore, TargetStore, TermStore};
