#![allow(clippy::doc_markdown)] // Allow technical terms like WordPress, MySQL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # WPML to Polylang
//!
//! Resumable batch migration of a WordPress site's WPML translation metadata
//! into the taxonomy model Polylang reads.
//!
//! ## Overview
//!
//! WPML keeps translation groups in its own tables. Polylang models the same
//! information with ordinary WordPress terms: one `language` term per language,
//! and one `post_translations` / `term_translations` term per translation group
//! whose description holds the serialized `language => object id` map.
//!
//! A run moves through fixed stages, reporting a coarse state and a percentage
//! into an options-table record that survives process restarts:
//!
//! 1. languages, 2. plugin options, 3. post types, 4. taxonomies,
//! 5. menu locations, 6. default language for untranslated objects,
//! 7. string translations, then completion.
//!
//! Large tables are walked page by page against an execution budget, so a run
//! that runs out of time stops cleanly and can be started again.
//!
//! ## Module Organization
//!
//! - [`codec`] - PHP `serialize()` format used by WordPress options and term descriptions
//! - [`models`] - languages, translation groups, settings and string catalogs
//! - [`status`] - migration states and the persisted status record
//! - [`processing`] - paging cursor, execution deadline and the steppable driver
//! - [`store`] - source/target store traits with in-memory implementations
//! - [`database`] - MySQL implementations of the stores
//! - [`migration`] - the stages, the runner and the scheduler
//! - [`config`] - layered configuration (file + `W2P_*` environment)
//! - [`logging`] - structured logging setup
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wpml_to_polylang::config::MigrationConfig;
//! use wpml_to_polylang::database::{
//!     DatabaseConnection, SqlxSourceStore, SqlxStatusStore, SqlxTargetStore,
//! };
//! use wpml_to_polylang::migration::MigrationRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MigrationConfig::load()?;
//! let db = DatabaseConnection::connect(&config).await?;
//! let pool = db.pool().clone();
//!
//! let runner = MigrationRunner::new(
//!     config.clone(),
//!     Arc::new(SqlxSourceStore::new(pool.clone(), &config.table_prefix)),
//!     Arc::new(SqlxTargetStore::new(pool.clone(), &config.table_prefix)),
//!     Arc::new(SqlxStatusStore::new(pool, &config.table_prefix)),
//! );
//! let outcome = runner.run().await?;
//! println!("completed: {}", outcome.is_completed());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod migration;
pub mod models;
pub mod processing;
pub mod status;
pub mod store;

pub use config::MigrationConfig;
pub use error::{MigrationError, MigrationResult};
pub use migration::{MigrationRunner, MigrationScheduler, RunOutcome};
pub use status::{MigrationState, MigrationStatusRecord, StatusStore};
pub use store::{SourceStore, TargetStore, TermStore};
