//! # Migration
//!
//! The processors that turn the source translation model into the target one,
//! the runner that sequences them and the scheduler that triggers runs.
//!
//! - [`linker`] - translation groups to group terms and relationships
//! - [`content_type`] - steppable linking for one post type or taxonomy
//! - [`languages`], [`options`], [`menus`] - single-shot stages
//! - [`no_lang`] - default language for objects without one
//! - [`strings`] - string translations into per-language catalogs
//! - [`orchestrator`] - preconditions and stage order
//! - [`scheduler`] - background and interactive triggers

pub mod content_type;
pub mod context;
pub mod languages;
pub mod linker;
pub mod menus;
pub mod no_lang;
pub mod options;
pub mod orchestrator;
pub mod scheduler;
pub mod strings;

pub use content_type::ContentTypeProcessor;
pub use context::MigrationContext;
pub use languages::LanguagesStage;
pub use linker::{LinkReport, TranslationGroupLinker};
pub use menus::{assign_menu_locations, MenusStage};
pub use no_lang::{AssignOutcome, DefaultLanguageAssigner};
pub use options::OptionsStage;
pub use orchestrator::{MigrationRunner, RunOutcome};
pub use scheduler::MigrationScheduler;
pub use strings::{StringCatalogMerger, StringPage};
