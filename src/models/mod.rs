//! # Data Models
//!
//! Values exchanged between the source store, the migration processors and
//! the target store.
//!
//! - [`translation`] - source translation rows, translation groups and their serialized payload
//! - [`language`] - source/target languages, ordering and per-taxonomy term indexes
//! - [`settings`] - source and target settings documents
//! - [`catalog`] - string translations and per-language message catalogs
//! - [`content`] - content shapes (post type / taxonomy) and object kinds

pub mod catalog;
pub mod content;
pub mod language;
pub mod settings;
pub mod translation;

pub use catalog::{StringCatalog, StringTranslationRow};
pub use content::{ContentShape, ObjectKind, ObjectScope, UnassignedObjects};
pub use language::{
    order_languages, LanguageTaxonomy, LanguageTermIndex, NewLanguage, SourceLanguage,
    TargetLanguage,
};
pub use settings::{MenuLocations, PolylangSettings, WpmlSettings};
pub use translation::{
    group_rows, group_rows_by, group_slug, GroupPayload, TranslationGroup, TranslationGroups,
    TranslationRow,
};
