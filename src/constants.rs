//! # Migration Constants
//!
//! Fixed names shared between the source (WPML) schema, the target (Polylang)
//! schema and the migration engine itself.

/// Default number of rows fetched per page.
pub const DEFAULT_BATCH_SIZE: u32 = 5000;

/// Default execution budget for one run. Never zero.
pub const DEFAULT_EXECUTION_TIME_BUDGET_SECS: u64 = 7200;

/// Default pause between two pages.
pub const DEFAULT_PAGE_PAUSE_MS: u64 = 10;

/// Default WordPress table prefix.
pub const DEFAULT_TABLE_PREFIX: &str = "wp_";

/// Prefix used to derive a group term slug from a source translation group id.
pub const GROUP_SLUG_PREFIX: &str = "pll_wpml_";

/// Target taxonomy names
pub mod taxonomies {
    /// Primary language taxonomy (posts).
    pub const LANGUAGE: &str = "language";
    /// Secondary language taxonomy (terms).
    pub const TERM_LANGUAGE: &str = "term_language";
    /// Translation groups of posts.
    pub const POST_TRANSLATIONS: &str = "post_translations";
    /// Translation groups of terms.
    pub const TERM_TRANSLATIONS: &str = "term_translations";
    /// Slug prefix of the `term_language` term of a language.
    pub const TERM_LANGUAGE_SLUG_PREFIX: &str = "pll_";
}

/// Option names in the key-value options table
pub mod options {
    /// Source settings blob.
    pub const WPML_SETTINGS: &str = "icl_sitepress_settings";
    /// Target settings blob.
    pub const POLYLANG_SETTINGS: &str = "polylang";
    /// Migration status record.
    pub const MIGRATION_STATUS: &str = "wpml-to-polylang-migration-migration-status";
    pub const DEFAULT_CATEGORY: &str = "default_category";
    pub const STYLESHEET: &str = "stylesheet";
    pub const THEME_MODS_PREFIX: &str = "theme_mods_";
    pub const NAV_MENU_LOCATIONS: &str = "nav_menu_locations";
}

/// Term meta key holding a language's string catalog.
pub const STRINGS_TRANSLATIONS_META_KEY: &str = "_pll_strings_translations";

/// Post types always migrated, whatever the source settings say.
pub const BUILTIN_POST_TYPES: &[&str] = &["post", "page", "wp_block"];

/// Post types never migrated.
pub const EXCLUDED_POST_TYPES: &[&str] = &["wp_template"];

/// Taxonomies always migrated.
pub const BUILTIN_TAXONOMIES: &[&str] = &["category", "post_tag"];

/// Taxonomies never migrated.
pub const EXCLUDED_TAXONOMIES: &[&str] = &["wp_theme", "wp_template_part_area"];

/// Taxonomy carrying navigation menus.
pub const NAV_MENU_TAXONOMY: &str = "nav_menu";

/// Locales written right-to-left.
pub const RTL_LOCALES: &[&str] = &[
    "ar", "arq", "ary", "azb", "ckb", "dv", "fa_AF", "fa_IR", "haz", "he_IL", "ps", "sd_PK",
    "ug_CN", "ur", "yi",
];
