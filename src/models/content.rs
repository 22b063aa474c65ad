use crate::constants::taxonomies::{POST_TRANSLATIONS, TERM_TRANSLATIONS};
use crate::models::language::LanguageTaxonomy;
use crate::status::MigrationState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A content type whose translation groups are migrated. The shape decides
/// the source query, the language taxonomy and the group taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", content = "name", rename_all = "snake_case")]
pub enum ContentShape {
    PostType(String),
    Taxonomy(String),
}

impl ContentShape {
    /// Content type name (`page`, `category`, ...).
    pub fn name(&self) -> &str {
        match self {
            Self::PostType(name) | Self::Taxonomy(name) => name,
        }
    }

    /// Source `element_type` tag.
    pub fn element_type(&self) -> String {
        match self {
            Self::PostType(name) => format!("post_{name}"),
            Self::Taxonomy(name) => format!("tax_{name}"),
        }
    }

    pub fn group_taxonomy(&self) -> &'static str {
        match self {
            Self::PostType(_) => POST_TRANSLATIONS,
            Self::Taxonomy(_) => TERM_TRANSLATIONS,
        }
    }

    pub fn language_taxonomy(&self) -> LanguageTaxonomy {
        match self {
            Self::PostType(_) => LanguageTaxonomy::Language,
            Self::Taxonomy(_) => LanguageTaxonomy::TermLanguage,
        }
    }

    /// Status written for each page of this shape.
    pub fn processing_state(&self) -> MigrationState {
        match self {
            Self::PostType(_) => MigrationState::PostTypeProcessing,
            Self::Taxonomy(_) => MigrationState::TaxonomyProcessing,
        }
    }
}

impl fmt::Display for ContentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostType(name) => write!(f, "post type {name}"),
            Self::Taxonomy(name) => write!(f, "taxonomy {name}"),
        }
    }
}

/// Object kinds that carry a language directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Post,
    Term,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::Term => write!(f, "term"),
        }
    }
}

/// Object ids lacking a language, one batch per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnassignedObjects {
    pub posts: Vec<i64>,
    pub terms: Vec<i64>,
}

impl UnassignedObjects {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.terms.is_empty()
    }
}

/// Post types and taxonomies in scope for default-language assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectScope {
    pub post_types: Vec<String>,
    pub taxonomies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_properties() {
        let page = ContentShape::PostType("page".into());
        assert_eq!(page.element_type(), "post_page");
        assert_eq!(page.group_taxonomy(), "post_translations");
        assert_eq!(page.language_taxonomy(), LanguageTaxonomy::Language);

        let category = ContentShape::Taxonomy("category".into());
        assert_eq!(category.element_type(), "tax_category");
        assert_eq!(category.group_taxonomy(), "term_translations");
        assert_eq!(category.language_taxonomy(), LanguageTaxonomy::TermLanguage);
        assert_eq!(category.processing_state(), MigrationState::TaxonomyProcessing);
        assert_eq!(category.to_string(), "taxonomy category");
    }
}
