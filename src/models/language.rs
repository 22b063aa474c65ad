use crate::codec::php::{PhpKey, PhpValue};
use crate::constants::RTL_LOCALES;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// An active language of the source site with its native name.
/// Maps to `icl_languages` joined with `icl_languages_translations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SourceLanguage {
    pub code: String,
    pub locale: String,
    pub name: String,
}

/// Language to create in the target store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLanguage {
    pub name: String,
    pub slug: String,
    pub locale: String,
    pub rtl: bool,
    pub flag: String,
    /// Position of the language in the ordered list
    pub term_group: i64,
}

impl NewLanguage {
    pub fn from_source(language: &SourceLanguage, position: usize) -> Self {
        Self {
            name: language.name.clone(),
            slug: language.code.clone(),
            locale: language.locale.clone(),
            rtl: is_rtl_locale(&language.locale),
            flag: flag_code(&language.locale),
            term_group: position as i64,
        }
    }

    /// Description blob of the `language` term-taxonomy.
    pub fn description(&self) -> String {
        PhpValue::Array(vec![
            (PhpKey::Str("locale".into()), PhpValue::Str(self.locale.clone())),
            (PhpKey::Str("rtl".into()), PhpValue::Int(i64::from(self.rtl))),
            (PhpKey::Str("flag_code".into()), PhpValue::Str(self.flag.clone())),
        ])
        .encode()
    }
}

pub fn is_rtl_locale(locale: &str) -> bool {
    RTL_LOCALES.contains(&locale)
}

/// Country part of a locale, lowercased (`fr_FR` -> `fr`, `pt_BR` -> `br`).
pub fn flag_code(locale: &str) -> String {
    locale
        .split_once('_')
        .map(|(_, country)| country.to_ascii_lowercase())
        .unwrap_or_default()
}

/// A language that exists in the target store, with both of its taxonomy ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLanguage {
    pub code: String,
    pub name: String,
    pub locale: String,
    pub term_id: i64,
    /// Id in the primary `language` taxonomy (posts)
    pub term_taxonomy_id: i64,
    /// Id in the `term_language` taxonomy (terms)
    pub tl_term_taxonomy_id: i64,
}

/// Which language taxonomy a content shape is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageTaxonomy {
    Language,
    TermLanguage,
}

/// `{language_code -> taxonomy term id}` for one language taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTermIndex {
    ids: HashMap<String, i64>,
}

impl LanguageTermIndex {
    pub fn build(languages: &[TargetLanguage], taxonomy: LanguageTaxonomy) -> Self {
        let ids = languages
            .iter()
            .map(|lang| {
                let id = match taxonomy {
                    LanguageTaxonomy::Language => lang.term_taxonomy_id,
                    LanguageTaxonomy::TermLanguage => lang.tl_term_taxonomy_id,
                };
                (lang.code.clone(), id)
            })
            .filter(|(_, id)| *id != 0)
            .collect();
        Self { ids }
    }

    pub fn get(&self, language_code: &str) -> Option<i64> {
        self.ids.get(language_code).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for LanguageTermIndex {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Order discovered languages by the configured code order; languages missing
/// from `order` follow in discovery order. Duplicated codes keep their first
/// occurrence.
pub fn order_languages(languages: Vec<SourceLanguage>, order: &[String]) -> Vec<SourceLanguage> {
    let mut remaining: Vec<Option<SourceLanguage>> = languages.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    for code in order {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|l| &l.code == code))
        {
            ordered.extend(slot.take());
        }
    }
    ordered.extend(remaining.into_iter().flatten());

    let mut seen = std::collections::HashSet::new();
    ordered.retain(|lang| seen.insert(lang.code.clone()));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str) -> SourceLanguage {
        SourceLanguage {
            code: code.to_string(),
            locale: format!("{code}_XX"),
            name: code.to_uppercase(),
        }
    }

    fn codes(languages: &[SourceLanguage]) -> Vec<&str> {
        languages.iter().map(|l| l.code.as_str()).collect()
    }

    #[test]
    fn test_order_languages_appends_remainder() {
        let ordered = order_languages(
            vec![lang("en"), lang("fr"), lang("de")],
            &["fr".to_string(), "de".to_string()],
        );
        assert_eq!(codes(&ordered), vec!["fr", "de", "en"]);
    }

    #[test]
    fn test_order_languages_ignores_unknown_codes() {
        let ordered = order_languages(
            vec![lang("en"), lang("fr")],
            &["it".to_string(), "fr".to_string()],
        );
        assert_eq!(codes(&ordered), vec!["fr", "en"]);
    }

    #[test]
    fn test_new_language_flags() {
        let arabic = SourceLanguage {
            code: "ar".into(),
            locale: "ar".into(),
            name: "العربية".into(),
        };
        let new = NewLanguage::from_source(&arabic, 2);
        assert!(new.rtl);
        assert_eq!(new.flag, "");
        assert_eq!(new.term_group, 2);

        let french = NewLanguage::from_source(&lang("fr"), 0);
        assert!(!french.rtl);
        assert_eq!(flag_code("pt_BR"), "br");
        assert_eq!(
            NewLanguage::from_source(
                &SourceLanguage {
                    code: "fr".into(),
                    locale: "fr_FR".into(),
                    name: "Français".into(),
                },
                0
            )
            .description(),
            r#"a:3:{s:6:"locale";s:5:"fr_FR";s:3:"rtl";i:0;s:9:"flag_code";s:2:"fr";}"#
        );
        assert_eq!(french.slug, "fr");
    }

    #[test]
    fn test_language_term_index_per_taxonomy() {
        let languages = vec![TargetLanguage {
            code: "fr".into(),
            name: "Français".into(),
            locale: "fr_FR".into(),
            term_id: 2,
            term_taxonomy_id: 10,
            tl_term_taxonomy_id: 20,
        }];
        let posts = LanguageTermIndex::build(&languages, LanguageTaxonomy::Language);
        let terms = LanguageTermIndex::build(&languages, LanguageTaxonomy::TermLanguage);
        assert_eq!(posts.get("fr"), Some(10));
        assert_eq!(terms.get("fr"), Some(20));
        assert!(posts.get("de").is_none());
    }
}
