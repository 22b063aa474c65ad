use crate::codec::php::{PhpCodecError, PhpValue};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// A translated string of the source site.
/// Maps to `icl_strings` joined with `icl_string_translations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StringTranslationRow {
    pub source: Option<String>,
    pub language: String,
    pub translation: Option<String>,
}

impl StringTranslationRow {
    pub fn new(source: &str, language: &str, translation: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            language: language.to_string(),
            translation: Some(translation.to_string()),
        }
    }

    /// `(source, translation)` when both are non-empty.
    pub fn pair(&self) -> Option<(String, String)> {
        let source = self.source.as_deref().filter(|s| !s.is_empty())?;
        let translation = self.translation.as_deref().filter(|s| !s.is_empty())?;
        Some((source.to_string(), translation.to_string()))
    }
}

/// Message catalog of one language: source string -> translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringCatalog {
    entries: BTreeMap<String, String>,
}

impl StringCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry; the last write for a source string wins.
    pub fn insert(&mut self, source: impl Into<String>, translation: impl Into<String>) {
        self.entries.insert(source.into(), translation.into());
    }

    pub fn merge<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (source, translation) in pairs {
            self.insert(source, translation);
        }
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Stored form: a list of `[source, translation]` pairs.
    pub fn encode(&self) -> String {
        PhpValue::list(self.entries.iter().map(|(source, translation)| {
            PhpValue::list([
                PhpValue::Str(source.clone()),
                PhpValue::Str(translation.clone()),
            ])
        }))
        .encode()
    }

    /// Decode the stored form; malformed pairs are skipped.
    pub fn decode(raw: &str) -> Result<Self, PhpCodecError> {
        let value = PhpValue::decode(raw)?;
        let mut catalog = Self::new();
        for (_, pair) in value.as_array().unwrap_or_default() {
            let items = pair.as_array().unwrap_or_default();
            if let [(_, source), (_, translation), ..] = items {
                if let (Some(source), Some(translation)) = (source.as_str(), translation.as_str()) {
                    catalog.insert(source, translation);
                }
            }
        }
        Ok(catalog)
    }
}
