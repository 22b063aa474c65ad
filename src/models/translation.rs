use crate::codec::php::{PhpCodecError, PhpKey, PhpValue};
use crate::constants::GROUP_SLUG_PREFIX;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// One source row: an object in one language, member of one translation group.
/// Maps to `icl_translations` (joined through `term_taxonomy` for terms)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TranslationRow {
    pub trid: Option<i64>,
    pub language_code: Option<String>,
    pub object_id: Option<i64>,
}

impl TranslationRow {
    pub fn new(trid: i64, language_code: &str, object_id: i64) -> Self {
        Self {
            trid: Some(trid),
            language_code: Some(language_code.to_string()),
            object_id: Some(object_id),
        }
    }

    /// `(trid, language, object)` when every field is present and non-empty.
    fn valid_parts(&self) -> Option<(i64, &str, i64)> {
        let trid = self.trid.filter(|t| *t != 0)?;
        let language = self.language_code.as_deref().filter(|l| !l.is_empty())?;
        let object_id = self.object_id.filter(|id| *id != 0)?;
        Some((trid, language, object_id))
    }
}

/// Slug (and name) of the group term created for a source translation group.
pub fn group_slug(trid: i64) -> String {
    format!("{GROUP_SLUG_PREFIX}{trid}")
}

/// The per-language object ids of one translation group. Language codes are
/// unique; a later row for the same language replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationGroup {
    members: BTreeMap<String, i64>,
}

impl TranslationGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language_code: impl Into<String>, object_id: i64) {
        self.members.insert(language_code.into(), object_id);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, language_code: &str) -> Option<i64> {
        self.members.get(language_code).copied()
    }

    pub fn contains_object(&self, object_id: i64) -> bool {
        self.members.values().any(|id| *id == object_id)
    }

    /// `(language_code, object_id)` pairs in language order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.members.iter().map(|(l, id)| (l.as_str(), *id))
    }

    pub fn object_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.members.values().copied()
    }

    /// The value stored as the group term-taxonomy description.
    pub fn payload(&self) -> GroupPayload {
        GroupPayload(self.members.clone())
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for TranslationGroup {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut group = Self::new();
        for (language, object_id) in iter {
            group.insert(language, object_id);
        }
        group
    }
}

/// Groups keyed by their group term slug (`pll_wpml_<trid>`).
pub type TranslationGroups = BTreeMap<String, TranslationGroup>;

/// Fold source rows into groups keyed by `key`. Rows with a zero/missing
/// trid, an empty language code or a zero object id are dropped.
pub fn group_rows_by<K, F>(rows: &[TranslationRow], key: F) -> BTreeMap<K, TranslationGroup>
where
    K: Ord,
    F: Fn(i64) -> K,
{
    let mut groups: BTreeMap<K, TranslationGroup> = BTreeMap::new();
    for (trid, language, object_id) in rows.iter().filter_map(TranslationRow::valid_parts) {
        groups.entry(key(trid)).or_default().insert(language, object_id);
    }
    groups
}

/// Fold source rows into groups keyed by group slug.
pub fn group_rows(rows: &[TranslationRow]) -> TranslationGroups {
    group_rows_by(rows, group_slug)
}

/// Serialized `{language_code: object_id}` map of a group term-taxonomy.
///
/// Encoding is canonical: keys are sorted, so equal groups always produce the
/// same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPayload(pub BTreeMap<String, i64>);

impl GroupPayload {
    pub fn encode(&self) -> String {
        PhpValue::Array(
            self.0
                .iter()
                .map(|(lang, id)| (PhpKey::Str(lang.clone()), PhpValue::Int(*id)))
                .collect(),
        )
        .encode()
    }

    pub fn decode(raw: &str) -> Result<Self, PhpCodecError> {
        let value = PhpValue::decode(raw)?;
        let entries = value.as_array().ok_or(PhpCodecError::InvalidKey(0))?;
        Ok(Self(
            entries
                .iter()
                .filter_map(|(k, v)| v.as_i64().map(|id| (k.as_string(), id)))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_rows_drops_malformed_entries() {
        let rows = vec![
            TranslationRow::new(7, "fr", 205),
            TranslationRow::new(7, "de", 310),
            TranslationRow::new(7, "", 311),
            TranslationRow::new(7, "it", 0),
            TranslationRow::new(0, "es", 400),
            TranslationRow {
                trid: Some(8),
                language_code: None,
                object_id: Some(500),
            },
        ];

        let groups = group_rows(&rows);
        assert_eq!(groups.len(), 1);
        let group = &groups["pll_wpml_7"];
        assert_eq!(group.len(), 2);
        assert_eq!(group.get("fr"), Some(205));
        assert_eq!(group.get("de"), Some(310));
    }

    #[test]
    fn test_group_without_valid_entries_is_absent() {
        let rows = vec![TranslationRow::new(9, "", 1), TranslationRow::new(9, "fr", 0)];
        assert!(group_rows(&rows).is_empty());
    }

    #[test]
    fn test_group_rows_by_raw_trid() {
        let rows = vec![TranslationRow::new(3, "en", 11), TranslationRow::new(3, "fr", 12)];
        let groups = group_rows_by(&rows, |trid| trid);
        assert!(groups[&3].contains_object(12));
    }

    #[test]
    fn test_payload_encoding_is_key_sorted() {
        let group: TranslationGroup = [("fr", 205), ("de", 310)].into_iter().collect();
        let payload = group.payload();
        assert_eq!(payload.encode(), r#"a:2:{s:2:"de";i:310;s:2:"fr";i:205;}"#);
        assert_eq!(GroupPayload::decode(&payload.encode()).unwrap(), payload);
    }
}
