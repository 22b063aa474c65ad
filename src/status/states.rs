use serde::{Deserialize, Serialize};
use std::fmt;

/// Migration status codes. Codes are ordered hints of progress, not a strict
/// sequence; the numeric values are part of the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum MigrationState {
    /// Scheduled, waiting for the deferred job to start
    Waiting,
    Languages,
    Options,
    PostTypesStarted,
    PostTypeProcessing,
    TaxonomiesStarted,
    TaxonomyProcessing,
    Menus,
    ObjectsWithNoLanguage,
    ObjectsWithNoLanguagePosts,
    ObjectsWithNoLanguageTerms,
    StringTranslations,
    Completed,
    Errored,
}

impl MigrationState {
    pub fn code(&self) -> i64 {
        match self {
            Self::Waiting => 0,
            Self::Languages => 10,
            Self::Options => 15,
            Self::PostTypesStarted => 20,
            Self::PostTypeProcessing => 25,
            Self::TaxonomiesStarted => 30,
            Self::TaxonomyProcessing => 35,
            Self::Menus => 40,
            Self::ObjectsWithNoLanguage => 45,
            Self::ObjectsWithNoLanguagePosts => 50,
            Self::ObjectsWithNoLanguageTerms => 55,
            Self::StringTranslations => 60,
            Self::Completed => 100,
            Self::Errored => 400,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        let state = match code {
            0 => Self::Waiting,
            10 => Self::Languages,
            15 => Self::Options,
            20 => Self::PostTypesStarted,
            25 => Self::PostTypeProcessing,
            30 => Self::TaxonomiesStarted,
            35 => Self::TaxonomyProcessing,
            40 => Self::Menus,
            45 => Self::ObjectsWithNoLanguage,
            50 => Self::ObjectsWithNoLanguagePosts,
            55 => Self::ObjectsWithNoLanguageTerms,
            60 => Self::StringTranslations,
            100 => Self::Completed,
            400 => Self::Errored,
            _ => return None,
        };
        Some(state)
    }

    /// `Completed` and `Errored` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }

    /// A run is in flight (scheduled or migrating).
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl From<MigrationState> for i64 {
    fn from(state: MigrationState) -> Self {
        state.code()
    }
}

impl TryFrom<i64> for MigrationState {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("Invalid migration status code: {code}"))
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::Languages => "migrating_languages",
            Self::Options => "migrating_options",
            Self::PostTypesStarted => "migrating_post_types_started",
            Self::PostTypeProcessing => "migrating_post_type_processing",
            Self::TaxonomiesStarted => "migrating_taxonomies_started",
            Self::TaxonomyProcessing => "migrating_taxonomy_processing",
            Self::Menus => "migrating_menus",
            Self::ObjectsWithNoLanguage => "migrating_objects_with_no_language",
            Self::ObjectsWithNoLanguagePosts => "migrating_objects_with_no_language_posts",
            Self::ObjectsWithNoLanguageTerms => "migrating_objects_with_no_language_terms",
            Self::StringTranslations => "migrating_string_translations",
            Self::Completed => "completed",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

impl Default for MigrationState {
    fn default() -> Self {
        Self::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(MigrationState::Completed.is_terminal());
        assert!(MigrationState::Errored.is_terminal());
        assert!(!MigrationState::Waiting.is_terminal());
        assert!(MigrationState::StringTranslations.is_active());
    }

    #[test]
    fn test_codes_round_trip() {
        for code in [0, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 100, 400] {
            let state = MigrationState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert!(MigrationState::from_code(11).is_none());
    }

    #[test]
    fn test_serde_uses_numeric_codes() {
        let json = serde_json::to_string(&MigrationState::TaxonomyProcessing).unwrap();
        assert_eq!(json, "35");
        let parsed: MigrationState = serde_json::from_str("400").unwrap();
        assert_eq!(parsed, MigrationState::Errored);
        assert!(serde_json::from_str::<MigrationState>("7").is_err());
    }

    #[test]
    fn test_stage_codes_are_ordered() {
        let stages = [
            MigrationState::Waiting,
            MigrationState::Languages,
            MigrationState::Options,
            MigrationState::PostTypesStarted,
            MigrationState::PostTypeProcessing,
            MigrationState::TaxonomiesStarted,
            MigrationState::TaxonomyProcessing,
            MigrationState::Menus,
            MigrationState::ObjectsWithNoLanguage,
            MigrationState::StringTranslations,
            MigrationState::Completed,
        ];
        assert!(stages.windows(2).all(|w| w[0].code() < w[1].code()));
    }
}
