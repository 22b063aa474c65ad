use super::states::MigrationState;
use crate::error::MigrationResult;
use serde::{Deserialize, Serialize};

/// The persisted status record: `{"status": 25, "percentage": 41, "contentType": "page"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatusRecord {
    pub status: MigrationState,
    pub percentage: Option<u8>,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
}

impl MigrationStatusRecord {
    pub fn new(status: MigrationState) -> Self {
        Self {
            status,
            percentage: None,
            content_type: None,
        }
    }

    pub fn with_progress(
        status: MigrationState,
        percentage: Option<u8>,
        content_type: Option<&str>,
    ) -> Self {
        Self {
            status,
            percentage: percentage.map(|p| p.min(100)),
            content_type: content_type.map(str::to_string),
        }
    }

    pub fn to_json(&self) -> MigrationResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> MigrationResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Human-readable description of the record.
    pub fn message(&self) -> String {
        let percentage = self.percentage.unwrap_or(0);
        let content_type = self.content_type.as_deref().unwrap_or("");
        match self.status {
            MigrationState::Waiting => {
                "Waiting for the scheduled job to take over the request".into()
            }
            MigrationState::Completed => {
                "Import from WPML to Polylang should have been successful!".into()
            }
            MigrationState::Errored => {
                "An error occurred during the import, please check your logs".into()
            }
            MigrationState::Languages => "Processing languages".into(),
            MigrationState::Options => "Processing options".into(),
            MigrationState::PostTypesStarted => "Started processing post types".into(),
            MigrationState::PostTypeProcessing => {
                format!("Processing post type: {content_type} - {percentage}%")
            }
            MigrationState::TaxonomiesStarted => "Started processing taxonomies".into(),
            MigrationState::TaxonomyProcessing => {
                format!("Processing taxonomy: {content_type} - {percentage}%")
            }
            MigrationState::Menus => "Processing menus".into(),
            MigrationState::ObjectsWithNoLanguage => {
                "Processing objects with no translations".into()
            }
            MigrationState::ObjectsWithNoLanguagePosts => {
                "Processing objects with no translations: posts".into()
            }
            MigrationState::ObjectsWithNoLanguageTerms => {
                "Processing objects with no translations: terms".into()
            }
            MigrationState::StringTranslations => {
                format!("Processing string translations: {percentage}%")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_layout() {
        let record = MigrationStatusRecord::with_progress(
            MigrationState::PostTypeProcessing,
            Some(41),
            Some("page"),
        );
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"status":25,"percentage":41,"contentType":"page"}"#
        );

        let bare = MigrationStatusRecord::new(MigrationState::Menus);
        assert_eq!(
            bare.to_json().unwrap(),
            r#"{"status":40,"percentage":null,"contentType":null}"#
        );
    }

    #[test]
    fn test_parse_record() {
        let record =
            MigrationStatusRecord::from_json(r#"{"status":60,"percentage":83,"contentType":null}"#)
                .unwrap();
        assert_eq!(record.status, MigrationState::StringTranslations);
        assert_eq!(record.percentage, Some(83));
        assert_eq!(record.message(), "Processing string translations: 83%");
    }

    #[test]
    fn test_percentage_is_capped() {
        let record = MigrationStatusRecord::with_progress(
            MigrationState::StringTranslations,
            Some(140),
            None,
        );
        assert_eq!(record.percentage, Some(100));
    }

    #[test]
    fn test_processing_message_names_content_type() {
        let record = MigrationStatusRecord::with_progress(
            MigrationState::TaxonomyProcessing,
            Some(12),
            Some("category"),
        );
        assert_eq!(record.message(), "Processing taxonomy: category - 12%");
    }
}
