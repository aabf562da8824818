pub mod language;
pub mod voice;

use std::collections::BTreeSet;

use crate::api::ApiClient;
use crate::error::AppError;

pub use language::language_name;
pub use voice::{base_code, Gender, Voice, VoiceGroups, MULTILINGUAL_KEY};

pub const ALL_LANGUAGES: &str = "all";

/// One entry of the language picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    pub value: String,
    pub label: String,
}

impl LanguageOption {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

pub struct CatalogLoader {
    api: ApiClient,
}

impl CatalogLoader {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn load(&self) -> Result<VoiceGroups, AppError> {
        let groups = self.api.fetch_voices().await?;

        tracing::info!(
            "Loaded {} voices in {} groups",
            groups.voice_count(),
            groups.group_count()
        );

        Ok(groups)
    }
}

/// Picker entries: multilingual, all, then each base language once, sorted.
pub fn language_options(groups: &VoiceGroups) -> Vec<LanguageOption> {
    let mut options = vec![
        LanguageOption::new(MULTILINGUAL_KEY, "Multilingual"),
        LanguageOption::new(ALL_LANGUAGES, "All Languages"),
    ];

    // Lowercased to line up with the board's section keys.
    let bases: BTreeSet<String> = groups
        .locales()
        .map(|(key, _)| base_code(key).to_lowercase())
        .collect();

    options.extend(
        bases
            .iter()
            .map(|code| LanguageOption::new(code, &language_name(code))),
    );

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_options_dedup_and_sort() {
        let groups: VoiceGroups = serde_json::from_str(
            r#"{
                "fr-FR": [],
                "en-US": [],
                "en-GB": [],
                "multilingual": [],
                "de-DE": []
            }"#,
        )
        .unwrap();

        let values: Vec<String> = language_options(&groups)
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, vec!["multilingual", "all", "de", "en", "fr"]);
    }

    #[test]
    fn test_language_option_labels() {
        let groups: VoiceGroups = serde_json::from_str(r#"{"ja-JP": [], "xx-XX": []}"#).unwrap();
        let options = language_options(&groups);
        assert_eq!(options[0].label, "Multilingual");
        assert_eq!(options[1].label, "All Languages");
        assert_eq!(options[2], LanguageOption::new("ja", "Japanese"));
        assert_eq!(options[3], LanguageOption::new("xx", "xx"));
    }

    #[test]
    fn test_language_options_fold_case() {
        let groups: VoiceGroups =
            serde_json::from_str(r#"{"EN-US": [], "en-GB": [], "Fr-CA": []}"#).unwrap();

        let options = language_options(&groups);
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["multilingual", "all", "en", "fr"]);
        assert_eq!(options[2].label, "English");
    }

    #[test]
    fn test_empty_catalog_still_offers_synthetic_entries() {
        let options = language_options(&VoiceGroups::default());
        assert_eq!(options.len(), 2);
    }
}
