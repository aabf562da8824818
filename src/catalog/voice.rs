use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Group key the service uses for voices that speak several languages.
pub const MULTILINGUAL_KEY: &str = "multilingual";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Gender {
    Male,
    Female,
    #[serde(other)]
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Voice {
    /// Engine id, e.g. `en-US-AriaNeural`.
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    pub language: String,
    pub gender: Gender,
    #[serde(default)]
    pub personalities: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Voice {
    /// Base language code, the segment before the first `-`.
    pub fn base_language(&self) -> &str {
        base_code(&self.language)
    }

    pub fn personality_tags(&self) -> Vec<&str> {
        match &self.personalities {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn avatar(&self) -> String {
        match &self.avatar_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => default_avatar_url(&self.name, self.gender),
        }
    }
}

pub fn base_code(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

fn default_avatar_url(voice_id: &str, gender: Gender) -> String {
    let background = match gender {
        Gender::Female => "0ea5e9",
        _ => "3b82f6",
    };
    format!(
        "https://api.dicebear.com/7.x/micah/svg?seed={}&backgroundColor={}",
        voice_id, background
    )
}

/// Voices keyed by locale code or [`MULTILINGUAL_KEY`], exactly as served.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VoiceGroups(BTreeMap<String, Vec<Arc<Voice>>>);

impl VoiceGroups {
    pub fn new(groups: BTreeMap<String, Vec<Arc<Voice>>>) -> Self {
        Self(groups)
    }

    pub fn get(&self, key: &str) -> Option<&[Arc<Voice>]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn multilingual(&self) -> Option<&[Arc<Voice>]> {
        self.get(MULTILINGUAL_KEY)
    }

    /// Locale groups in key order, skipping the multilingual group.
    pub fn locales(&self) -> impl Iterator<Item = (&str, &[Arc<Voice>])> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != MULTILINGUAL_KEY)
            .map(|(key, voices)| (key.as_str(), voices.as_slice()))
    }

    /// Every voice, multilingual ones first.
    pub fn all_voices(&self) -> impl Iterator<Item = &Arc<Voice>> {
        self.multilingual()
            .unwrap_or_default()
            .iter()
            .chain(self.locales().flat_map(|(_, voices)| voices.iter()))
    }

    pub fn voice_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn group_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_voice(&self, voice_id: &str) -> bool {
        self.all_voices().any(|v| v.name == voice_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> VoiceGroups {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_minimal_voice() {
        let groups = parse(
            r#"{"en-US": [{"name": "en-US-AriaNeural", "display_name": "Microsoft Aria Online (Natural)",
                           "language": "en-US", "gender": "Female"}]}"#,
        );
        let voice = &groups.get("en-US").unwrap()[0];
        assert_eq!(voice.name, "en-US-AriaNeural");
        assert_eq!(voice.gender, Gender::Female);
        assert!(voice.short_name.is_none());
        assert_eq!(voice.base_language(), "en");
    }

    #[test]
    fn test_unrecognised_gender() {
        let groups = parse(
            r#"{"de-DE": [{"name": "x", "display_name": "X", "language": "de-DE", "gender": "Neutral"}]}"#,
        );
        assert_eq!(groups.get("de-DE").unwrap()[0].gender, Gender::Unknown);
    }

    #[test]
    fn test_all_voices_puts_multilingual_first() {
        let groups = parse(
            r#"{
                "en-US": [{"name": "en-US-GuyNeural", "display_name": "Guy", "language": "en-US", "gender": "Male"}],
                "multilingual": [{"name": "en-US-AvaMultilingualNeural", "display_name": "Ava Multilingual",
                                  "language": "en-US", "gender": "Female"}]
            }"#,
        );
        let ids: Vec<&str> = groups.all_voices().map(|v| v.name.as_str()).collect();
        assert_eq!(ids, vec!["en-US-AvaMultilingualNeural", "en-US-GuyNeural"]);
        assert_eq!(groups.voice_count(), 2);
        assert_eq!(groups.locales().count(), 1);
    }

    #[test]
    fn test_personality_tags_trimmed() {
        let voice = Voice {
            name: "v".into(),
            display_name: "V".into(),
            short_name: None,
            language: "en-US".into(),
            gender: Gender::Male,
            personalities: Some("Warm, Confident ,, Calm".into()),
            avatar_url: None,
        };
        assert_eq!(voice.personality_tags(), vec!["Warm", "Confident", "Calm"]);
    }

    #[test]
    fn test_avatar_fallback_by_gender() {
        let mut voice = Voice {
            name: "en-US-AriaNeural".into(),
            display_name: "Aria".into(),
            short_name: None,
            language: "en-US".into(),
            gender: Gender::Female,
            personalities: None,
            avatar_url: None,
        };
        assert!(voice.avatar().contains("seed=en-US-AriaNeural"));
        assert!(voice.avatar().ends_with("0ea5e9"));

        voice.avatar_url = Some("https://cdn.example/aria.png".into());
        assert_eq!(voice.avatar(), "https://cdn.example/aria.png");
    }
}
