use super::{GroupKey, VoiceBoard};
use crate::catalog::{ALL_LANGUAGES, MULTILINGUAL_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LanguageFilter {
    #[default]
    All,
    Multilingual,
    /// Lowercase base language code.
    Base(String),
}

impl LanguageFilter {
    /// Reads a picker value: `all` (or nothing), `multilingual`, or a
    /// language code whose base segment is kept.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_LANGUAGES) {
            LanguageFilter::All
        } else if value.eq_ignore_ascii_case(MULTILINGUAL_KEY) {
            LanguageFilter::Multilingual
        } else {
            let base = value.split('-').next().unwrap_or(value);
            LanguageFilter::Base(base.to_lowercase())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LanguageFilter::All => ALL_LANGUAGES,
            LanguageFilter::Multilingual => MULTILINGUAL_KEY,
            LanguageFilter::Base(code) => code,
        }
    }

    fn admits(&self, key: &GroupKey) -> bool {
        match (self, key) {
            (LanguageFilter::All, _) => true,
            (LanguageFilter::Multilingual, GroupKey::Multilingual) => true,
            (LanguageFilter::Base(code), GroupKey::Language(group)) => code == group,
            _ => false,
        }
    }
}

/// What the board is currently narrowed by. Each filter call replaces the
/// whole state: picking a language drops the search term, and a search runs
/// across every language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterState {
    Language(LanguageFilter),
    /// Lowercase, trimmed, never empty.
    Search(String),
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState::Language(LanguageFilter::All)
    }
}

impl VoiceBoard {
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_by_language(&mut self, code: &str) {
        self.set_filter(FilterState::Language(LanguageFilter::parse(code)));
    }

    /// An empty or blank term resets to showing everything.
    pub fn filter_by_search(&mut self, term: &str) {
        let term = term.trim();
        let state = if term.is_empty() {
            FilterState::Language(LanguageFilter::All)
        } else {
            FilterState::Search(term.to_lowercase())
        };
        self.set_filter(state);
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        tracing::debug!("Filter set to {:?}", filter);
        self.filter = filter;
        self.apply_filter();
    }

    /// Recomputes every visibility flag from the filter state.
    pub(crate) fn apply_filter(&mut self) {
        match &self.filter {
            FilterState::Language(language) => {
                for section in &mut self.sections {
                    let shown = language.admits(&section.key);
                    section.visible = shown;
                    for row in &mut section.rows {
                        row.visible = shown && language.admits(&row.group);
                        for card in &mut row.cards {
                            card.visible = row.visible;
                        }
                    }
                }
            }
            FilterState::Search(needle) => {
                for section in &mut self.sections {
                    let mut any_in_section = false;
                    for row in &mut section.rows {
                        let mut any_in_row = false;
                        for card in &mut row.cards {
                            card.visible = card.matches(needle);
                            any_in_row |= card.visible;
                        }
                        row.visible = any_in_row;
                        any_in_section |= any_in_row;
                    }
                    section.visible = any_in_section;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::render;
    use crate::catalog::VoiceGroups;

    fn board() -> VoiceBoard {
        let groups: VoiceGroups = serde_json::from_str(
            r#"{
                "en-US": [
                    {"name": "en-US-AriaNeural", "display_name": "Microsoft Aria Online (Natural)", "language": "en-US", "gender": "Female"},
                    {"name": "en-US-GuyNeural", "display_name": "Microsoft Guy Online (Natural)", "language": "en-US", "gender": "Male"}
                ],
                "fr-FR": [
                    {"name": "fr-FR-DeniseNeural", "display_name": "Microsoft Denise Online (Natural)", "language": "fr-FR", "gender": "Female"}
                ],
                "multilingual": [
                    {"name": "fr-FR-RemyMultilingualNeural", "display_name": "Microsoft RemyMultilingual Online (Natural)", "language": "fr-FR", "gender": "Male"}
                ]
            }"#,
        )
        .unwrap();
        let mut board = VoiceBoard::default();
        render(&groups, &mut board, "en-US-AriaNeural");
        board
    }

    fn visible_ids(board: &VoiceBoard) -> Vec<&str> {
        board.visible_cards().map(|c| c.voice_id()).collect()
    }

    #[test]
    fn test_parse_language_filter() {
        assert_eq!(LanguageFilter::parse("all"), LanguageFilter::All);
        assert_eq!(LanguageFilter::parse(""), LanguageFilter::All);
        assert_eq!(LanguageFilter::parse("Multilingual"), LanguageFilter::Multilingual);
        assert_eq!(LanguageFilter::parse("EN-us"), LanguageFilter::Base("en".into()));
        assert_eq!(LanguageFilter::Base("fr".into()).as_str(), "fr");
    }

    #[test]
    fn test_filter_by_language() {
        let mut board = board();
        board.filter_by_language("fr");
        assert_eq!(visible_ids(&board), vec!["fr-FR-DeniseNeural"]);

        let visible_sections: Vec<bool> = board.sections().iter().map(|s| s.visible).collect();
        assert_eq!(visible_sections, vec![false, false, true]);
    }

    #[test]
    fn test_multilingual_shows_only_its_group() {
        let mut board = board();
        board.filter_by_language("multilingual");
        assert_eq!(visible_ids(&board), vec!["fr-FR-RemyMultilingualNeural"]);
        assert!(board
            .sections()
            .iter()
            .all(|s| s.visible == (s.key == GroupKey::Multilingual)));
    }

    #[test]
    fn test_all_restores_everything() {
        let mut board = board();
        let total = board.cards().count();

        board.filter_by_language("fr");
        board.filter_by_language("all");
        assert_eq!(visible_ids(&board).len(), total);

        board.filter_by_search("zzz");
        assert_eq!(visible_ids(&board).len(), 0);
        board.filter_by_language("all");
        assert_eq!(visible_ids(&board).len(), total);

        board.filter_by_language("all");
        assert_eq!(visible_ids(&board).len(), total);
    }

    #[test]
    fn test_search_is_case_insensitive_on_language() {
        let mut board = board();
        board.filter_by_search("ENGLISH");
        assert_eq!(visible_ids(&board), vec!["en-US-AriaNeural", "en-US-GuyNeural"]);
    }

    #[test]
    fn test_search_by_name_spans_languages() {
        let mut board = board();
        board.filter_by_language("fr");
        board.filter_by_search("guy");

        assert_eq!(visible_ids(&board), vec!["en-US-GuyNeural"]);
        let english = &board.sections()[1];
        assert!(english.visible);
        assert!(!board.sections()[0].visible);
        assert!(!board.sections()[2].visible);
    }

    #[test]
    fn test_empty_search_resets() {
        let mut board = board();
        board.filter_by_search("denise");
        assert_eq!(visible_ids(&board).len(), 1);
        board.filter_by_search("   ");
        assert_eq!(board.filter(), &FilterState::Language(LanguageFilter::All));
        assert_eq!(visible_ids(&board).len(), 4);
    }

    #[test]
    fn test_filtering_keeps_selection() {
        let mut board = board();
        board.filter_by_language("fr");
        assert_eq!(board.selected_card().unwrap().voice_id(), "en-US-AriaNeural");
    }

    #[test]
    fn test_filter_survives_rerender() {
        let mut board = board();
        board.filter_by_language("multilingual");
        let groups: VoiceGroups = serde_json::from_str(
            r#"{"de-DE": [{"name": "de-DE-KatjaNeural", "display_name": "Katja", "language": "de-DE", "gender": "Female"}]}"#,
        )
        .unwrap();
        render(&groups, &mut board, "");
        assert!(visible_ids(&board).is_empty());
        assert_eq!(board.cards().count(), 1);
    }
}
