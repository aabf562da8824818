//! In-memory view of the voice catalog: language sections, fixed-size rows
//! of cards, selection and visibility.

pub mod filter;
pub mod name;
pub mod showcase;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{base_code, language_name, Voice, VoiceGroups};
use crate::error::AppError;

pub use filter::{FilterState, LanguageFilter};
pub use name::{display_name, simplify_voice_name};
pub use showcase::{featured_voices, preview_voices, showcase_cards};

pub const CARDS_PER_ROW: usize = 6;

/// Which group a section or row was rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Multilingual,
    /// Lowercase base language code, e.g. `en`.
    Language(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutVariant {
    Grid,
    Featured,
    Preview,
}

impl LayoutVariant {
    /// How many personality tags a card shows, `None` for all of them.
    pub fn max_tags(&self) -> Option<usize> {
        match self {
            LayoutVariant::Grid | LayoutVariant::Preview => Some(2),
            LayoutVariant::Featured => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub batch_size: usize,
    pub variant: LayoutVariant,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            batch_size: CARDS_PER_ROW,
            variant: LayoutVariant::Grid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Card {
    pub voice: Arc<Voice>,
    pub display_name: String,
    pub language_name: String,
    pub tags: Vec<String>,
    pub avatar_url: String,
    pub selected: bool,
    pub visible: bool,
}

impl Card {
    pub fn new(voice: &Arc<Voice>, variant: LayoutVariant) -> Self {
        let mut tags: Vec<String> = voice
            .personality_tags()
            .into_iter()
            .map(String::from)
            .collect();
        if let Some(limit) = variant.max_tags() {
            tags.truncate(limit);
        }
        if tags.is_empty() {
            tags.push(voice.gender.as_str().to_string());
        }

        Self {
            voice: Arc::clone(voice),
            display_name: display_name(voice),
            language_name: language_name(&voice.language),
            tags,
            avatar_url: voice.avatar(),
            selected: false,
            visible: true,
        }
    }

    pub fn voice_id(&self) -> &str {
        &self.voice.name
    }

    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.display_name.to_lowercase().contains(needle)
            || self.language_name.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    pub group: GroupKey,
    pub visible: bool,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub key: GroupKey,
    pub language_name: String,
    pub count: usize,
    pub visible: bool,
    pub rows: Vec<Row>,
}

impl Section {
    pub fn header(&self) -> String {
        format!("{} ({})", self.language_name, self.count)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.rows.iter().flat_map(|row| row.cards.iter())
    }
}

/// Position of a card on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRef {
    pub section: usize,
    pub row: usize,
    pub card: usize,
}

#[derive(Debug, Default)]
pub struct VoiceBoard {
    sections: Vec<Section>,
    options: RenderOptions,
    filter: FilterState,
}

impl VoiceBoard {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            sections: Vec::new(),
            options,
            filter: FilterState::default(),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.sections.iter().flat_map(Section::cards)
    }

    pub fn visible_cards(&self) -> impl Iterator<Item = &Card> {
        self.sections
            .iter()
            .filter(|s| s.visible)
            .flat_map(|s| s.rows.iter().filter(|r| r.visible))
            .flat_map(|r| r.cards.iter().filter(|c| c.visible))
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.cards().find(|c| c.selected)
    }

    pub fn card(&self, at: CardRef) -> Option<&Card> {
        self.sections
            .get(at.section)?
            .rows
            .get(at.row)?
            .cards
            .get(at.card)
    }

    pub fn find_voice(&self, voice_id: &str) -> Option<CardRef> {
        for (s, section) in self.sections.iter().enumerate() {
            for (r, row) in section.rows.iter().enumerate() {
                if let Some(c) = row.cards.iter().position(|card| card.voice_id() == voice_id) {
                    return Some(CardRef {
                        section: s,
                        row: r,
                        card: c,
                    });
                }
            }
        }
        None
    }

    /// Marks the card at `at` as the only selected card and returns its voice id.
    pub fn click(&mut self, at: CardRef) -> Result<String, AppError> {
        let voice_id = self
            .card(at)
            .map(|c| c.voice_id().to_string())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "No card at section {}, row {}, position {}",
                    at.section, at.row, at.card
                ))
            })?;

        for (s, section) in self.sections.iter_mut().enumerate() {
            for (r, row) in section.rows.iter_mut().enumerate() {
                for (c, card) in row.cards.iter_mut().enumerate() {
                    card.selected = at.section == s && at.row == r && at.card == c;
                }
            }
        }

        tracing::debug!("Selected voice {}", voice_id);
        Ok(voice_id)
    }

    pub fn select_voice(&mut self, voice_id: &str) -> Result<CardRef, AppError> {
        let at = self
            .find_voice(voice_id)
            .ok_or_else(|| AppError::VoiceNotFound(voice_id.to_string()))?;
        self.click(at)?;
        Ok(at)
    }
}

/// Clears `target` and rebuilds it from `groups`. The multilingual group comes
/// first, then one section per base language in code order. The first card
/// whose voice is `selected` starts out selected. The board's current filter
/// is re-applied to the new cards.
pub fn render(groups: &VoiceGroups, target: &mut VoiceBoard, selected: &str) {
    let batch = target.options.batch_size.max(1);
    let variant = target.options.variant;

    let mut sections = Vec::new();

    if let Some(voices) = groups.multilingual().filter(|v| !v.is_empty()) {
        sections.push(build_section(
            GroupKey::Multilingual,
            "Multilingual".to_string(),
            voices,
            batch,
            variant,
        ));
    }

    let mut by_language: BTreeMap<String, Vec<Arc<Voice>>> = BTreeMap::new();
    for (locale, voices) in groups.locales() {
        by_language
            .entry(base_code(locale).to_lowercase())
            .or_default()
            .extend(voices.iter().cloned());
    }

    for (code, voices) in by_language {
        if voices.is_empty() {
            continue;
        }
        let label = language_name(&code);
        sections.push(build_section(
            GroupKey::Language(code),
            label,
            &voices,
            batch,
            variant,
        ));
    }

    if let Some(card) = sections
        .iter_mut()
        .flat_map(|s| s.rows.iter_mut())
        .flat_map(|r| r.cards.iter_mut())
        .find(|c| c.voice.name == selected)
    {
        card.selected = true;
    }

    target.sections = sections;
    target.apply_filter();

    tracing::debug!(
        "Rendered {} sections with {} cards",
        target.sections.len(),
        target.cards().count()
    );
}

fn build_section(
    key: GroupKey,
    language_name: String,
    voices: &[Arc<Voice>],
    batch: usize,
    variant: LayoutVariant,
) -> Section {
    let rows = voices
        .chunks(batch)
        .map(|chunk| Row {
            group: key.clone(),
            visible: true,
            cards: chunk.iter().map(|v| Card::new(v, variant)).collect(),
        })
        .collect();

    Section {
        key,
        language_name,
        count: voices.len(),
        visible: true,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VoiceGroups {
        let mut en = String::new();
        for i in 0..7 {
            if i > 0 {
                en.push(',');
            }
            en.push_str(&format!(
                r#"{{"name": "en-US-V{i}Neural", "display_name": "Microsoft V{i} Online (Natural)",
                    "language": "en-US", "gender": "Male"}}"#
            ));
        }
        serde_json::from_str(&format!(
            r#"{{
                "en-US": [{en}],
                "en-GB": [{{"name": "en-GB-SoniaNeural", "display_name": "Microsoft Sonia Online (Natural)",
                            "language": "en-GB", "gender": "Female", "personalities": "Friendly, Positive, Calm"}}],
                "de-DE": [{{"name": "de-DE-KatjaNeural", "display_name": "Microsoft Katja Online (Natural)",
                            "language": "de-DE", "gender": "Female"}}],
                "multilingual": [{{"name": "en-US-AvaMultilingualNeural", "display_name": "Microsoft AvaMultilingual Online (Natural)",
                                   "language": "en-US", "gender": "Female"}}]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_single_voice_example() {
        let groups: VoiceGroups = serde_json::from_str(
            r#"{"en-US": [{"name": "en-US-AriaNeural", "display_name": "Microsoft Aria Online (Natural)",
                           "language": "en-US", "gender": "Female"}]}"#,
        )
        .unwrap();
        let mut board = VoiceBoard::default();
        render(&groups, &mut board, "");

        assert_eq!(board.sections().len(), 1);
        assert_eq!(board.sections()[0].header(), "English (1)");
        let card = board.cards().next().unwrap();
        assert_eq!(card.display_name, "Aria");
        assert_eq!(card.tags, vec!["Female"]);
    }

    #[test]
    fn test_sections_and_rows() {
        let mut board = VoiceBoard::default();
        render(&catalog(), &mut board, "");

        let headers: Vec<String> = board.sections().iter().map(Section::header).collect();
        assert_eq!(headers, vec!["Multilingual (1)", "German (1)", "English (8)"]);

        let english = &board.sections()[2];
        assert_eq!(english.key, GroupKey::Language("en".into()));
        let row_sizes: Vec<usize> = english.rows.iter().map(|r| r.cards.len()).collect();
        assert_eq!(row_sizes, vec![6, 2]);
        assert!(english.rows.iter().all(|r| r.group == english.key));
    }

    #[test]
    fn test_every_card_comes_from_catalog() {
        let groups = catalog();
        let mut board = VoiceBoard::default();
        render(&groups, &mut board, "");

        assert_eq!(board.cards().count(), groups.voice_count());
        assert!(board.cards().all(|c| groups.contains_voice(c.voice_id())));
    }

    #[test]
    fn test_render_replaces_previous_cards() {
        let mut board = VoiceBoard::default();
        render(&catalog(), &mut board, "");
        render(&VoiceGroups::default(), &mut board, "");
        assert!(board.is_empty());
    }

    #[test]
    fn test_initial_selection() {
        let mut board = VoiceBoard::default();
        render(&catalog(), &mut board, "de-DE-KatjaNeural");
        let selected: Vec<&Card> = board.cards().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].voice_id(), "de-DE-KatjaNeural");
    }

    #[test]
    fn test_click_is_mutually_exclusive() {
        let mut board = VoiceBoard::default();
        render(&catalog(), &mut board, "de-DE-KatjaNeural");

        let clicks = [
            CardRef { section: 2, row: 1, card: 1 },
            CardRef { section: 0, row: 0, card: 0 },
            CardRef { section: 2, row: 0, card: 3 },
        ];
        for at in clicks {
            let id = board.click(at).unwrap();
            assert_eq!(board.cards().filter(|c| c.selected).count(), 1);
            assert_eq!(board.selected_card().unwrap().voice_id(), id);
        }
        assert_eq!(board.selected_card().unwrap().voice_id(), "en-US-V2Neural");
    }

    #[test]
    fn test_click_out_of_range() {
        let mut board = VoiceBoard::default();
        render(&catalog(), &mut board, "");
        let err = board.click(CardRef { section: 9, row: 0, card: 0 }).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_select_voice_by_id() {
        let mut board = VoiceBoard::default();
        render(&catalog(), &mut board, "");
        let at = board.select_voice("en-GB-SoniaNeural").unwrap();
        assert_eq!(board.card(at).unwrap().display_name, "Sonia");
        assert!(matches!(
            board.select_voice("xx-XX-Nobody"),
            Err(AppError::VoiceNotFound(_))
        ));
    }

    #[test]
    fn test_grid_limits_tags() {
        let mut board = VoiceBoard::default();
        render(&catalog(), &mut board, "");
        let at = board.find_voice("en-GB-SoniaNeural").unwrap();
        assert_eq!(board.card(at).unwrap().tags, vec!["Friendly", "Positive"]);

        let mut featured = VoiceBoard::new(RenderOptions {
            variant: LayoutVariant::Featured,
            ..RenderOptions::default()
        });
        render(&catalog(), &mut featured, "");
        let at = featured.find_voice("en-GB-SoniaNeural").unwrap();
        assert_eq!(featured.card(at).unwrap().tags.len(), 3);
    }
}
