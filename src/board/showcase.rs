use std::collections::HashSet;
use std::sync::Arc;

use super::{Card, LayoutVariant};
use crate::catalog::{Voice, VoiceGroups};

pub const FEATURED_LIMIT: usize = 12;
pub const PREVIEW_LIMIT: usize = 4;

/// One voice per locale group, in locale order.
pub fn featured_voices(groups: &VoiceGroups) -> Vec<Arc<Voice>> {
    groups
        .locales()
        .filter_map(|(_, voices)| voices.first().cloned())
        .take(FEATURED_LIMIT)
        .collect()
}

/// A few English voices for the hero strip, multilingual ones first.
pub fn preview_voices(groups: &VoiceGroups) -> Vec<Arc<Voice>> {
    let mut seen = HashSet::new();
    groups
        .all_voices()
        .filter(|v| v.language.starts_with("en"))
        .filter(|v| seen.insert(v.name.clone()))
        .take(PREVIEW_LIMIT)
        .cloned()
        .collect()
}

pub fn showcase_cards(voices: &[Arc<Voice>], variant: LayoutVariant) -> Vec<Card> {
    voices.iter().map(|v| Card::new(v, variant)).collect()
}
