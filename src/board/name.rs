use lazy_static::lazy_static;
use regex::Regex;

use crate::catalog::Voice;

/// Vendor prefixes the service puts in front of descriptive names.
const VENDOR_PREFIXES: &[&str] = &["Microsoft "];

lazy_static! {
    static ref PARENTHETICAL: Regex = Regex::new(r"\s*\([^)]*\)").unwrap();
}

/// Name shown on a card: the explicit short name when the service sends one,
/// otherwise a cleaned-up version of the descriptive name.
pub fn display_name(voice: &Voice) -> String {
    match voice.short_name.as_deref().map(str::trim) {
        Some(short) if !short.is_empty() => short.to_string(),
        _ => simplify_voice_name(&voice.display_name),
    }
}

/// "Microsoft David Online (Natural) - English (United States)" -> "David".
/// Names containing "Multilingual" become "<base> – Multilingual".
pub fn simplify_voice_name(friendly: &str) -> String {
    let mut name = friendly.to_string();

    if let Some(vendor) = VENDOR_PREFIXES
        .iter()
        .find(|vendor| friendly.contains(vendor.trim_end()))
    {
        name = friendly.replacen(vendor, "", 1);
        name = name.split(" - ").next().unwrap_or_default().to_string();
        name = name.replacen(" Online", "", 1);
        name = PARENTHETICAL.replace_all(&name, "").to_string();
    }

    if name.contains("Multilingual") {
        let base = name.replace("Multilingual", "");
        name = format!("{} – Multilingual", base.trim());
    }

    name.trim().to_string()
}
