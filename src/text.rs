use std::time::Duration;

use crate::catalog::base_code;

pub const MAX_TEXT_CHARS: usize = 5000;

/// Text spoken by "Listen to Sample".
pub const SAMPLE_PROMPT: &str = "Hello, I am a text-to-speech voice. How do I sound to you?";

const WORDS_PER_SECOND: f64 = 3.0;

pub fn char_count_label(text: &str) -> String {
    format!("{}/{} characters", text.chars().count(), MAX_TEXT_CHARS)
}

/// Rough spoken length at three words per second.
pub fn estimate_duration(text: &str) -> Duration {
    let words = text.split_whitespace().count() as f64;
    Duration::from_secs((words / WORDS_PER_SECOND).round() as u64)
}

/// Demo paragraph in the language of `voice_id`, English when there is none.
pub fn sample_text(voice_id: &str) -> &'static str {
    match base_code(voice_id) {
        "es" => "¡Bienvenido a Speech Daddy! Este es un texto de muestra para demostrar nuestras capacidades de texto a voz. Nuestras voces suenan naturales y expresivas.",
        "fr" => "Bienvenue à Speech Daddy! Ceci est un exemple de texte pour démontrer nos capacités de synthèse vocale. Nos voix sonnent naturelles et expressives.",
        "de" => "Willkommen bei Speech Daddy! Dies ist ein Beispieltext, um unsere Text-to-Speech-Fähigkeiten zu demonstrieren. Unsere Stimmen klingen natürlich und ausdrucksstark.",
        "it" => "Benvenuto a Speech Daddy! Questo è un testo di esempio per dimostrare le nostre capacità di text-to-speech. Le nostre voci suonano naturali ed espressive.",
        "pt" => "Bem-vindo ao Speech Daddy! Este é um texto de exemplo para demonstrar nossas capacidades de texto para fala. Nossas vozes soam naturais e expressivas.",
        "en" => "Welcome to Speech Daddy! This is a sample text to demonstrate our text-to-speech capabilities. Our voices sound natural and expressive.",
        _ => "Hello, this is a text-to-speech sample from Speech Daddy. Our voices support multiple languages and sound natural.",
    }
}

/// `m:ss`, e.g. 75 s -> "1:15".
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
