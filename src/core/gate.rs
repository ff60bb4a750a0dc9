//! Decides whether a string is prose worth sending to machine translation.
//!
//! Identifiers, numbers, URLs, storage paths and encoded media travel through responses next to
//! real text; translating them is wasted quota at best and corrupts the payload at worst.

use crate::domain::model::Direction;

const URL_SCHEMES: &[&str] = &["http://", "https://", "data:", "blob:", "file://"];

#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Ceiling in characters; longer text is never translated.
    pub max_text_length: usize,
    /// Text longer than this made only of base64 characters is treated as a payload.
    pub base64_min_length: usize,
    /// Storage path prefixes that mark opaque identifiers.
    pub opaque_prefixes: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_text_length: 500,
            base64_min_length: 64,
            opaque_prefixes: vec![
                "media/".to_string(),
                "/media/".to_string(),
                "uploads/".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranslationGate {
    config: GateConfig,
}

impl TranslationGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn should_translate(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() || is_numeric(trimmed) {
            return false;
        }

        let length = trimmed.chars().count();
        if length > self.config.max_text_length {
            return false;
        }
        if length > self.config.base64_min_length && is_base64_alphabet(trimmed) {
            return false;
        }

        let lower = trimmed.to_ascii_lowercase();
        if URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            return false;
        }
        if self
            .config
            .opaque_prefixes
            .iter()
            .any(|prefix| lower.starts_with(&prefix.to_ascii_lowercase()))
        {
            return false;
        }

        true
    }

    /// Direction-aware check. Pure ASCII text is already in the source language, so it never
    /// needs display-to-source translation.
    pub fn allows(&self, direction: Direction, text: &str) -> bool {
        if direction == Direction::ToSource && text.is_ascii() {
            return false;
        }
        self.should_translate(text)
    }
}

fn is_numeric(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

fn is_base64_alphabet(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=')
}

/// Tokens the phonetic fallback rewrites: at most three ASCII letters.
pub fn is_phonetic_candidate(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty() && token.chars().count() <= 3 && token.chars().all(|c| c.is_ascii_alphabetic())
}

/// Spells short Latin tokens with Tamil letter names ("sa" becomes "எஸ்ஏ").
///
/// This is an approximation for when translation is unavailable. It is not a transliteration
/// and it is not invertible (`b` and `p` both map to "பி"). Other tokens come back unchanged.
pub fn phonetic_fallback(token: &str) -> String {
    if !is_phonetic_candidate(token) {
        return token.to_string();
    }
    token
        .trim()
        .chars()
        .map(|c| letter_name(c.to_ascii_lowercase()))
        .collect()
}

fn letter_name(letter: char) -> &'static str {
    match letter {
        'a' => "ஏ",
        'b' => "பி",
        'c' => "சி",
        'd' => "டி",
        'e' => "இ",
        'f' => "எஃப்",
        'g' => "ஜி",
        'h' => "ஹெச்",
        'i' => "ஐ",
        'j' => "ஜே",
        'k' => "கே",
        'l' => "எல்",
        'm' => "எம்",
        'n' => "என்",
        'o' => "ஓ",
        'p' => "பி",
        'q' => "க்யூ",
        'r' => "ஆர்",
        's' => "எஸ்",
        't' => "டி",
        'u' => "யு",
        'v' => "வி",
        'w' => "டபிள்யூ",
        'x' => "எக்ஸ்",
        'y' => "ஒய்",
        'z' => "இசட்",
        _ => "",
    }
}
