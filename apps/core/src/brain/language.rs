//! Language detection using keyword heuristics.
//!
//! Maps free text onto the fixed locale set guests are served in.
//! Deliberately imprecise: a miss falls back to English, never to an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported guest locale. Serialized as its locale code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "pt")]
    Portuguese,
}

impl Locale {
    /// Returns the locale code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Spanish => "es",
            Locale::French => "fr",
            Locale::German => "de",
            Locale::Portuguese => "pt",
        }
    }

    /// Parses a locale code. Anything outside the supported set is rejected,
    /// letting the caller fall back to detection.
    pub fn parse(code: &str) -> Option<Locale> {
        match code.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Some(Locale::English),
            "es" | "es-es" | "es-mx" => Some(Locale::Spanish),
            "fr" | "fr-fr" => Some(Locale::French),
            "de" | "de-de" => Some(Locale::German),
            "pt" | "pt-pt" | "pt-br" => Some(Locale::Portuguese),
            _ => None,
        }
    }

    /// All supported locales.
    #[allow(dead_code)]
    pub fn all() -> &'static [Locale] {
        &[
            Locale::English,
            Locale::Spanish,
            Locale::French,
            Locale::German,
            Locale::Portuguese,
        ]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

const SPANISH_WORDS: &[&str] = &[
    "hola", "gracias", "dónde", "cómo", "cuándo", "está", "aquí", "necesito",
    "tengo", "habitación", "llegada", "salida", "piscina", "baño", "llave",
    "mañana", "buenos", "buenas", "también", "qué",
];

const FRENCH_WORDS: &[&str] = &[
    "bonjour", "bonsoir", "merci", "où", "comment", "quand", "j'ai", "clé",
    "chambre", "arrivée", "départ", "s'il", "oui", "c'est", "piscine",
    "salle", "est-ce", "pouvez-vous", "maison", "besoin",
];

const GERMAN_WORDS: &[&str] = &[
    "hallo", "danke", "wie", "wo", "wann", "ich", "haben", "zimmer",
    "schlüssel", "bitte", "nicht", "können", "wir", "und", "das",
    "wohnung", "ankunft", "abreise", "gibt",
];

const PORTUGUESE_WORDS: &[&str] = &[
    "olá", "obrigado", "obrigada", "onde", "você", "não", "quarto",
    "chave", "chegada", "saída", "tem", "fica", "banheiro", "amanhã",
    "bom", "boa",
];

/// Detection priority: locales with more distinctive keyword sets are checked
/// first; English is the fall-through default.
const PRIORITY: &[(Locale, &[&str])] = &[
    (Locale::Spanish, SPANISH_WORDS),
    (Locale::French, FRENCH_WORDS),
    (Locale::German, GERMAN_WORDS),
    (Locale::Portuguese, PORTUGUESE_WORDS),
];

/// Keyword-heuristic language detector over the fixed locale set.
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detects the locale of a guest message. Deterministic, total: any
    /// input, including the empty string, resolves to a supported locale.
    pub fn detect(&self, text: &str) -> Locale {
        let text_lower = text.to_lowercase();
        let words: Vec<&str> = text_lower
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-'))
            .filter(|word| !word.is_empty())
            .collect();

        if words.is_empty() {
            return Locale::English;
        }

        for (locale, keywords) in PRIORITY {
            if keywords.iter().any(|k| words.contains(k)) {
                return *locale;
            }
        }

        Locale::English
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}
