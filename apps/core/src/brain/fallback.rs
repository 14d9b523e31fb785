//! Locally-computed guest answers for when the model provider is unavailable.
//!
//! An ordered keyword→topic table matched against the lowercased message;
//! the first matching topic wins and extracts its answer directly from the
//! profile. Nothing here touches the network: this is the availability floor.

use crate::brain::language::Locale;
use crate::models::PropertyProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Wifi,
    Schedule,
    Contact,
}

/// Ordered table: the first topic with any keyword contained in the message wins.
const TOPIC_TABLE: &[(Topic, &[&str])] = &[
    (
        Topic::Wifi,
        &[
            "wifi", "wi-fi", "internet", "wlan", "password", "contraseña",
            "mot de passe", "senha", "passwort",
        ],
    ),
    (
        Topic::Schedule,
        &[
            "check-in", "check in", "checkin", "check-out", "check out", "checkout",
            "arrival", "departure", "llegada", "salida", "arrivée", "départ",
            "ankunft", "abreise", "chegada", "saída",
        ],
    ),
    (
        Topic::Contact,
        &[
            "contact", "phone", "host", "teléfono", "telefono", "téléphone",
            "telefon", "anfitrión", "hôte", "gastgeber", "anfitrião", "número",
            "numéro",
        ],
    ),
];

/// Per-locale canned phrasing for fallback answers.
struct FallbackPhrases {
    wifi_intro: &'static str,
    schedule_check_in: &'static str,
    schedule_check_out: &'static str,
    schedule_late: &'static str,
    contact_intro: &'static str,
    unavailable: &'static str,
    contact_host: &'static str,
    default_answer: &'static str,
    not_specified: &'static str,
    apology: &'static str,
}

const PHRASES_EN: FallbackPhrases = FallbackPhrases {
    wifi_intro: "Here are the wifi details",
    schedule_check_in: "Check-in",
    schedule_check_out: "Check-out",
    schedule_late: "Late checkout",
    contact_intro: "You can reach",
    unavailable: "I don't have that information on file.",
    contact_host: "Please contact the host directly for help.",
    default_answer: "I can help with questions about wifi, check-in and check-out times, and how to contact the host.",
    not_specified: "not specified",
    apology: "Sorry, I'm having trouble answering right now. Please try again in a moment, or contact the host directly.",
};

const PHRASES_ES: FallbackPhrases = FallbackPhrases {
    wifi_intro: "Estos son los datos del wifi",
    schedule_check_in: "Entrada",
    schedule_check_out: "Salida",
    schedule_late: "Salida tardía",
    contact_intro: "Puedes contactar a",
    unavailable: "No tengo esa información registrada.",
    contact_host: "Por favor contacta directamente al anfitrión.",
    default_answer: "Puedo ayudarte con el wifi, los horarios de entrada y salida, y cómo contactar al anfitrión.",
    not_specified: "no especificado",
    apology: "Lo siento, ahora mismo no puedo responder. Inténtalo de nuevo en un momento o contacta directamente al anfitrión.",
};

const PHRASES_FR: FallbackPhrases = FallbackPhrases {
    wifi_intro: "Voici les informations wifi",
    schedule_check_in: "Arrivée",
    schedule_check_out: "Départ",
    schedule_late: "Départ tardif",
    contact_intro: "Vous pouvez joindre",
    unavailable: "Je n'ai pas cette information.",
    contact_host: "Merci de contacter directement l'hôte.",
    default_answer: "Je peux vous aider pour le wifi, les horaires d'arrivée et de départ, et les coordonnées de l'hôte.",
    not_specified: "non renseigné",
    apology: "Désolé, je ne peux pas répondre pour le moment. Réessayez dans un instant ou contactez directement l'hôte.",
};

const PHRASES_DE: FallbackPhrases = FallbackPhrases {
    wifi_intro: "Hier sind die WLAN-Daten",
    schedule_check_in: "Check-in",
    schedule_check_out: "Check-out",
    schedule_late: "Später Check-out",
    contact_intro: "Sie erreichen",
    unavailable: "Dazu liegt mir leider nichts vor.",
    contact_host: "Bitte wenden Sie sich direkt an den Gastgeber.",
    default_answer: "Ich helfe gerne bei WLAN, Check-in- und Check-out-Zeiten und dem Kontakt zum Gastgeber.",
    not_specified: "nicht angegeben",
    apology: "Entschuldigung, ich kann gerade nicht antworten. Bitte versuchen Sie es gleich noch einmal oder kontaktieren Sie den Gastgeber direkt.",
};

const PHRASES_PT: FallbackPhrases = FallbackPhrases {
    wifi_intro: "Aqui estão os dados do wifi",
    schedule_check_in: "Check-in",
    schedule_check_out: "Check-out",
    schedule_late: "Saída tardia",
    contact_intro: "Você pode falar com",
    unavailable: "Não tenho essa informação registrada.",
    contact_host: "Por favor, contate o anfitrião diretamente.",
    default_answer: "Posso ajudar com o wifi, horários de check-in e check-out, e como contatar o anfitrião.",
    not_specified: "não especificado",
    apology: "Desculpe, não consigo responder agora. Tente novamente em instantes ou contate o anfitrião diretamente.",
};

fn phrases(locale: Locale) -> &'static FallbackPhrases {
    match locale {
        Locale::English => &PHRASES_EN,
        Locale::Spanish => &PHRASES_ES,
        Locale::French => &PHRASES_FR,
        Locale::German => &PHRASES_DE,
        Locale::Portuguese => &PHRASES_PT,
    }
}

/// Guest-safe apology shown for post-dispatch provider failures.
/// Never contains the raw provider error.
pub fn provider_apology(locale: Locale) -> &'static str {
    phrases(locale).apology
}

/// Keyword-table responder used when no model provider is configured.
pub struct FallbackResponder;

impl FallbackResponder {
    pub fn new() -> Self {
        Self
    }

    /// Answers a guest message from profile data alone. Total: never empty,
    /// never panics, works for any input and any partially-filled profile.
    pub fn respond(&self, message: &str, profile: &PropertyProfile, locale: Locale) -> String {
        let p = phrases(locale);
        let message_lower = message.to_lowercase();

        let topic = TOPIC_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| message_lower.contains(k)))
            .map(|(topic, _)| *topic);

        match topic {
            Some(Topic::Wifi) => self.wifi_answer(profile, p),
            Some(Topic::Schedule) => self.schedule_answer(profile, p),
            Some(Topic::Contact) => self.contact_answer(profile, p),
            None => self.default_answer(profile, p),
        }
    }

    fn wifi_answer(&self, profile: &PropertyProfile, p: &FallbackPhrases) -> String {
        match profile.wifi_items() {
            Some(items) if !items.is_empty() => {
                format!("{}: {}.", p.wifi_intro, items.join("; "))
            }
            _ => format!("{} {}", p.unavailable, p.contact_host),
        }
    }

    fn schedule_answer(&self, profile: &PropertyProfile, p: &FallbackPhrases) -> String {
        let s = &profile.schedule;
        if s.check_in.is_none() && s.check_out.is_none() {
            return format!("{} {}", p.unavailable, p.contact_host);
        }
        let mut parts = vec![
            format!(
                "{}: {}",
                p.schedule_check_in,
                s.check_in.as_deref().unwrap_or(p.not_specified)
            ),
            format!(
                "{}: {}",
                p.schedule_check_out,
                s.check_out.as_deref().unwrap_or(p.not_specified)
            ),
        ];
        if let Some(late) = &s.late_checkout {
            parts.push(format!("{}: {}", p.schedule_late, late));
        }
        format!("{}.", parts.join(". "))
    }

    fn contact_answer(&self, profile: &PropertyProfile, p: &FallbackPhrases) -> String {
        let c = &profile.contacts;
        let known: Vec<&str> = [
            c.host.as_deref(),
            c.manager.as_deref(),
            c.emergency.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if known.is_empty() {
            format!("{} {}", p.unavailable, p.contact_host)
        } else {
            format!("{}: {}.", p.contact_intro, known.join(", "))
        }
    }

    fn default_answer(&self, profile: &PropertyProfile, p: &FallbackPhrases) -> String {
        match profile.contacts.host.as_deref() {
            Some(host) => format!("{} {}: {}.", p.default_answer, p.contact_intro, host),
            None => p.default_answer.to_string(),
        }
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_wifi() -> PropertyProfile {
        let mut profile = PropertyProfile::default_profile();
        profile.amenities.insert(
            "Wifi".to_string(),
            vec!["Network: CasaAzul".to_string(), "Password: limon2024".to_string()],
        );
        profile.schedule.check_in = Some("15:00".to_string());
        profile.schedule.check_out = Some("11:00".to_string());
        profile.contacts.host = Some("+34 600 000 001".to_string());
        profile
    }

    #[test]
    fn test_wifi_topic_reads_profile() {
        let responder = FallbackResponder::new();
        let answer = responder.respond("what is the wifi password?", &profile_with_wifi(), Locale::English);
        assert!(answer.contains("limon2024"));
    }

    #[test]
    fn test_wifi_missing_directs_to_host() {
        let responder = FallbackResponder::new();
        let answer = responder.respond(
            "wifi?",
            &PropertyProfile::default_profile(),
            Locale::English,
        );
        assert!(answer.contains("contact the host"));
    }

    #[test]
    fn test_schedule_topic() {
        let responder = FallbackResponder::new();
        let answer = responder.respond("when is check out", &profile_with_wifi(), Locale::English);
        assert!(answer.contains("15:00"));
        assert!(answer.contains("11:00"));
    }

    #[test]
    fn test_topic_order_wifi_wins_over_contact() {
        // "wifi" appears before "contact" in the table; both keywords present.
        let responder = FallbackResponder::new();
        let answer =
            responder.respond("contact for the wifi?", &profile_with_wifi(), Locale::English);
        assert!(answer.contains("CasaAzul"));
    }

    #[test]
    fn test_default_topic_never_empty() {
        let responder = FallbackResponder::new();
        let inputs = ["", "    ", "is there a hair dryer?", "¿?", "%&$#"];
        for input in inputs {
            for locale in Locale::all() {
                let answer = responder.respond(
                    input,
                    &PropertyProfile::default_profile(),
                    *locale,
                );
                assert!(!answer.trim().is_empty(), "empty for {:?} / {:?}", input, locale);
            }
        }
    }

    #[test]
    fn test_localized_answers() {
        let responder = FallbackResponder::new();
        let answer = responder.respond("contraseña del wifi", &profile_with_wifi(), Locale::Spanish);
        assert!(answer.contains("wifi") || answer.contains("CasaAzul"));
        assert!(answer.contains("Estos son los datos del wifi"));
    }

    #[test]
    fn test_apology_is_localized_and_nonempty() {
        for locale in Locale::all() {
            assert!(!provider_apology(*locale).is_empty());
        }
        assert!(provider_apology(Locale::French).contains("Désolé"));
    }
}
