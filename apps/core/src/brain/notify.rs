//! Arrival/departure announcement detection using regex patterns.
//!
//! Precision-first: a positive classification triggers a host-facing
//! notification, so a question about check-in must never classify as an
//! announcement. Missed announcements are acceptable; false positives are not.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::GuestEvent;

// Compile patterns once at startup.
static ARRIVAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "we just checked in", "I checkt in", "checked-in"
        Regex::new(r"(?i)\b(just\s+)?(checked|cheked|checkt)[\s-]?in(to)?\b")
            .expect("Invalid regex: checked-in variants"),
        // sentence opener: "checked in, all good"
        Regex::new(r"(?i)^\s*check(ed)?[\s-]?in\b").expect("Invalid regex: check-in opener"),
        // "we have arrived", "I just arrived"
        Regex::new(r"(?i)\b(we've|we have|we|i've|i have|i)\s+(just\s+|finally\s+)?arrived\b")
            .expect("Invalid regex: arrived phrasing"),
        // "we're here", "I am finally here"
        Regex::new(r"(?i)\b(we're|we are|i'm|i am)\s+(finally\s+)?here\b")
            .expect("Invalid regex: here phrasing"),
        // "got in", "got here"
        Regex::new(r"(?i)\b(just\s+)?got\s+(in|here)\b")
            .expect("Invalid regex: got-in phrasing"),
        // Spanish
        Regex::new(r"(?i)\b(ya\s+)?(llegamos|llegué|llegue|hemos\s+llegado|acabamos\s+de\s+llegar)\b")
            .expect("Invalid regex: Spanish arrival"),
        // French
        Regex::new(r"(?i)\b(nous\s+sommes\s+arriv[ée]s?|je\s+suis\s+arriv[ée]e?)\b")
            .expect("Invalid regex: French arrival"),
        // German
        Regex::new(r"(?i)\b(sind|bin)\s+(gerade\s+)?angekommen\b")
            .expect("Invalid regex: German arrival"),
        // Portuguese
        Regex::new(r"(?i)\b(chegamos|cheguei|acabamos\s+de\s+chegar)\b")
            .expect("Invalid regex: Portuguese arrival"),
    ]
});

static DEPARTURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "just checked out", "checked-out"
        Regex::new(r"(?i)\b(just\s+)?(checked|cheked|checkt)[\s-]?out\b")
            .expect("Invalid regex: checked-out variants"),
        // sentence opener: "checked out, thanks"
        Regex::new(r"(?i)^\s*check(ed)?[\s-]?out\b").expect("Invalid regex: check-out opener"),
        // "we're leaving", "I am heading out"
        Regex::new(r"(?i)\b(we're|we are|i'm|i am)\s+(leaving|heading\s+out|on\s+(our|my)\s+way\s+out)\b")
            .expect("Invalid regex: leaving phrasing"),
        // "left the apartment", "leaving the keys"
        Regex::new(r"(?i)\b(left|leaving)\s+the\s+(apartment|house|flat|property|keys?)\b")
            .expect("Invalid regex: left-the phrasing"),
        // Spanish
        Regex::new(r"(?i)\b(ya\s+)?(nos\s+vamos|nos\s+fuimos|hemos\s+salido)\b")
            .expect("Invalid regex: Spanish departure"),
        // French
        Regex::new(r"(?i)\b(nous\s+partons|nous\s+sommes\s+partis?|je\s+pars)\b")
            .expect("Invalid regex: French departure"),
        // German
        Regex::new(r"(?i)\b(wir\s+fahren\s+los|sind\s+abgereist)\b")
            .expect("Invalid regex: German departure"),
        // Portuguese
        Regex::new(r"(?i)\b(estamos\s+saindo|já\s+sa[íi]mos)\b")
            .expect("Invalid regex: Portuguese departure"),
    ]
});

/// Interrogative markers. Their presence means the guest is asking about
/// check-in/out, not announcing it, and suppresses both families.
const DISAMBIGUATORS: &[&str] = &["what", "when", "how", "time"];

/// Classifier for implicit arrival/departure announcements in guest messages.
pub struct NotificationIntentDetector;

impl NotificationIntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classifies a guest message. Arrival is evaluated before departure and
    /// the first matching family wins, so a message never yields both.
    pub fn classify(&self, message: &str) -> Option<GuestEvent> {
        let message = message.trim();
        if message.is_empty() || self.is_question(message) {
            return None;
        }

        if ARRIVAL_PATTERNS.iter().any(|p| p.is_match(message)) {
            return Some(GuestEvent::Arrival);
        }
        if DEPARTURE_PATTERNS.iter().any(|p| p.is_match(message)) {
            return Some(GuestEvent::Departure);
        }
        None
    }

    fn is_question(&self, message: &str) -> bool {
        if message.contains('?') {
            return true;
        }
        let message_lower = message.to_lowercase();
        DISAMBIGUATORS.iter().any(|word| {
            message_lower
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
                .any(|w| w == *word)
        })
    }
}

impl Default for NotificationIntentDetector {
    fn default() -> Self {
        Self::new()
    }
}
