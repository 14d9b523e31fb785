use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use validator::Validate;

use crate::brain::language::Locale;

/// Maximum guest message length, in characters, after trimming.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Contact set for a property. Every field is host-authored and optional;
/// rendering must tolerate any of them being absent.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Contacts {
    /// Primary host contact (phone or messaging handle).
    pub host: Option<String>,
    /// Maintenance contact, used for non-emergency breakage.
    pub maintenance: Option<String>,
    /// Emergency contact. Guests are always also directed to local emergency services.
    pub emergency: Option<String>,
    /// Property manager, if distinct from the host.
    pub manager: Option<String>,
}

/// Check-in/check-out schedule for a property.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Schedule {
    /// Check-in time, e.g. "15:00" or "from 3pm".
    pub check_in: Option<String>,
    /// Check-out time.
    pub check_out: Option<String>,
    /// Late-checkout policy text, if the host offers one.
    pub late_checkout: Option<String>,
}

/// A host-recommended place near the property.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Recommendation {
    pub name: String,
    /// Free-form category, e.g. "restaurant", "beach".
    pub category: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Usage guide for an appliance in the property.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApplianceGuide {
    pub name: String,
    /// Appliance kind, e.g. "washing machine", "thermostat".
    pub kind: Option<String>,
    pub instructions: Option<String>,
    pub troubleshooting: Option<String>,
}

/// Free-form host note, e.g. "Trash collection" / "Bins go out Tuesday night".
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HouseNote {
    pub title: String,
    pub content: String,
}

/// Host-authored FAQ entry stored inside the profile itself
/// (distinct from the derived [`FaqEntry`] rows the analytics engine maintains).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProfileFaq {
    pub question: String,
    pub answer: String,
}

/// Host-authored structured description of one property.
///
/// Owned exclusively by one host account; created on first save and mutated in
/// place afterwards. The core must tolerate partially-filled profiles: every
/// accessor path renders an explicit "not specified" placeholder instead of
/// assuming data exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PropertyProfile {
    /// The unique identifier for the property.
    pub id: String,
    /// The host account that owns this profile.
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Display name of the property. Always present after creation.
    pub name: String,
    /// Street address, as the host wrote it.
    #[serde(default)]
    pub address: Option<String>,
    /// Property type, e.g. "apartment", "cabin".
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub contacts: Contacts,
    #[serde(default)]
    pub schedule: Schedule,
    /// Amenities grouped by category; item order is host-chosen and preserved.
    #[serde(default)]
    pub amenities: BTreeMap<String, Vec<String>>,
    /// House rules grouped by category.
    #[serde(default)]
    pub rules: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// How to get to and around the area.
    #[serde(default)]
    pub transportation: Option<String>,
    #[serde(default)]
    pub appliances: Vec<ApplianceGuide>,
    #[serde(default)]
    pub instructions: Vec<HouseNote>,
    #[serde(default)]
    pub faqs: Vec<ProfileFaq>,
}

impl PropertyProfile {
    /// Built-in profile used when no property is configured. Deliberately
    /// sparse so every answer funnels the guest toward contacting the host.
    pub fn default_profile() -> Self {
        Self {
            id: "default".to_string(),
            owner_id: None,
            name: "this property".to_string(),
            address: None,
            property_type: None,
            contacts: Contacts::default(),
            schedule: Schedule::default(),
            amenities: BTreeMap::new(),
            rules: BTreeMap::new(),
            recommendations: Vec::new(),
            transportation: None,
            appliances: Vec::new(),
            instructions: Vec::new(),
            faqs: Vec::new(),
        }
    }

    /// Wifi details, if the host listed any. The fallback responder reads this.
    pub fn wifi_items(&self) -> Option<&Vec<String>> {
        self.amenities
            .iter()
            .find(|(category, _)| {
                let c = category.to_lowercase();
                c.contains("wifi") || c.contains("wi-fi") || c.contains("internet")
            })
            .map(|(_, items)| items)
    }
}

/// One inbound guest message. Ephemeral: lives for the duration of a single
/// request and is never persisted by the core.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct ChatRequest {
    /// The guest's message text.
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    /// The property the guest is chatting about. Absent means the default profile.
    #[serde(default)]
    pub property_id: Option<String>,
    /// Caller-supplied locale hint. Ignored unless it parses into the supported set.
    #[serde(default)]
    pub locale: Option<String>,
    /// Full system prompt supplied by an upstream administrative tool.
    /// Used verbatim when present; the synthesizer does not run.
    #[serde(default)]
    pub system_prompt_override: Option<String>,
}

/// Token accounting reported by the model provider.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A completed model call.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
}

/// Terminal outcome of one conversation turn. Produced exactly once per request.
#[derive(Debug, Clone)]
pub enum ModelOutcome {
    /// The provider answered with a well-formed completion.
    Answered { text: String, usage: Usage },
    /// The request was answered locally without contacting the provider.
    Degraded { text: String, reason: String },
    /// The provider was dispatched to and failed.
    Failed { kind: &'static str },
}

impl ModelOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelOutcome::Answered { .. } => "answered",
            ModelOutcome::Degraded { .. } => "degraded",
            ModelOutcome::Failed { kind } => kind,
        }
    }
}

/// The caller-visible reply for one guest message.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatReply {
    /// False only for post-dispatch provider failures.
    pub success: bool,
    /// Guest-facing response text. Never empty, never a raw provider error.
    pub response: String,
    /// The locale the request resolved to.
    pub locale: Locale,
    /// Machine-readable outcome kind: "answered", "degraded", or a failure kind.
    pub outcome: String,
    /// True when a caller-supplied system prompt override was used.
    pub using_custom_config: bool,
    /// Wall-clock request duration.
    pub timing_ms: u64,
}

/// The guest event a free-text message announces, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestEvent {
    Arrival,
    Departure,
}

impl GuestEvent {
    pub fn label(&self) -> &'static str {
        match self {
            GuestEvent::Arrival => "arrival",
            GuestEvent::Departure => "departure",
        }
    }
}

/// A detected arrival/departure announcement, handed to the notification boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub property_id: String,
    pub kind: GuestEvent,
    /// The guest message that triggered the event, verbatim.
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// One recorded question/answer pair. Append-only; `helpful` is the only
/// column ever mutated after insertion.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct QuestionRecord {
    pub id: i64,
    pub property_id: String,
    pub question: String,
    pub response: String,
    /// Locale code the conversation resolved to, e.g. "en".
    pub locale: String,
    #[serde(default)]
    pub category: Option<String>,
    /// None until a feedback call arrives.
    #[serde(default)]
    pub helpful: Option<bool>,
    /// Unix timestamp of when the record was created.
    pub created_at: i64,
}

/// A derived FAQ entry, recomputed by the analytics engine and upserted
/// keyed by (property_id, question). Never hand-authored.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct FaqEntry {
    pub property_id: String,
    pub question: String,
    pub answer: String,
    /// How many times this exact question was recorded.
    pub frequency: i64,
    /// How many of those records received helpful=true feedback.
    pub helpful_count: i64,
    pub locale: String,
    /// Unix timestamp of the last regeneration that touched this row.
    pub updated_at: i64,
}

/// Aggregate statistics for one recurring question, ranked for reuse as
/// soft prompt guidance.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PatternStat {
    pub question: String,
    pub answer: String,
    pub frequency: i64,
    pub helpful_count: i64,
    /// helpful_count / rated records; 0.0 when nothing was rated yet.
    pub helpful_rate: f64,
}
