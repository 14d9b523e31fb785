//! # Brain Module
//!
//! Fast, non-LLM analysis and rendering for GuestWise.
//! Everything here is pure and synchronous: it runs before (or instead of)
//! the model provider call.
//!
//! ## Components
//! - `language`: keyword-heuristic locale detection
//! - `prompt`: system-prompt synthesis from the property profile
//! - `fallback`: profile-grounded canned answers for provider outages
//! - `notify`: arrival/departure announcement detection

pub mod fallback;
pub mod language;
pub mod notify;
pub mod prompt;

pub use fallback::FallbackResponder;
pub use language::{LanguageDetector, Locale};
pub use notify::NotificationIntentDetector;
pub use prompt::PromptSynthesizer;
