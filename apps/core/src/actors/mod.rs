//! Actor system: long-lived Tokio tasks addressed through cloneable handles.
//!
//! - `provider`: OpenAI-compatible completion calls with timeout racing
//! - `orchestrator`: the per-request conversation cycle

pub mod messages;
pub mod orchestrator;
pub mod provider;
pub mod traits;
