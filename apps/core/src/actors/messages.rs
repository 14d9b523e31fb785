use tokio::sync::oneshot;

use crate::models::{ChatReply, ChatRequest, Completion};

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the model provider actor.
#[derive(Debug)]
pub enum ProviderMessage {
    /// A request for one chat completion.
    Complete {
        system_prompt: String,
        user_message: String,
        /// A channel to send the completion result back. Dropping the
        /// receiving end cancels interest; the orphaned send is discarded.
        responder: oneshot::Sender<Result<Completion, AppError>>,
    },
}

/// Messages that can be sent to the concierge orchestrator actor.
#[derive(Debug)]
pub enum ConciergeMessage {
    /// A guest message to run through the full conversation cycle.
    GuestMessage {
        request: ChatRequest,
        /// A channel to send the terminal reply back.
        responder: oneshot::Sender<Result<ChatReply, AppError>>,
    },
}
