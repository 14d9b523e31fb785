use crate::error::AppError;
use crate::models::Completion;
use async_trait::async_trait;

/// Defines the public interface of a language-model provider.
///
/// This trait abstracts the concrete backend, so an OpenAI-compatible HTTP
/// API, another vendor, or a test mock can be used interchangeably. The core
/// must be functionally correct for any compliant implementation, including
/// one that is entirely absent.
#[async_trait]
pub trait ModelProvider: Send + Sync + 'static {
    /// Produces one completion for a system prompt plus guest message.
    ///
    /// Errors carry the provider failure taxonomy (timeout, quota, rate
    /// limit, auth, malformed response) so callers can map them to
    /// caller-visible outcomes without inspecting provider internals.
    async fn complete(
        &self,
        system_prompt: String,
        user_message: String,
    ) -> Result<Completion, AppError>;
}
