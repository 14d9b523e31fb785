use crate::actors::messages::{AppError, ConciergeMessage};
use crate::actors::provider::OpenAiProviderHandle;
use crate::actors::traits::ModelProvider;
use crate::analytics::FeedbackEngine;
use crate::brain::fallback::{provider_apology, FallbackResponder};
use crate::brain::language::{LanguageDetector, Locale};
use crate::brain::notify::NotificationIntentDetector;
use crate::brain::prompt::PromptSynthesizer;
use crate::config::ProviderSettings;
use crate::database;
use crate::models::{
    ChatReply, ChatRequest, ModelOutcome, NotificationEvent, PropertyProfile, MAX_MESSAGE_CHARS,
};
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Upper bound for one full request cycle, comfortably above the provider
/// actor's own deadline so timeouts are classified there first.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// A handle to the concierge orchestrator actor.
///
/// This is the primary entry point for guest conversations. It coordinates
/// language detection, prompt synthesis, the provider call and the fallback
/// responder into one request/response cycle.
#[derive(Clone)]
pub struct ConciergeHandle {
    sender: mpsc::Sender<ConciergeMessage>,
}

impl ConciergeHandle {
    /// Creates the production orchestrator: an OpenAI-compatible provider
    /// actor when settings are present, pure degrade mode when they are not.
    pub fn new(db_pool: Option<SqlitePool>, provider: Option<ProviderSettings>) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let provider_actor = provider.map(|settings| Arc::new(OpenAiProviderHandle::new(settings)));
        let actor = ConciergeRunner::new(receiver, provider_actor, db_pool);
        tokio::spawn(async move { actor.run().await });
        Self { sender }
    }

    /// Runs one guest message through the full conversation cycle.
    ///
    /// Validation failures surface as `AppError::Validation`; every other
    /// outcome, including provider failures, resolves to a `ChatReply` with
    /// guest-safe text.
    #[instrument(skip(self, request))]
    pub async fn handle_message(&self, request: ChatRequest) -> Result<ChatReply, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = ConciergeMessage::GuestMessage {
            request,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Internal(format!("Orchestrator unavailable: {}", e)))?;
        timeout(REQUEST_TIMEOUT, recv)
            .await?
            .map_err(|e| AppError::Internal(format!("Orchestrator dropped request: {}", e)))?
    }
}

// --- Actor Runner ---
struct ConciergeRunner<P>
where
    P: ModelProvider,
{
    receiver: mpsc::Receiver<ConciergeMessage>,
    provider: Option<Arc<P>>,
    db_pool: Option<SqlitePool>,
    detector: LanguageDetector,
    synthesizer: PromptSynthesizer,
    fallback: FallbackResponder,
    notifier: NotificationIntentDetector,
    analytics: FeedbackEngine,
}

impl<P> ConciergeRunner<P>
where
    P: ModelProvider,
{
    fn new(
        receiver: mpsc::Receiver<ConciergeMessage>,
        provider: Option<Arc<P>>,
        db_pool: Option<SqlitePool>,
    ) -> Self {
        let analytics = FeedbackEngine::new(db_pool.clone());
        Self {
            receiver,
            provider,
            db_pool,
            detector: LanguageDetector::new(),
            synthesizer: PromptSynthesizer::new(),
            fallback: FallbackResponder::new(),
            notifier: NotificationIntentDetector::new(),
            analytics,
        }
    }

    async fn run(mut self) {
        info!("Concierge orchestrator started");
        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }
        info!("Concierge orchestrator stopped");
    }

    async fn handle_message(&self, msg: ConciergeMessage) {
        match msg {
            ConciergeMessage::GuestMessage { request, responder } => {
                let result = self.handle_guest_message(request).await;
                if let Err(e) = &result {
                    warn!("Guest message rejected: {:?}", e);
                }
                // A disconnected caller dropped its receiver; the result is
                // discarded rather than double-handled.
                let _ = responder.send(result);
            }
        }
    }

    #[instrument(skip(self, request))]
    async fn handle_guest_message(&self, request: ChatRequest) -> Result<ChatReply, AppError> {
        let started = Instant::now();

        // --- Validation ---
        let message = request.message.trim().to_string();
        if message.is_empty() {
            return Err(AppError::Validation("Message is empty".to_string()));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::Validation(format!(
                "Message exceeds {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let request_id = Uuid::new_v4();
        info!(request_id = %request_id, chars = message.chars().count(), "Guest message accepted");

        // --- Locale resolution ---
        let locale = request
            .locale
            .as_deref()
            .and_then(Locale::parse)
            .unwrap_or_else(|| self.detector.detect(&message));

        // --- Profile & prompt ---
        let profile = self.load_profile(request.property_id.as_deref()).await;
        let using_custom_config = request.system_prompt_override.is_some();
        let system_prompt = self.synthesizer.synthesize(
            &profile,
            locale,
            request.system_prompt_override.as_deref(),
        );

        // --- Dispatch or degrade ---
        let outcome = match &self.provider {
            None => {
                info!("No provider configured, answering from profile");
                ModelOutcome::Degraded {
                    text: self.fallback.respond(&message, &profile, locale),
                    reason: AppError::ProviderUnconfigured.kind().to_string(),
                }
            }
            Some(provider) => {
                match provider.complete(system_prompt, message.clone()).await {
                    Ok(completion) => {
                        info!(
                            prompt_tokens = completion.usage.prompt_tokens,
                            completion_tokens = completion.usage.completion_tokens,
                            "Provider answered"
                        );
                        ModelOutcome::Answered {
                            text: completion.text,
                            usage: completion.usage,
                        }
                    }
                    Err(e) => {
                        // A request that reached the provider and failed stays
                        // a failure: downgrading here would mask outages from
                        // operators.
                        error!(
                            request_id = %request_id,
                            kind = e.kind(),
                            retryable = e.is_retryable(),
                            "Provider call failed: {}",
                            e
                        );
                        ModelOutcome::Failed { kind: e.kind() }
                    }
                }
            }
        };

        self.emit_guest_event(&profile.id, &message);
        self.record_outcome(&profile.id, &message, &outcome, locale);

        let reply = match &outcome {
            ModelOutcome::Answered { text, .. } => ChatReply {
                success: true,
                response: text.clone(),
                locale,
                outcome: outcome.kind().to_string(),
                using_custom_config,
                timing_ms: started.elapsed().as_millis() as u64,
            },
            ModelOutcome::Degraded { text, .. } => ChatReply {
                success: true,
                response: text.clone(),
                locale,
                outcome: "degraded".to_string(),
                using_custom_config,
                timing_ms: started.elapsed().as_millis() as u64,
            },
            ModelOutcome::Failed { kind } => ChatReply {
                success: false,
                response: provider_apology(locale).to_string(),
                locale,
                outcome: kind.to_string(),
                using_custom_config,
                timing_ms: started.elapsed().as_millis() as u64,
            },
        };

        Ok(reply)
    }

    /// Loads the property profile. A missing row, absent pool or storage
    /// failure all resolve to the built-in default profile: chat never
    /// depends on the store being healthy.
    async fn load_profile(&self, property_id: Option<&str>) -> PropertyProfile {
        let (pool, id) = match (&self.db_pool, property_id) {
            (Some(pool), Some(id)) => (pool, id),
            _ => return PropertyProfile::default_profile(),
        };

        match database::get_profile(pool, id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                info!(property_id = id, "Unknown property, using default profile");
                PropertyProfile::default_profile()
            }
            Err(e) => {
                warn!("Profile lookup failed, using default profile: {}", e);
                PropertyProfile::default_profile()
            }
        }
    }

    /// Inspects the message for an arrival/departure announcement and emits
    /// the event for the host-notification boundary. Detection runs on every
    /// message independently of how the chat itself resolves.
    fn emit_guest_event(&self, property_id: &str, message: &str) {
        if let Some(kind) = self.notifier.classify(message) {
            let event = NotificationEvent {
                property_id: property_id.to_string(),
                kind,
                message: message.to_string(),
                timestamp: Utc::now(),
            };
            info!(
                target: "guestwise::notifications",
                property_id = %event.property_id,
                kind = event.kind.label(),
                timestamp = %event.timestamp,
                message = %event.message,
                "Guest event detected"
            );
        }
    }

    /// Hands answered/degraded outcomes to the analytics engine.
    /// Fire-and-forget: a recording failure never touches the reply.
    fn record_outcome(
        &self,
        property_id: &str,
        message: &str,
        outcome: &ModelOutcome,
        locale: Locale,
    ) {
        let response_text = match outcome {
            ModelOutcome::Answered { text, .. } => text.clone(),
            ModelOutcome::Degraded { text, .. } => text.clone(),
            ModelOutcome::Failed { .. } => return,
        };

        let analytics = self.analytics.clone();
        let property_id = property_id.to_string();
        let question = message.to_string();
        tokio::spawn(async move {
            analytics
                .record(&property_id, &question, &response_text, locale, None)
                .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Completion, Usage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // --- Mock provider ---

    struct MockProvider {
        response: Mutex<Result<Completion, AppError>>,
    }

    impl MockProvider {
        fn new(response: Result<Completion, AppError>) -> Self {
            Self {
                response: Mutex::new(response),
            }
        }

        fn answering(text: &str) -> Self {
            Self::new(Ok(Completion {
                text: text.to_string(),
                usage: Usage::default(),
            }))
        }
    }

    #[async_trait]
    impl ModelProvider for MockProvider {
        async fn complete(
            &self,
            _system_prompt: String,
            _user_message: String,
        ) -> Result<Completion, AppError> {
            self.response.lock().unwrap().clone()
        }
    }

    fn spawn_runner(
        provider: Option<Arc<MockProvider>>,
        db_pool: Option<SqlitePool>,
    ) -> ConciergeHandle {
        let (sender, receiver) = mpsc::channel(32);
        let runner = ConciergeRunner::new(receiver, provider, db_pool);
        tokio::spawn(async move { runner.run().await });
        ConciergeHandle { sender }
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            property_id: None,
            locale: None,
            system_prompt_override: None,
        }
    }

    #[tokio::test]
    async fn test_nominal_answered_flow() {
        let provider = Arc::new(MockProvider::answering("The pool opens at 9am."));
        let handle = spawn_runner(Some(provider), None);

        let reply = handle.handle_message(request("When does the pool open?")).await.unwrap();

        assert!(reply.success);
        assert_eq!(reply.response, "The pool opens at 9am.");
        assert_eq!(reply.outcome, "answered");
        assert!(!reply.using_custom_config);
    }

    #[tokio::test]
    async fn test_no_provider_degrades_without_network() {
        let handle = spawn_runner(None, None);

        let reply = handle.handle_message(request("what's the wifi password?")).await.unwrap();

        assert!(reply.success);
        assert_eq!(reply.outcome, "degraded");
        assert!(!reply.response.is_empty());
    }

    #[tokio::test]
    async fn test_post_dispatch_failure_is_not_fallback() {
        let provider = Arc::new(MockProvider::new(Err(AppError::RateLimited(
            "slow down".to_string(),
        ))));
        let handle = spawn_runner(Some(provider), None);

        let reply = handle.handle_message(request("what's the wifi password?")).await.unwrap();

        assert!(!reply.success);
        assert_eq!(reply.outcome, "rate_limited");
        // Apology, not the keyword-table wifi answer.
        assert!(!reply.response.contains("wifi details"));
        assert!(!reply.response.contains("slow down"), "raw provider error leaked");
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let handle = spawn_runner(None, None);
        let result = handle.handle_message(request("   ")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_oversized_message_rejected_before_dispatch() {
        // A provider that would panic the test if it were ever reached.
        struct PanicProvider;
        #[async_trait]
        impl ModelProvider for PanicProvider {
            async fn complete(&self, _s: String, _u: String) -> Result<Completion, AppError> {
                panic!("provider must not be dispatched for invalid input");
            }
        }

        let (sender, receiver) = mpsc::channel(32);
        let runner = ConciergeRunner::new(receiver, Some(Arc::new(PanicProvider)), None);
        tokio::spawn(async move { runner.run().await });
        let handle = ConciergeHandle { sender };

        let long_message = "a".repeat(MAX_MESSAGE_CHARS + 1);
        let result = handle.handle_message(request(&long_message)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_locale_hint_overrides_detection() {
        let provider = Arc::new(MockProvider::answering("ok"));
        let handle = spawn_runner(Some(provider), None);

        let mut req = request("hello there");
        req.locale = Some("fr".to_string());
        let reply = handle.handle_message(req).await.unwrap();
        assert_eq!(reply.locale, Locale::French);

        // Unsupported hints fall back to detection.
        let provider = Arc::new(MockProvider::answering("ok"));
        let handle = spawn_runner(Some(provider), None);
        let mut req = request("hello there");
        req.locale = Some("ja".to_string());
        let reply = handle.handle_message(req).await.unwrap();
        assert_eq!(reply.locale, Locale::English);
    }

    #[tokio::test]
    async fn test_custom_prompt_flag_reported() {
        let provider = Arc::new(MockProvider::answering("ok"));
        let handle = spawn_runner(Some(provider), None);

        let mut req = request("hello");
        req.system_prompt_override = Some("You are a pirate.".to_string());
        let reply = handle.handle_message(req).await.unwrap();
        assert!(reply.using_custom_config);
    }
}
