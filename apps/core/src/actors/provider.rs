use crate::actors::messages::{AppError, ProviderMessage};
use crate::actors::traits::ModelProvider;
use crate::config::ProviderSettings;
use crate::models::{Completion, Usage};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{error, info};

/// A handle to the model provider actor.
///
/// This struct provides a public, cloneable interface for sending completion
/// requests to the running provider actor. It abstracts away the
/// `mpsc::Sender`.
#[derive(Clone)]
pub struct OpenAiProviderHandle {
    sender: mpsc::Sender<ProviderMessage>,
    request_timeout: Duration,
}

impl OpenAiProviderHandle {
    /// Creates a new provider actor and returns a handle to it.
    ///
    /// This will spawn the `ProviderRunner` in a new Tokio task.
    pub fn new(settings: ProviderSettings) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        // The handle waits slightly longer than the runner's own HTTP
        // deadline so a slow provider is classified as ProviderTimeout by
        // the runner, not swallowed by the mailbox race.
        let request_timeout = settings.timeout + Duration::from_secs(5);
        let actor = ProviderRunner::new(receiver, settings);
        tokio::spawn(async move { actor.run().await });
        Self {
            sender,
            request_timeout,
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAiProviderHandle {
    async fn complete(
        &self,
        system_prompt: String,
        user_message: String,
    ) -> Result<Completion, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = ProviderMessage::Complete {
            system_prompt,
            user_message,
            responder: send,
        };

        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Internal(format!("Provider actor unavailable: {}", e)))?;
        // A fired timeout drops `recv`; the runner's eventual send then
        // fails silently and the late result is discarded, never double-emitted.
        timeout(self.request_timeout, recv)
            .await?
            .map_err(|e| AppError::Internal(format!("Provider actor dropped request: {}", e)))?
    }
}

// --- Actor Runner (Internal Logic) ---
struct ProviderRunner {
    receiver: mpsc::Receiver<ProviderMessage>,
    client: Client,
    settings: ProviderSettings,
}

impl ProviderRunner {
    fn new(receiver: mpsc::Receiver<ProviderMessage>, settings: ProviderSettings) -> Self {
        Self {
            receiver,
            client: Client::new(),
            settings,
        }
    }

    async fn run(mut self) {
        info!("Provider actor started (model: {})", self.settings.model);

        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }

        info!("Provider actor stopped");
    }

    async fn handle_message(&self, msg: ProviderMessage) {
        match msg {
            ProviderMessage::Complete {
                system_prompt,
                user_message,
                responder,
            } => {
                let result = self.chat_completion(system_prompt, user_message).await;
                let _ = responder.send(result);
            }
        }
    }

    fn build_request(&self, payload: &serde_json::Value) -> reqwest::RequestBuilder {
        let mut headers = HeaderMap::new();
        if let Ok(auth_value) = format!("Bearer {}", self.settings.api_key).parse() {
            headers.insert(AUTHORIZATION, auth_value);
        }

        self.client
            .post(format!("{}/chat/completions", self.settings.base_url))
            .headers(headers)
            .json(payload)
    }

    async fn chat_completion(
        &self,
        system_prompt: String,
        user_message: String,
    ) -> Result<Completion, AppError> {
        let payload = serde_json::json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ]
        });

        let request_future = self.build_request(&payload).send();

        let res = timeout(self.settings.timeout, request_future).await??;

        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(classify_provider_error(status, &body));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(e.to_string()))?;

        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AppError::MalformedResponse(
                    "completion body missing choices[0].message.content".to_string(),
                )
            })?
            .to_string();

        if text.trim().is_empty() {
            return Err(AppError::MalformedResponse(
                "completion content is empty".to_string(),
            ));
        }

        let usage = Usage {
            prompt_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(Completion { text, usage })
    }
}

/// Maps a non-success provider status to the failure taxonomy. Each kind has
/// a distinct caller-visible meaning: quota/rate-limit clear on their own,
/// auth failures need operator action.
fn classify_provider_error(status: reqwest::StatusCode, body: &str) -> AppError {
    match status.as_u16() {
        401 | 403 => AppError::AuthFailed(format!("status {}", status)),
        429 => {
            if body.contains("insufficient_quota") {
                AppError::QuotaExceeded(format!("status {}: {}", status, truncate(body, 200)))
            } else {
                AppError::RateLimited(format!("status {}: {}", status, truncate(body, 200)))
            }
        }
        _ => {
            error!("Provider request failed with status {}: {}", status, truncate(body, 200));
            AppError::ProviderUnavailable(format!("status {}", status))
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
