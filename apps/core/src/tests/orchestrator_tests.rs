//! Orchestrator Integration Tests
//!
//! Full conversation cycle: real provider actor against a wiremock server,
//! real SQLite store, production wiring through `ConciergeHandle::new`.

use crate::actors::orchestrator::ConciergeHandle;
use crate::config::ProviderSettings;
use crate::database;
use crate::models::{ChatRequest, PropertyProfile};
use sqlx::sqlite::SqlitePool;
use std::time::Duration;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_settings(server_url: String) -> ProviderSettings {
    ProviderSettings {
        api_key: "sk-test".to_string(),
        base_url: server_url,
        model: "test-model".to_string(),
        timeout: Duration::from_secs(5),
    }
}

async fn seeded_pool() -> SqlitePool {
    let pool = database::init_db(Some(":memory:"))
        .await
        .expect("Failed to create test pool");

    let mut profile = PropertyProfile::default_profile();
    profile.id = "prop-1".to_string();
    profile.name = "Casa Azul".to_string();
    profile.contacts.host = Some("+34 600 000 001".to_string());
    profile.schedule.check_in = Some("15:00".to_string());
    profile.schedule.check_out = Some("11:00".to_string());
    profile
        .amenities
        .insert("Wifi".to_string(), vec!["Password: limon2024".to_string()]);
    database::save_profile(&pool, &profile).await.unwrap();

    pool
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        property_id: Some("prop-1".to_string()),
        locale: None,
        system_prompt_override: None,
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 18 }
    })
}

#[tokio::test]
async fn test_full_cycle_answered_and_recorded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("The wifi password is limon2024.")),
        )
        .mount(&mock_server)
        .await;

    let pool = seeded_pool().await;
    let concierge = ConciergeHandle::new(
        Some(pool.clone()),
        Some(provider_settings(mock_server.uri())),
    );

    let reply = concierge
        .handle_message(request("what is the wifi password?"))
        .await
        .unwrap();

    assert!(reply.success);
    assert_eq!(reply.outcome, "answered");
    assert_eq!(reply.response, "The wifi password is limon2024.");

    // The outcome is recorded fire-and-forget; give the spawned task a beat.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let groups = database::question_groups(&pool, "prop-1", 1).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].question, "what is the wifi password?");
}

#[tokio::test]
async fn test_unconfigured_provider_degrades_from_profile() {
    let pool = seeded_pool().await;
    let concierge = ConciergeHandle::new(Some(pool.clone()), None);

    let reply = concierge
        .handle_message(request("what is the wifi password?"))
        .await
        .unwrap();

    assert!(reply.success);
    assert_eq!(reply.outcome, "degraded");
    // The local answer is grounded in the stored profile.
    assert!(reply.response.contains("limon2024"));
}

#[tokio::test]
async fn test_provider_error_surfaces_as_failed_apology() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let pool = seeded_pool().await;
    let concierge = ConciergeHandle::new(
        Some(pool.clone()),
        Some(provider_settings(mock_server.uri())),
    );

    let reply = concierge
        .handle_message(request("what is the wifi password?"))
        .await
        .unwrap();

    assert!(!reply.success);
    assert_eq!(reply.outcome, "provider_unavailable");
    assert!(!reply.response.contains("boom"), "raw provider error leaked");
    assert!(!reply.response.is_empty());

    // Failed outcomes are not recorded as question/answer pairs.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let groups = database::question_groups(&pool, "prop-1", 1).await.unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_unknown_property_uses_default_profile() {
    let pool = seeded_pool().await;
    let concierge = ConciergeHandle::new(Some(pool), None);

    let mut req = request("wifi?");
    req.property_id = Some("unknown-prop".to_string());
    let reply = concierge.handle_message(req).await.unwrap();

    assert!(reply.success);
    assert_eq!(reply.outcome, "degraded");
    // The default profile has no wifi entry, so the guest is sent to the host.
    assert!(reply.response.to_lowercase().contains("host"));
}

#[tokio::test]
async fn test_spanish_message_gets_spanish_degraded_answer() {
    let pool = seeded_pool().await;
    let concierge = ConciergeHandle::new(Some(pool), None);

    let reply = concierge
        .handle_message(request("hola, necesito la contraseña del wifi"))
        .await
        .unwrap();

    assert_eq!(reply.locale.code(), "es");
    assert!(reply.response.contains("limon2024"));
}

#[tokio::test]
async fn test_timing_is_reported() {
    let pool = seeded_pool().await;
    let concierge = ConciergeHandle::new(Some(pool), None);

    let reply = concierge.handle_message(request("wifi?")).await.unwrap();
    // Degraded answers are local; generous bound to keep CI happy.
    assert!(reply.timing_ms < 5_000);
}
