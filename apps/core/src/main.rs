// GuestWise V1 Backend Entry Point
// "The Brain" - Conversation & Intent Orchestration

mod actors;
mod analytics;
mod brain;
mod config;
mod database;
mod error;
mod models;
mod preflight;

#[cfg(test)]
mod tests;

use actors::orchestrator::ConciergeHandle;
use analytics::FeedbackEngine;
use config::Settings;
use dotenv::dotenv;
use models::{ChatRequest, HouseNote, PropertyProfile};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

const DEFAULT_FAQ_MIN_FREQUENCY: i64 = 3;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new("guestwise-core".into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let settings = Settings::from_env()?;

    // Initialize Database
    let db_pool = match database::init_db(Some(&settings.db_path)).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            None
        }
    };

    let report = preflight::run_preflight_checks(&settings, db_pool.as_ref()).await;
    if !report.ready_to_start {
        anyhow::bail!("Preflight failed: {}", report.summary);
    }

    let property_id = std::env::var("GUESTWISE_PROPERTY_ID").ok();
    if std::env::var("GUESTWISE_SEED_DEMO").is_ok() {
        if let (Some(pool), Some(id)) = (db_pool.as_ref(), property_id.as_deref()) {
            seed_demo_profile(pool, id).await?;
        }
    }

    // Initialize the Actor System after DB
    let concierge = ConciergeHandle::new(db_pool.clone(), settings.provider.clone());
    let analytics = FeedbackEngine::new(db_pool.clone());

    info!("GuestWise core ready");
    run_chat_loop(concierge, analytics, property_id).await
}

/// Writes a demo profile on first run so the chat loop has something to
/// ground answers in. Existing profiles are left untouched.
async fn seed_demo_profile(
    pool: &sqlx::sqlite::SqlitePool,
    property_id: &str,
) -> anyhow::Result<()> {
    if database::get_profile(pool, property_id).await?.is_some() {
        return Ok(());
    }

    let mut profile = PropertyProfile::default_profile();
    profile.id = property_id.to_string();
    profile.name = "Demo Apartment".to_string();
    profile.contacts.host = Some("+1 555 0100".to_string());
    profile.schedule.check_in = Some("15:00".to_string());
    profile.schedule.check_out = Some("11:00".to_string());
    profile.amenities.insert(
        "Wifi".to_string(),
        vec!["Network: GuestWise".to_string(), "Password: demo1234".to_string()],
    );
    profile.instructions.push(HouseNote {
        title: "Keys".to_string(),
        content: "Lockbox code is 2580, by the front door".to_string(),
    });
    database::save_profile(pool, &profile).await?;
    info!(property_id = property_id, "Seeded demo profile");
    Ok(())
}

/// Minimal interactive loop for local testing: one guest message per line,
/// plus a few admin commands for the analytics feedback loop.
async fn run_chat_loop(
    concierge: ConciergeHandle,
    analytics: FeedbackEngine,
    property_id: Option<String>,
) -> anyhow::Result<()> {
    let property = property_id.unwrap_or_else(|| "default".to_string());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"guest> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            stdout.write_all(b"guest> ").await?;
            stdout.flush().await?;
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let output = if let Some(command) = input.strip_prefix('/') {
            run_admin_command(command, &analytics, &property).await
        } else {
            run_guest_message(input, &concierge, &property).await
        };

        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"guest> ").await?;
        stdout.flush().await?;
    }

    info!("GuestWise core shutting down");
    Ok(())
}

async fn run_guest_message(message: &str, concierge: &ConciergeHandle, property: &str) -> String {
    let request = ChatRequest {
        message: message.to_string(),
        property_id: Some(property.to_string()),
        locale: None,
        system_prompt_override: None,
    };

    match concierge.handle_message(request).await {
        Ok(reply) => format!(
            "[{} | {} | {}ms] {}\n",
            reply.locale, reply.outcome, reply.timing_ms, reply.response
        ),
        Err(e) => format!("[rejected: {}] {}\n", e.kind(), e),
    }
}

/// `/faqs`, `/patterns`, `/feedback <record-id> <true|false>`.
async fn run_admin_command(command: &str, analytics: &FeedbackEngine, property: &str) -> String {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("faqs") => {
            if let Err(e) = analytics
                .generate_faqs(property, DEFAULT_FAQ_MIN_FREQUENCY)
                .await
            {
                return format!("FAQ generation failed: {}\n", e);
            }
            match analytics.get_faqs(property).await {
                Ok(faqs) if faqs.is_empty() => "No FAQs yet.\n".to_string(),
                Ok(faqs) => faqs
                    .iter()
                    .map(|f| format!("[x{}] {} -> {}\n", f.frequency, f.question, f.answer))
                    .collect(),
                Err(e) => format!("FAQ lookup failed: {}\n", e),
            }
        }
        Some("patterns") => match analytics.successful_patterns(property).await {
            Ok(patterns) if patterns.is_empty() => "No recorded questions yet.\n".to_string(),
            Ok(patterns) => patterns
                .iter()
                .map(|p| {
                    format!(
                        "[rate {:.2}, {}/{} helpful] {} -> {}\n",
                        p.helpful_rate, p.helpful_count, p.frequency, p.question, p.answer
                    )
                })
                .collect(),
            Err(e) => format!("Pattern lookup failed: {}\n", e),
        },
        Some("feedback") => {
            let id = parts.next().and_then(|s| s.parse::<i64>().ok());
            let helpful = parts.next().and_then(|s| s.parse::<bool>().ok());
            match (id, helpful) {
                (Some(id), Some(helpful)) => match analytics.apply_feedback(id, helpful).await {
                    Ok(()) => match analytics.get_record(id).await {
                        Ok(Some(record)) => format!(
                            "Recorded. '{}' helpful={:?}\n",
                            record.question, record.helpful
                        ),
                        _ => "Recorded.\n".to_string(),
                    },
                    Err(e) => format!("Feedback failed: {}\n", e),
                },
                _ => "Usage: /feedback <record-id> <true|false>\n".to_string(),
            }
        }
        _ => "Commands: /faqs, /patterns, /feedback <record-id> <true|false>\n".to_string(),
    }
}
