//! Preflight Check System
//!
//! Performs health checks on all system components before the application
//! starts serving guests. No assumptions - everything is verified.

use crate::config::Settings;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    pub ready_to_start: bool,
    /// True when no provider is configured: the system starts but every
    /// answer comes from the local responder.
    pub degraded_mode: bool,
    pub summary: String,
}

/// Performs all preflight checks and returns a comprehensive report
pub async fn run_preflight_checks(
    settings: &Settings,
    db_pool: Option<&SqlitePool>,
) -> PreflightReport {
    info!("Running preflight checks");

    let mut checks = Vec::new();

    // 1. Check provider configuration
    let provider_check = check_provider_config(settings);
    let degraded_mode = !provider_check.passed;
    checks.push(provider_check);

    // 2. Check database connectivity
    checks.push(check_database(db_pool).await);

    // 3. Check that the data directory is writable
    checks.push(check_data_dir(settings));

    let all_passed = checks.iter().all(|c| c.passed);
    let critical_passed = checks
        .iter()
        .filter(|c| is_critical_check(&c.name))
        .all(|c| c.passed);

    let summary = if all_passed {
        "All checks passed. System ready.".to_string()
    } else if degraded_mode && critical_passed {
        "No model provider configured. Starting in degraded mode.".to_string()
    } else if critical_passed {
        "Some non-critical checks failed. System can start with warnings.".to_string()
    } else {
        "Critical checks failed. System cannot start.".to_string()
    };

    for check in &checks {
        if check.passed {
            info!("  [ok] {}: {}", check.name, check.message);
        } else {
            warn!("  [!!] {}: {}", check.name, check.message);
            if let Some(details) = &check.details {
                warn!("      Details: {}", details);
            }
        }
    }

    info!("Summary: {}", summary);

    PreflightReport {
        all_passed,
        checks,
        ready_to_start: critical_passed,
        degraded_mode,
        summary,
    }
}

fn is_critical_check(name: &str) -> bool {
    // The provider is deliberately non-critical: its absence means degraded
    // mode, not a refusal to start.
    matches!(name, "data_dir")
}

// --- Individual Checks ---

fn check_provider_config(settings: &Settings) -> CheckResult {
    match &settings.provider {
        Some(provider) => CheckResult::pass(
            "provider_config",
            &format!("Provider configured (model: {})", provider.model),
        ),
        None => CheckResult::fail(
            "provider_config",
            "GUESTWISE_API_KEY not set - answers will come from the local responder",
            None,
        ),
    }
}

async fn check_database(db_pool: Option<&SqlitePool>) -> CheckResult {
    let pool = match db_pool {
        Some(pool) => pool,
        None => {
            return CheckResult::fail(
                "database",
                "Database unavailable - profiles and analytics disabled",
                None,
            )
        }
    };

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => CheckResult::pass("database", "Database reachable"),
        Err(e) => CheckResult::fail(
            "database",
            "Database connection check failed",
            Some(e.to_string()),
        ),
    }
}

fn check_data_dir(settings: &Settings) -> CheckResult {
    if settings.db_path == ":memory:" {
        return CheckResult::pass("data_dir", "In-memory database, no data directory needed");
    }

    let parent = std::path::Path::new(&settings.db_path)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    match std::fs::create_dir_all(&parent) {
        Ok(_) => CheckResult::pass("data_dir", &format!("Data directory ready: {:?}", parent)),
        Err(e) => CheckResult::fail(
            "data_dir",
            &format!("Cannot create data directory {:?}", parent),
            Some(e.to_string()),
        ),
    }
}
