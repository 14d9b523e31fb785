//! Question analytics and FAQ synthesis.
//!
//! Ingests (question, answer, locale, helpfulness) tuples and folds them into
//! running statistics; recurring questions above a frequency threshold are
//! synthesized into FAQ entries. Every operation tolerates an absent or
//! failing record store: analytics must never cost a guest their chat answer.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::brain::language::Locale;
use crate::database;
use crate::error::AppError;
use crate::models::{FaqEntry, PatternStat, QuestionRecord};

/// Deterministic, rule-driven feedback engine over the question record store.
#[derive(Clone)]
pub struct FeedbackEngine {
    pool: Option<SqlitePool>,
}

impl FeedbackEngine {
    pub fn new(pool: Option<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Appends a question record. Storage failures are absorbed: the caller
    /// gets `None` and the guest-visible flow is unaffected.
    pub async fn record(
        &self,
        property_id: &str,
        question: &str,
        response: &str,
        locale: Locale,
        category: Option<&str>,
    ) -> Option<i64> {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => {
                warn!("Analytics store unavailable, dropping question record");
                return None;
            }
        };

        match database::insert_question_record(
            pool,
            property_id,
            question,
            response,
            locale.code(),
            category,
        )
        .await
        {
            Ok(record) => Some(record.id),
            Err(e) => {
                warn!("Failed to record question: {}", e);
                None
            }
        }
    }

    /// Applies helpfulness feedback to exactly one record. Idempotent:
    /// re-applying the same value leaves the row unchanged.
    pub async fn apply_feedback(&self, record_id: i64, helpful: bool) -> Result<(), AppError> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| AppError::Config("Analytics store not configured".to_string()))?;

        let rows = database::set_feedback(pool, record_id, helpful).await?;
        if rows == 0 {
            return Err(AppError::Validation(format!(
                "No question record with id {}",
                record_id
            )));
        }
        Ok(())
    }

    pub async fn get_record(&self, record_id: i64) -> Result<Option<QuestionRecord>, AppError> {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => return Ok(None),
        };
        Ok(database::get_question_record(pool, record_id).await?)
    }

    /// Regenerates FAQ entries for a property from recorded questions.
    ///
    /// Groups records by exact question text, keeps groups seen at least
    /// `min_frequency` times, picks the first recorded answer as canonical and
    /// upserts one entry per group. Re-running on unchanged data yields the
    /// same entry set.
    pub async fn generate_faqs(
        &self,
        property_id: &str,
        min_frequency: i64,
    ) -> Result<Vec<FaqEntry>, AppError> {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => {
                warn!("Analytics store unavailable, skipping FAQ generation");
                return Ok(Vec::new());
            }
        };

        let groups = database::question_groups(pool, property_id, min_frequency).await?;
        let updated_at = Utc::now().timestamp();

        let mut entries = Vec::with_capacity(groups.len());
        for group in groups {
            let entry = FaqEntry {
                property_id: property_id.to_string(),
                question: group.question,
                answer: group.answer,
                frequency: group.frequency,
                helpful_count: group.helpful_count,
                locale: group.locale,
                updated_at,
            };
            database::upsert_faq(pool, &entry).await?;
            entries.push(entry);
        }

        info!(
            property_id = property_id,
            count = entries.len(),
            "FAQ set regenerated"
        );
        Ok(entries)
    }

    pub async fn get_faqs(&self, property_id: &str) -> Result<Vec<FaqEntry>, AppError> {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => return Ok(Vec::new()),
        };
        Ok(database::get_faqs(pool, property_id).await?)
    }

    /// Ranks recurring questions by how well their answers landed:
    /// (helpful rate desc, helpful count desc, frequency desc). Soft guidance
    /// for future prompt construction, never a hard override.
    pub async fn successful_patterns(
        &self,
        property_id: &str,
    ) -> Result<Vec<PatternStat>, AppError> {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => return Ok(Vec::new()),
        };
        Ok(database::pattern_stats(pool, property_id).await?)
    }
}
