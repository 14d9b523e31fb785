//! Analytics Engine Tests
//!
//! Feedback idempotency, FAQ synthesis thresholds and ranking.

use crate::analytics::FeedbackEngine;
use crate::brain::language::Locale;
use crate::database;
use sqlx::sqlite::SqlitePool;

async fn engine_with_store() -> (FeedbackEngine, SqlitePool) {
    let pool = database::init_db(Some(":memory:"))
        .await
        .expect("Failed to create test pool");
    (FeedbackEngine::new(Some(pool.clone())), pool)
}

async fn record_n(engine: &FeedbackEngine, question: &str, answers: &[&str]) -> Vec<i64> {
    let mut ids = Vec::new();
    for answer in answers {
        let id = engine
            .record("prop-1", question, answer, Locale::English, None)
            .await
            .expect("record should succeed with a store");
        ids.push(id);
    }
    ids
}

#[cfg(test)]
mod feedback_tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_feedback_is_idempotent() {
        let (engine, _pool) = engine_with_store().await;
        let ids = record_n(&engine, "wifi?", &["answer"]).await;

        engine.apply_feedback(ids[0], true).await.unwrap();
        let first = engine.get_record(ids[0]).await.unwrap().unwrap();

        // Re-applying the same value is a no-op.
        engine.apply_feedback(ids[0], true).await.unwrap();
        let second = engine.get_record(ids[0]).await.unwrap().unwrap();

        assert_eq!(first.helpful, Some(true));
        assert_eq!(second.helpful, Some(true));
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_feedback_can_be_revised() {
        let (engine, _pool) = engine_with_store().await;
        let ids = record_n(&engine, "wifi?", &["answer"]).await;

        engine.apply_feedback(ids[0], true).await.unwrap();
        engine.apply_feedback(ids[0], false).await.unwrap();

        let record = engine.get_record(ids[0]).await.unwrap().unwrap();
        assert_eq!(record.helpful, Some(false));
    }

    #[tokio::test]
    async fn test_feedback_on_unknown_record_is_validation_error() {
        let (engine, _pool) = engine_with_store().await;
        let result = engine.apply_feedback(12345, true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_record_without_store_is_absorbed() {
        let engine = FeedbackEngine::new(None);
        let id = engine
            .record("prop-1", "wifi?", "answer", Locale::English, None)
            .await;
        assert!(id.is_none());
    }
}

#[cfg(test)]
mod faq_synthesis_tests {
    use super::*;

    #[tokio::test]
    async fn test_threshold_boundary() {
        let (engine, _pool) = engine_with_store().await;

        record_n(&engine, "asked twice?", &["a", "b"]).await;
        record_n(&engine, "asked three times?", &["first", "second", "third"]).await;

        let faqs = engine.generate_faqs("prop-1", 3).await.unwrap();

        assert_eq!(faqs.len(), 1);
        assert_eq!(faqs[0].question, "asked three times?");
        assert_eq!(faqs[0].frequency, 3);
        assert_eq!(faqs[0].answer, "first");
    }

    #[tokio::test]
    async fn test_generation_is_idempotent() {
        let (engine, _pool) = engine_with_store().await;
        record_n(&engine, "wifi?", &["a1", "a2", "a3"]).await;

        let first = engine.generate_faqs("prop-1", 3).await.unwrap();
        let second = engine.generate_faqs("prop-1", 3).await.unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].question, second[0].question);
        assert_eq!(first[0].answer, second[0].answer);
        assert_eq!(first[0].frequency, second[0].frequency);

        // The stored entry set is unchanged as well.
        let stored = engine.get_faqs("prop-1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].frequency, 3);
    }

    #[tokio::test]
    async fn test_helpful_count_flows_into_entries() {
        let (engine, _pool) = engine_with_store().await;
        let ids = record_n(&engine, "wifi?", &["a1", "a2", "a3"]).await;

        engine.apply_feedback(ids[0], true).await.unwrap();
        engine.apply_feedback(ids[1], false).await.unwrap();

        let faqs = engine.generate_faqs("prop-1", 3).await.unwrap();
        assert_eq!(faqs[0].helpful_count, 1);
    }

    #[tokio::test]
    async fn test_properties_are_isolated() {
        let (engine, pool) = engine_with_store().await;
        record_n(&engine, "wifi?", &["a1", "a2", "a3"]).await;

        for _ in 0..3 {
            database::insert_question_record(&pool, "prop-2", "pool?", "open 9-21", "en", None)
                .await
                .unwrap();
        }

        let faqs_one = engine.generate_faqs("prop-1", 3).await.unwrap();
        let faqs_two = engine.generate_faqs("prop-2", 3).await.unwrap();

        assert_eq!(faqs_one[0].question, "wifi?");
        assert_eq!(faqs_two[0].question, "pool?");
    }

    #[tokio::test]
    async fn test_without_store_generation_noops() {
        let engine = FeedbackEngine::new(None);
        let faqs = engine.generate_faqs("prop-1", 1).await.unwrap();
        assert!(faqs.is_empty());
    }
}

#[cfg(test)]
mod pattern_tests {
    use super::*;

    #[tokio::test]
    async fn test_patterns_ranked_by_helpful_rate_then_counts() {
        let (engine, _pool) = engine_with_store().await;

        // "great?": 2 asks, both rated helpful (rate 1.0)
        let great = record_n(&engine, "great?", &["g1", "g2"]).await;
        engine.apply_feedback(great[0], true).await.unwrap();
        engine.apply_feedback(great[1], true).await.unwrap();

        // "mixed?": 4 asks, 1 helpful of 2 rated (rate 0.5)
        let mixed = record_n(&engine, "mixed?", &["m1", "m2", "m3", "m4"]).await;
        engine.apply_feedback(mixed[0], true).await.unwrap();
        engine.apply_feedback(mixed[1], false).await.unwrap();

        // "unrated?": frequent but nothing rated (rate 0)
        record_n(&engine, "unrated?", &["u1", "u2", "u3", "u4", "u5"]).await;

        let patterns = engine.successful_patterns("prop-1").await.unwrap();

        assert_eq!(patterns.len(), 3);
        assert_eq!(patterns[0].question, "great?");
        assert_eq!(patterns[1].question, "mixed?");
        assert_eq!(patterns[2].question, "unrated?");
        assert!(patterns[0].helpful_rate > patterns[1].helpful_rate);
        assert_eq!(patterns[2].helpful_rate, 0.0);
    }
}
