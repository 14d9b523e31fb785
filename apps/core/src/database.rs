use crate::models::{FaqEntry, PatternStat, PropertyProfile, QuestionRecord};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use tracing::info;

/// Default on-disk location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "data/guestwise.sqlite";

pub async fn init_db(db_path: Option<&str>) -> Result<SqlitePool, sqlx::Error> {
    let path = db_path.unwrap_or(DEFAULT_DB_PATH);
    let db_url = format!("sqlite://{}", path);

    info!("Initializing database at: {}", db_url);

    if path != ":memory:" {
        if let Some(parent) = std::path::Path::new(path).parent() {
            // create_if_missing only creates the file, not its directory
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    // An in-memory database exists per connection; a wider pool would hand
    // out empty databases.
    let max_connections = if path == ":memory:" { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    // Run migrations manually for now.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            id TEXT PRIMARY KEY,
            owner_id TEXT,
            profile JSON NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS question_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            property_id TEXT NOT NULL,
            question TEXT NOT NULL,
            response TEXT NOT NULL,
            locale TEXT NOT NULL,
            category TEXT,
            helpful INTEGER,
            created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS faq_entries (
            property_id TEXT NOT NULL,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            frequency INTEGER NOT NULL,
            helpful_count INTEGER NOT NULL,
            locale TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (property_id, question)
        );
        "#,
    )
    .execute(&pool)
    .await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

// --- Property profiles ---

#[derive(FromRow)]
struct PropertyRow {
    profile: Json<PropertyProfile>,
}

/// Fetches a property profile. A missing row is a valid state, not an error.
pub async fn get_profile(
    pool: &SqlitePool,
    property_id: &str,
) -> Result<Option<PropertyProfile>, sqlx::Error> {
    let row = sqlx::query_as::<_, PropertyRow>(
        r#"
        SELECT profile
        FROM properties
        WHERE id = ?
        "#,
    )
    .bind(property_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.profile.0))
}

/// Creates the profile on first save, mutates it in place afterwards.
pub async fn save_profile(
    pool: &SqlitePool,
    profile: &PropertyProfile,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO properties (id, owner_id, profile, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            owner_id = excluded.owner_id,
            profile = excluded.profile,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.owner_id)
    .bind(Json(profile))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

// --- Question records ---

pub async fn insert_question_record(
    pool: &SqlitePool,
    property_id: &str,
    question: &str,
    response: &str,
    locale: &str,
    category: Option<&str>,
) -> Result<QuestionRecord, sqlx::Error> {
    let created_at = Utc::now().timestamp();

    sqlx::query_as::<_, QuestionRecord>(
        r#"
        INSERT INTO question_records (property_id, question, response, locale, category, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, property_id, question, response, locale, category, helpful, created_at
        "#,
    )
    .bind(property_id)
    .bind(question)
    .bind(response)
    .bind(locale)
    .bind(category)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

/// Sets the helpfulness flag on exactly one record. Re-applying the same
/// value is a no-op at the row level, so the call is idempotent.
pub async fn set_feedback(
    pool: &SqlitePool,
    record_id: i64,
    helpful: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE question_records
        SET helpful = ?
        WHERE id = ?
        "#,
    )
    .bind(helpful)
    .bind(record_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_question_record(
    pool: &SqlitePool,
    record_id: i64,
) -> Result<Option<QuestionRecord>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRecord>(
        r#"
        SELECT id, property_id, question, response, locale, category, helpful, created_at
        FROM question_records
        WHERE id = ?
        "#,
    )
    .bind(record_id)
    .fetch_optional(pool)
    .await
}

// --- Aggregates ---

/// One group of identical question texts for a property. The canonical
/// answer is the response of the earliest record (lowest id), a deliberately
/// simple deterministic tie-break.
#[derive(Debug, FromRow)]
pub struct QuestionGroup {
    pub question: String,
    pub answer: String,
    pub locale: String,
    pub frequency: i64,
    pub helpful_count: i64,
}

pub async fn question_groups(
    pool: &SqlitePool,
    property_id: &str,
    min_frequency: i64,
) -> Result<Vec<QuestionGroup>, sqlx::Error> {
    sqlx::query_as::<_, QuestionGroup>(
        r#"
        SELECT q.question AS question,
               first.response AS answer,
               first.locale AS locale,
               COUNT(*) AS frequency,
               SUM(CASE WHEN q.helpful = 1 THEN 1 ELSE 0 END) AS helpful_count
        FROM question_records q
        JOIN question_records first ON first.id = (
            SELECT MIN(id) FROM question_records
            WHERE property_id = q.property_id AND question = q.question
        )
        WHERE q.property_id = ?
        GROUP BY q.question
        HAVING COUNT(*) >= ?
        ORDER BY frequency DESC, q.question ASC
        "#,
    )
    .bind(property_id)
    .bind(min_frequency)
    .fetch_all(pool)
    .await
}

// --- FAQ entries ---

pub async fn upsert_faq(pool: &SqlitePool, entry: &FaqEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO faq_entries (property_id, question, answer, frequency, helpful_count, locale, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(property_id, question) DO UPDATE SET
            answer = excluded.answer,
            frequency = excluded.frequency,
            helpful_count = excluded.helpful_count,
            locale = excluded.locale,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&entry.property_id)
    .bind(&entry.question)
    .bind(&entry.answer)
    .bind(entry.frequency)
    .bind(entry.helpful_count)
    .bind(&entry.locale)
    .bind(entry.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_faqs(
    pool: &SqlitePool,
    property_id: &str,
) -> Result<Vec<FaqEntry>, sqlx::Error> {
    sqlx::query_as::<_, FaqEntry>(
        r#"
        SELECT property_id, question, answer, frequency, helpful_count, locale, updated_at
        FROM faq_entries
        WHERE property_id = ?
        ORDER BY frequency DESC, question ASC
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await
}

/// Groups ranked for reuse as soft prompt guidance: best-rated answers first.
pub async fn pattern_stats(
    pool: &SqlitePool,
    property_id: &str,
) -> Result<Vec<PatternStat>, sqlx::Error> {
    sqlx::query_as::<_, PatternStat>(
        r#"
        SELECT question, answer, frequency, helpful_count,
               CASE WHEN rated_count > 0
                    THEN CAST(helpful_count AS REAL) / rated_count
                    ELSE 0.0
               END AS helpful_rate
        FROM (
            SELECT q.question AS question,
                   first.response AS answer,
                   COUNT(*) AS frequency,
                   SUM(CASE WHEN q.helpful = 1 THEN 1 ELSE 0 END) AS helpful_count,
                   SUM(CASE WHEN q.helpful IS NOT NULL THEN 1 ELSE 0 END) AS rated_count
            FROM question_records q
            JOIN question_records first ON first.id = (
                SELECT MIN(id) FROM question_records
                WHERE property_id = q.property_id AND question = q.question
            )
            WHERE q.property_id = ?
            GROUP BY q.question
        )
        ORDER BY helpful_rate DESC, helpful_count DESC, frequency DESC
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await
}
