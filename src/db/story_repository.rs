use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{error, info};

use crate::db::StoryStore;
use crate::errors::AppError;
use crate::models::{Culture, SavedStoryRecord, StoryRequest, StoryType};

const SELECT_COLUMNS: &str = "SELECT id, title, full_text, culture, story_type, word_count, \
                              decision_count, is_interactive, request, created_at FROM stories";

#[derive(Clone)]
pub struct PgStoryRepository {
    pool: PgPool,
}

impl PgStoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryStore for PgStoryRepository {
    async fn save(&self, record: &SavedStoryRecord) -> Result<String, AppError> {
        let request = serde_json::to_string(&record.request)
            .map_err(|e| AppError::Unexpected(format!("Failed to encode story request: {e}")))?;

        sqlx::query(
            "INSERT INTO stories (id, title, full_text, culture, story_type, word_count,
                                  decision_count, is_interactive, request, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(&record.full_text)
        .bind(record.culture.as_str())
        .bind(record.story_type.as_str())
        .bind(record.word_count)
        .bind(record.decision_count)
        .bind(record.is_interactive)
        .bind(request)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to save story {}: {e}", record.id);
            AppError::db_query("Failed to save story", e)
        })?;

        info!("Story {} saved ({} words)", record.id, record.word_count);
        Ok(record.id.clone())
    }

    async fn list(&self) -> Result<Vec<SavedStoryRecord>, AppError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to fetch stories: {e}");
                AppError::db_query("Failed to fetch stories", e)
            })?;

        rows.iter().map(record_from_row).collect()
    }

    async fn find(&self, id: &str) -> Result<SavedStoryRecord, AppError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to find story {id}: {e}");
                AppError::db_query(format!("Failed to find story {id}"), e)
            })?
            .ok_or_else(|| AppError::StoryNotFound { id: id.to_string() })?;

        record_from_row(&row)
    }

    async fn remove(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to delete story {id}: {e}");
                AppError::db_query(format!("Failed to delete story {id}"), e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::StoryNotFound { id: id.to_string() });
        }
        info!("Story {id} deleted");
        Ok(())
    }
}

fn record_from_row(row: &PgRow) -> Result<SavedStoryRecord, AppError> {
    let culture: String = row
        .try_get("culture")
        .map_err(|e| AppError::db_query("Failed to read culture", e))?;
    let story_type: String = row
        .try_get("story_type")
        .map_err(|e| AppError::db_query("Failed to read story_type", e))?;
    let request: String = row
        .try_get("request")
        .map_err(|e| AppError::db_query("Failed to read request", e))?;

    Ok(SavedStoryRecord {
        id: row.try_get("id")
            .map_err(|e| AppError::db_query("Failed to read id", e))?,
        title: row.try_get("title")
            .map_err(|e| AppError::db_query("Failed to read title", e))?,
        full_text: row.try_get("full_text")
            .map_err(|e| AppError::db_query("Failed to read full_text", e))?,
        culture: culture.parse::<Culture>().map_err(AppError::Unexpected)?,
        story_type: story_type.parse::<StoryType>().map_err(AppError::Unexpected)?,
        word_count: row.try_get("word_count")
            .map_err(|e| AppError::db_query("Failed to read word_count", e))?,
        decision_count: row.try_get("decision_count")
            .map_err(|e| AppError::db_query("Failed to read decision_count", e))?,
        is_interactive: row.try_get("is_interactive")
            .map_err(|e| AppError::db_query("Failed to read is_interactive", e))?,
        request: serde_json::from_str::<StoryRequest>(&request)
            .map_err(|e| AppError::Unexpected(format!("Malformed story request: {e}")))?,
        created_at: row.try_get("created_at")
            .map_err(|e| AppError::db_query("Failed to read created_at", e))?,
    })
}
