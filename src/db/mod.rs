pub mod story_repository;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::SavedStoryRecord;

pub use story_repository::PgStoryRepository;

/// Document store holding finished stories.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Persists `record` and returns its id.
    async fn save(&self, record: &SavedStoryRecord) -> Result<String, AppError>;

    /// Every saved story, most recent first.
    async fn list(&self) -> Result<Vec<SavedStoryRecord>, AppError>;

    async fn find(&self, id: &str) -> Result<SavedStoryRecord, AppError>;

    /// Fails with [`AppError::StoryNotFound`] when `id` is absent.
    async fn remove(&self, id: &str) -> Result<(), AppError>;
}
