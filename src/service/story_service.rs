use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::agent::StoryGenerator;
use crate::db::StoryStore;
use crate::errors::{AppError, GenerationError};
use crate::models::{SavedStoryRecord, StoryRequest, StoryStats};
use crate::story::projector::{self, StoryView};
use crate::story::NarrativeSession;

const MAX_FIELD_LENGTH: usize = 500;

/// Owns the live story sessions and talks to the generator and the store.
///
/// The session registry lock is never held across a generation call. A
/// session's own phase admits at most one continuation in flight; a result
/// arriving for a session that was abandoned meanwhile is dropped.
#[derive(Clone)]
pub struct StoryService {
    generator: Arc<dyn StoryGenerator>,
    store: Arc<dyn StoryStore>,
    sessions: Arc<RwLock<HashMap<Uuid, NarrativeSession>>>,
    generation_timeout: Duration,
}

impl StoryService {
    pub fn new(
        generator: Arc<dyn StoryGenerator>,
        store: Arc<dyn StoryStore>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            generator,
            store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            generation_timeout,
        }
    }

    // ── Narrative sessions ───────────────────────────────────────────────────

    pub async fn start_story(&self, request: StoryRequest) -> Result<StoryView, AppError> {
        validate_request(&request)?;

        let mut session = NarrativeSession::new(request);
        info!(
            session = %session.id(),
            culture = %session.request().culture,
            branching = session.request().branching_enabled,
            "generating initial chapter"
        );

        let text = self.generate(&session.initial_prompt()).await.map_err(|e| {
            error!(session = %session.id(), "initial chapter failed: {e}");
            AppError::from(e)
        })?;
        session.ingest_initial(text)?;

        let view = projector::project(&session);
        self.sessions.write().await.insert(session.id(), session);
        Ok(view)
    }

    pub async fn view(&self, id: Uuid) -> Result<StoryView, AppError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(projector::project)
            .ok_or_else(|| session_not_found(id))
    }

    /// Submits the reader's choice and waits for the next chapter.
    pub async fn choose(&self, id: Uuid, label: &str) -> Result<StoryView, AppError> {
        let label = parse_label(label)?;

        let ticket = {
            let mut sessions = self.sessions.write().await;
            let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
            session.begin_choice(label).inspect_err(|e| {
                warn!(session = %id, "choice '{label}' rejected: {e}");
            })?
        };

        info!(session = %id, decision = ticket.decision, option = %ticket.chosen, "generating continuation");
        let outcome = self.generate(&ticket.prompt).await;

        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            info!(session = %id, decision = ticket.decision, "session abandoned; discarding continuation");
            return Err(session_not_found(id));
        };
        session.complete_continuation(&ticket, outcome)?;
        Ok(projector::project(session))
    }

    pub async fn abandon(&self, id: Uuid) -> Result<(), AppError> {
        if self.sessions.write().await.remove(&id).is_none() {
            return Err(session_not_found(id));
        }
        info!(session = %id, "session abandoned");
        Ok(())
    }

    /// Drops sessions the reader stopped touching at least `ttl` ago.
    /// Sessions waiting on a continuation are kept.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let idle = session.is_idle(now, ttl);
            if idle {
                debug!(session = %id, "evicting idle session");
            }
            !idle
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    /// Runs [`Self::evict_idle`] periodically until the runtime shuts down.
    pub fn spawn_idle_sweep(&self, ttl: Duration) -> JoinHandle<()> {
        let service = self.clone();
        let period = (ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                service.evict_idle(ttl).await;
            }
        })
    }

    // ── Saved stories ────────────────────────────────────────────────────────

    /// Persists a snapshot of the session's clean prose.
    pub async fn save_story(
        &self,
        id: Uuid,
        title: Option<String>,
    ) -> Result<SavedStoryRecord, AppError> {
        let record = {
            let sessions = self.sessions.read().await;
            let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
            let full_text = projector::full_text(session);
            if full_text.trim().is_empty() {
                return Err(AppError::IncompleteRecord {
                    reason: "the story has no narrative text yet".to_string(),
                });
            }
            SavedStoryRecord::new(title, full_text, session.request().clone(), session.decision_count())
        };

        self.store.save(&record).await?;
        Ok(record)
    }

    pub async fn list_stories(&self) -> Result<Vec<SavedStoryRecord>, AppError> {
        self.store.list().await
    }

    pub async fn get_story(&self, id: &str) -> Result<SavedStoryRecord, AppError> {
        self.store.find(id).await
    }

    pub async fn delete_story(&self, id: &str) -> Result<(), AppError> {
        if id.trim().is_empty() {
            return Err(AppError::EmptyField { field_name: "id".to_string() });
        }
        self.store.remove(id).await
    }

    pub async fn stats(&self) -> Result<StoryStats, AppError> {
        let records = self.store.list().await?;
        Ok(StoryStats::from_records(&records))
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.generation_timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::TimedOut {
                seconds: self.generation_timeout.as_secs(),
            }),
        }
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::SessionNotFound { id: id.to_string() }
}

fn parse_label(label: &str) -> Result<char, AppError> {
    let mut chars = label.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err(AppError::UnknownOption { label: label.to_string() }),
    }
}

fn validate_request(request: &StoryRequest) -> Result<(), AppError> {
    for (field_name, value) in [
        ("characters", &request.characters),
        ("setting", &request.setting),
        ("theme", &request.theme),
    ] {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::EmptyField { field_name: field_name.to_string() });
        }
        let actual_length = value.chars().count();
        if actual_length > MAX_FIELD_LENGTH {
            return Err(AppError::FieldTooLong {
                field_name: field_name.to_string(),
                max_length: MAX_FIELD_LENGTH,
                actual_length,
            });
        }
    }
    Ok(())
}
