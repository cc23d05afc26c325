//! Test doubles for the generation backend and the story store.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use uuid::Uuid;

use branching_tales::agent::StoryGenerator;
use branching_tales::db::StoryStore;
use branching_tales::models::{
    AudienceAge, Culture, ReadingLength, SavedStoryRecord, StoryRequest, StoryType,
};
use branching_tales::service::StoryService;
use branching_tales::{AppError, GenerationError};

pub const BRANCHING_CHAPTER: &str =
    "Itzel cruza el Templo Mayor.\n[DECISIÓN: ¿Qué decide Itzel?]\nA) Subir al altar\nB) Buscar a Quetzalcóatl";

pub const ENDING_CHAPTER: &str = "Y el cacao llegó a todos los pueblos.";

/// Replays queued outcomes in order and records every prompt it receives.
/// When gated, each call waits for a permit before answering.
#[derive(Default)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedGenerator {
    pub fn new(outcomes: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    pub fn gated(outcomes: Vec<Result<String, GenerationError>>, gate: Arc<Semaphore>) -> Self {
        Self { gate: Some(gate), ..Self::new(outcomes) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::Inference { message: "script exhausted".into() }))
    }
}

#[derive(Default)]
pub struct InMemoryStoryStore {
    records: Mutex<Vec<SavedStoryRecord>>,
}

#[async_trait]
impl StoryStore for InMemoryStoryStore {
    async fn save(&self, record: &SavedStoryRecord) -> Result<String, AppError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(record.id.clone())
    }

    async fn list(&self) -> Result<Vec<SavedStoryRecord>, AppError> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn find(&self, id: &str) -> Result<SavedStoryRecord, AppError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::StoryNotFound { id: id.to_string() })
    }

    async fn remove(&self, id: &str) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(AppError::StoryNotFound { id: id.to_string() });
        }
        Ok(())
    }
}

pub fn story_request(branching_enabled: bool) -> StoryRequest {
    StoryRequest {
        culture: Culture::Mexica,
        story_type: StoryType::Myth,
        characters: "Quetzalcóatl y una joven sacerdotisa llamada Itzel".into(),
        setting: "El gran Teocalli de Tenochtitlan".into(),
        theme: "El origen del cacao".into(),
        audience_age: AudienceAge::Preteen,
        duration: ReadingLength::Medium,
        branching_enabled,
    }
}

pub struct Harness {
    pub service: StoryService,
    pub generator: Arc<ScriptedGenerator>,
    pub store: Arc<InMemoryStoryStore>,
}

pub fn harness(generator: ScriptedGenerator) -> Harness {
    harness_with_timeout(generator, Duration::from_secs(5))
}

pub fn harness_with_timeout(generator: ScriptedGenerator, timeout: Duration) -> Harness {
    let generator = Arc::new(generator);
    let store = Arc::new(InMemoryStoryStore::default());
    let service = StoryService::new(generator.clone(), store.clone(), timeout);
    Harness { service, generator, store }
}

/// Spins until the session reports a continuation in flight.
pub async fn wait_until_pending(service: &StoryService, id: Uuid) {
    loop {
        if service.view(id).await.unwrap().pending {
            return;
        }
        tokio::task::yield_now().await;
    }
}
