//! The narrative session: an append-only chapter history plus an explicit
//! phase that bounds the decision tree and admits one generation at a time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{AppError, GenerationError};
use crate::models::StoryRequest;
use crate::story::parser::{extract_options, DecisionOption};
use crate::story::prompt::{build_continuation_prompt, build_initial_prompt};

pub const MAX_DECISIONS: u8 = 3;

/// One generated unit of narrative, kept exactly as the generator returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub index: usize,
    pub raw_text: String,
    /// Stand-in written locally after a failed continuation.
    pub synthetic: bool,
}

impl Chapter {
    pub fn new(index: usize, raw_text: impl Into<String>) -> Self {
        Self { index, raw_text: raw_text.into(), synthetic: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Branching was not requested; the story is a single chapter.
    Linear,
    DecisionLimit,
    /// The last chapter carried no recognizable decision point.
    NoOptions,
    GenerationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingInitialGeneration,
    Displaying { chapter: usize },
    AwaitingContinuation { chosen: DecisionOption },
    Completed(CompletionReason),
}

/// Issued when a choice is accepted; must be handed back with the
/// generation outcome. A ticket that no longer matches the session is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationTicket {
    pub session_id: Uuid,
    pub decision: u8,
    pub chosen: DecisionOption,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct NarrativeSession {
    id: Uuid,
    request: StoryRequest,
    chapters: Vec<Chapter>,
    decision_count: u8,
    phase: SessionPhase,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    last_touched: Instant,
}

impl NarrativeSession {
    pub fn new(request: StoryRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            chapters: Vec::new(),
            decision_count: 0,
            phase: SessionPhase::AwaitingInitialGeneration,
            last_error: None,
            created_at: Utc::now(),
            last_touched: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &StoryRequest {
        &self.request
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn decision_count(&self) -> u8 {
        self.decision_count
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_touched(&self) -> Instant {
        self.last_touched
    }

    /// True when the reader has not acted on this session for at least `ttl`.
    /// A session waiting on a continuation is never idle.
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        !self.is_pending() && now.saturating_duration_since(self.last_touched) >= ttl
    }

    pub fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::AwaitingInitialGeneration | SessionPhase::AwaitingContinuation { .. }
        )
    }

    pub fn completion(&self) -> Option<CompletionReason> {
        match self.phase {
            SessionPhase::Completed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn initial_prompt(&self) -> String {
        build_initial_prompt(&self.request)
    }

    /// Options the reader may pick right now; empty unless displaying.
    pub fn current_options(&self) -> Vec<DecisionOption> {
        match self.phase {
            SessionPhase::Displaying { chapter } => self
                .chapters
                .get(chapter)
                .map(|c| extract_options(&c.raw_text))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Stores the first chapter and decides whether the story can branch.
    pub fn ingest_initial(&mut self, raw_text: String) -> Result<(), AppError> {
        if self.phase != SessionPhase::AwaitingInitialGeneration {
            return Err(AppError::Unexpected(format!(
                "session {} already holds its first chapter",
                self.id
            )));
        }
        if raw_text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        self.chapters.push(Chapter::new(0, raw_text));
        self.touch();
        self.phase = if !self.request.branching_enabled {
            SessionPhase::Completed(CompletionReason::Linear)
        } else {
            self.phase_after_chapter(0)
        };
        debug!(session = %self.id, phase = ?self.phase, "initial chapter ingested");
        Ok(())
    }

    /// Accepts the reader's choice and moves to `AwaitingContinuation`.
    /// Rejected while a generation is in flight or once the story is complete.
    pub fn begin_choice(&mut self, label: char) -> Result<ContinuationTicket, AppError> {
        match self.phase {
            SessionPhase::Displaying { .. } => {}
            SessionPhase::Completed(_) => return Err(AppError::SessionCompleted),
            SessionPhase::AwaitingInitialGeneration | SessionPhase::AwaitingContinuation { .. } => {
                return Err(AppError::GenerationPending)
            }
        }
        if self.decision_count >= MAX_DECISIONS {
            return Err(AppError::SessionCompleted);
        }

        let label = label.to_ascii_uppercase();
        let chosen = self
            .current_options()
            .into_iter()
            .find(|option| option.label == label)
            .ok_or_else(|| AppError::UnknownOption { label: label.to_string() })?;

        let prompt = build_continuation_prompt(&self.chapters, &chosen, self.decision_count);
        self.phase = SessionPhase::AwaitingContinuation { chosen: chosen.clone() };
        self.touch();

        Ok(ContinuationTicket {
            session_id: self.id,
            decision: self.decision_count + 1,
            chosen,
            prompt,
        })
    }

    /// Applies the generation outcome for `ticket`. A failure still appends a
    /// chapter, written locally, and completes the story.
    pub fn complete_continuation(
        &mut self,
        ticket: &ContinuationTicket,
        outcome: Result<String, GenerationError>,
    ) -> Result<(), AppError> {
        let matches_ticket = ticket.session_id == self.id
            && ticket.decision == self.decision_count + 1
            && matches!(&self.phase, SessionPhase::AwaitingContinuation { chosen } if *chosen == ticket.chosen);
        if !matches_ticket {
            warn!(session = %self.id, decision = ticket.decision, "refusing stale continuation");
            return Err(AppError::StaleContinuation { decision: ticket.decision });
        }

        let outcome = outcome.and_then(|text| {
            if text.trim().is_empty() {
                Err(GenerationError::EmptyResponse)
            } else {
                Ok(text)
            }
        });

        let index = self.chapters.len();
        self.decision_count += 1;
        self.touch();

        match outcome {
            Ok(raw_text) => {
                self.chapters.push(Chapter::new(index, raw_text));
                self.last_error = None;
                self.phase = self.phase_after_chapter(index);
            }
            Err(e) => {
                warn!(session = %self.id, decision = ticket.decision, "continuation failed: {e}");
                self.chapters.push(Chapter {
                    index,
                    raw_text: fallback_chapter_text(&ticket.chosen),
                    synthetic: true,
                });
                self.last_error = Some(e.to_string());
                self.phase = SessionPhase::Completed(CompletionReason::GenerationFailed);
            }
        }

        debug!(session = %self.id, decisions = self.decision_count, phase = ?self.phase, "continuation applied");
        Ok(())
    }

    fn phase_after_chapter(&self, index: usize) -> SessionPhase {
        if self.decision_count >= MAX_DECISIONS {
            return SessionPhase::Completed(CompletionReason::DecisionLimit);
        }
        match self.chapters.get(index) {
            Some(chapter) if !extract_options(&chapter.raw_text).is_empty() => {
                SessionPhase::Displaying { chapter: index }
            }
            _ => SessionPhase::Completed(CompletionReason::NoOptions),
        }
    }
}

/// In-story text shown in place of a continuation that could not be generated.
pub fn fallback_chapter_text(chosen: &DecisionOption) -> String {
    format!(
        "Los códices ancestrales se han difuminado... La historia continúa según tu elección: {}\n\n\
         (No fue posible escribir la continuación. Intenta crear una nueva historia.)",
        chosen.text
    )
}
