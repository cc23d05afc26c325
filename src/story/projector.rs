//! What the reader sees, derived from a session snapshot on every change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::StoryRequest;
use crate::story::parser::{extract_options, strip_decision_block, DecisionOption};
use crate::story::session::{Chapter, CompletionReason, NarrativeSession, MAX_DECISIONS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterView {
    pub index: usize,
    pub text: String,
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryView {
    pub session_id: Uuid,
    pub request: StoryRequest,
    pub chapters: Vec<ChapterView>,
    pub options: Vec<DecisionOption>,
    pub pending: bool,
    pub completed: bool,
    pub completion: Option<CompletionReason>,
    pub decision_count: u8,
    pub max_decisions: u8,
    /// Inline notice for a branch that ended on a generation failure.
    pub notice: Option<String>,
}

pub fn project(session: &NarrativeSession) -> StoryView {
    let branching = session.request().branching_enabled;
    let completion = session.completion();
    let pending = session.is_pending();

    let chapters = session
        .chapters()
        .iter()
        .map(|chapter| ChapterView {
            index: chapter.index,
            text: clean_text(chapter, branching),
            synthetic: chapter.synthetic,
        })
        .collect();

    let options = match session.chapters().last() {
        Some(last) if completion.is_none() && !pending => extract_options(&last.raw_text),
        _ => Vec::new(),
    };

    StoryView {
        session_id: session.id(),
        request: session.request().clone(),
        chapters,
        options,
        pending,
        completed: completion.is_some(),
        completion,
        decision_count: session.decision_count(),
        max_decisions: MAX_DECISIONS,
        notice: session.last_error().map(str::to_string),
    }
}

/// Clean prose of every chapter, separated by blank lines.
pub fn full_text(session: &NarrativeSession) -> String {
    let branching = session.request().branching_enabled;
    session
        .chapters()
        .iter()
        .map(|chapter| clean_text(chapter, branching))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn clean_text(chapter: &Chapter, branching: bool) -> String {
    if branching {
        strip_decision_block(&chapter.raw_text)
    } else {
        chapter.raw_text.trim().to_string()
    }
}
