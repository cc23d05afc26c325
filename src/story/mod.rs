//! Interactive narrative branching: prompt building, decision parsing, the
//! session state machine and the display projection.

pub mod parser;
pub mod projector;
pub mod prompt;
pub mod session;

pub use parser::{extract_options, strip_decision_block, DecisionOption, MAX_OPTIONS};
pub use projector::{project, ChapterView, StoryView};
pub use session::{
    Chapter, CompletionReason, ContinuationTicket, NarrativeSession, SessionPhase, MAX_DECISIONS,
};
