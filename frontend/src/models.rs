use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Matches the backend `StoryRequest`. Enum fields travel as their wire names.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StoryRequest {
    pub culture: String,
    pub story_type: String,
    pub characters: String,
    pub setting: String,
    pub theme: String,
    pub audience_age: String,
    pub duration: String,
    pub branching_enabled: bool,
}

impl Default for StoryRequest {
    fn default() -> Self {
        Self {
            culture: "mexica".to_string(),
            story_type: "myth".to_string(),
            characters: String::new(),
            setting: String::new(),
            theme: String::new(),
            audience_age: "9-12".to_string(),
            duration: "medium".to_string(),
            branching_enabled: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ChapterView {
    pub index: usize,
    pub text: String,
    pub synthetic: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DecisionOption {
    pub label: String,
    pub text: String,
}

/// Matches the backend `StoryView` projection.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoryView {
    pub session_id: String,
    pub request: StoryRequest,
    pub chapters: Vec<ChapterView>,
    pub options: Vec<DecisionOption>,
    pub pending: bool,
    pub completed: bool,
    pub completion: Option<String>,
    pub decision_count: u8,
    pub max_decisions: u8,
    pub notice: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChoiceRequest {
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SaveStoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Matches the backend `SavedStoryRecord`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SavedStory {
    pub id: String,
    pub title: String,
    pub full_text: String,
    pub culture: String,
    pub story_type: String,
    pub word_count: i32,
    pub decision_count: i32,
    pub is_interactive: bool,
    pub created_at: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoryStats {
    pub total: usize,
    pub total_words: u64,
    pub average_words: u64,
    pub distinct_cultures: usize,
    pub cultures: BTreeMap<String, usize>,
    pub story_types: BTreeMap<String, usize>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CultureProfile {
    pub culture: String,
    pub name: String,
    pub description: String,
    pub characters: Vec<String>,
    pub places: Vec<String>,
    pub elements: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoryTypeInfo {
    pub story_type: String,
    pub description: String,
}

/// Response of `GET /api/cultures`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ReferenceData {
    pub cultures: Vec<CultureProfile>,
    pub story_types: Vec<StoryTypeInfo>,
}

/// Error body returned by every failing endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
