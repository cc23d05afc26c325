use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Story request ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Culture {
    Mexica,
    Maya,
    Zapoteca,
    Olmeca,
    Tolteca,
}

impl Culture {
    pub const ALL: [Culture; 5] = [
        Culture::Mexica,
        Culture::Maya,
        Culture::Zapoteca,
        Culture::Olmeca,
        Culture::Tolteca,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Culture::Mexica => "mexica",
            Culture::Maya => "maya",
            Culture::Zapoteca => "zapoteca",
            Culture::Olmeca => "olmeca",
            Culture::Tolteca => "tolteca",
        }
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Culture {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Culture::ALL
            .into_iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown culture: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    Myth,
    Legend,
    Adventure,
    Didactic,
    Fantasy,
}

impl StoryType {
    pub const ALL: [StoryType; 5] = [
        StoryType::Myth,
        StoryType::Legend,
        StoryType::Adventure,
        StoryType::Didactic,
        StoryType::Fantasy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoryType::Myth => "myth",
            StoryType::Legend => "legend",
            StoryType::Adventure => "adventure",
            StoryType::Didactic => "didactic",
            StoryType::Fantasy => "fantasy",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoryType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown story type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudienceAge {
    #[serde(rename = "6-8")]
    Children,
    #[serde(rename = "9-12")]
    Preteen,
    #[serde(rename = "13-17")]
    Teen,
    #[serde(rename = "18+")]
    Adult,
}

impl AudienceAge {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceAge::Children => "6-8",
            AudienceAge::Preteen => "9-12",
            AudienceAge::Teen => "13-17",
            AudienceAge::Adult => "18+",
        }
    }
}

/// Target reading length, mapped to a word range in the initial prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLength {
    Short,
    Medium,
    Long,
}

impl ReadingLength {
    pub fn word_range(&self) -> (u32, u32) {
        match self {
            ReadingLength::Short => (300, 400),
            ReadingLength::Medium => (500, 700),
            ReadingLength::Long => (800, 1000),
        }
    }

    pub fn reading_minutes(&self) -> &'static str {
        match self {
            ReadingLength::Short => "3-5",
            ReadingLength::Medium => "5-8",
            ReadingLength::Long => "8-12",
        }
    }
}

/// What the reader asked for. Immutable once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub culture: Culture,
    pub story_type: StoryType,
    pub characters: String,
    pub setting: String,
    pub theme: String,
    pub audience_age: AudienceAge,
    pub duration: ReadingLength,
    #[serde(default)]
    pub branching_enabled: bool,
}

// ── API payloads ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    pub label: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveStoryRequest {
    #[serde(default)]
    pub title: Option<String>,
}

// ── Persisted stories ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStoryRecord {
    pub id: String,
    pub title: String,
    pub full_text: String,
    pub culture: Culture,
    pub story_type: StoryType,
    pub word_count: i32,
    pub decision_count: i32,
    pub is_interactive: bool,
    pub request: StoryRequest,
    pub created_at: DateTime<Utc>,
}

impl SavedStoryRecord {
    /// Builds a record ready to persist. A blank title falls back to
    /// `Cuento <culture> - <date>`.
    pub fn new(
        title: Option<String>,
        full_text: String,
        request: StoryRequest,
        decision_count: u8,
    ) -> Self {
        let created_at = Utc::now();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                format!("Cuento {} - {}", request.culture, created_at.format("%d/%m/%Y"))
            });
        let word_count = i32::try_from(count_words(&full_text)).unwrap_or(i32::MAX);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            full_text,
            culture: request.culture,
            story_type: request.story_type,
            word_count,
            decision_count: i32::from(decision_count),
            is_interactive: request.branching_enabled,
            request,
            created_at,
        }
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Aggregates over every saved story, computed from a full listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryStats {
    pub total: usize,
    pub total_words: u64,
    pub average_words: u64,
    pub distinct_cultures: usize,
    pub cultures: BTreeMap<String, usize>,
    pub story_types: BTreeMap<String, usize>,
}

impl StoryStats {
    pub fn from_records(records: &[SavedStoryRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut stats = Self { total: records.len(), ..Self::default() };
        for record in records {
            stats.total_words += u64::try_from(record.word_count.max(0)).unwrap_or_default();
            *stats.cultures.entry(record.culture.to_string()).or_default() += 1;
            *stats.story_types.entry(record.story_type.to_string()).or_default() += 1;
        }
        stats.distinct_cultures = stats.cultures.len();
        let total = stats.total as u64;
        stats.average_words = (stats.total_words + total / 2) / total;
        stats
    }
}
