//! Note domain model.

use crate::error::{EsnotesError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Sentinel stored in `app`, `os` and `env` when no value was chosen.
pub const NONE_TAG: &str = "None";

fn default_tag() -> String {
    NONE_TAG.to_string()
}

/// The kind of observation a note records.
///
/// The built-in tags cover the usual exploratory-testing outcomes. Any other
/// tag string is kept as `Custom` so that imported data with newer tags
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteType {
    #[default]
    Note,
    Failed,
    Retest,
    Question,
    Bug,
    Custom(String),
}

/// Display color associated with a note type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteIndicator {
    Green,
    Red,
    Yellow,
    Blue,
    Magenta,
}

impl NoteType {
    /// The built-in tags, in the order they are offered to the user.
    pub const BUILTIN: [NoteType; 5] = [
        NoteType::Note,
        NoteType::Failed,
        NoteType::Retest,
        NoteType::Question,
        NoteType::Bug,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Note => "Note",
            Self::Failed => "Failed",
            Self::Retest => "Retest",
            Self::Question => "Question",
            Self::Bug => "Bug",
            Self::Custom(tag) => tag.as_str(),
        }
    }

    pub fn indicator(&self) -> NoteIndicator {
        match self {
            Self::Failed => NoteIndicator::Red,
            Self::Retest => NoteIndicator::Yellow,
            Self::Question => NoteIndicator::Blue,
            Self::Bug => NoteIndicator::Magenta,
            Self::Note | Self::Custom(_) => NoteIndicator::Green,
        }
    }
}

impl From<String> for NoteType {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "note" => Self::Note,
            "failed" => Self::Failed,
            "retest" => Self::Retest,
            "question" => Self::Question,
            "bug" => Self::Bug,
            _ => Self::Custom(trimmed.to_string()),
        }
    }
}

impl From<NoteType> for String {
    fn from(value: NoteType) -> Self {
        match value {
            NoteType::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl FromStr for NoteType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single logged observation within a session.
///
/// Fields the model does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique note identifier
    pub id: String,
    #[serde(rename = "type", default)]
    pub note_type: NoteType,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_tag")]
    pub app: String,
    #[serde(default = "default_tag")]
    pub os: String,
    #[serde(default = "default_tag")]
    pub env: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User input for a note that has not been assigned an identifier yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub note_type: NoteType,
    pub content: String,
    pub app: Option<String>,
    pub os: Option<String>,
    pub env: Option<String>,
}

impl NoteDraft {
    pub fn new(note_type: NoteType, content: impl Into<String>) -> Self {
        Self {
            note_type,
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }
}

/// Collapses a missing or blank classification value to [`NONE_TAG`].
pub fn tag_or_none(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(default_tag)
}

impl Note {
    /// Builds a note from a draft.
    ///
    /// # Errors
    ///
    /// Returns `EsnotesError::Validation` if the content is empty or whitespace-only.
    pub fn from_draft(id: impl Into<String>, draft: NoteDraft) -> Result<Self> {
        if draft.content.trim().is_empty() {
            return Err(EsnotesError::validation("Note content cannot be empty"));
        }

        Ok(Self {
            id: id.into(),
            note_type: draft.note_type,
            content: draft.content,
            app: tag_or_none(draft.app),
            os: tag_or_none(draft.os),
            env: tag_or_none(draft.env),
            extra: Map::new(),
        })
    }
}
