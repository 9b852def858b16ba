//! Application configuration model.
//!
//! Mirrors the sections of `config.toml`. Every section and field is optional in
//! the file; missing values fall back to the defaults below.

use crate::note::NoteType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name offered when exporting sessions.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "sessions_export.json";

/// Default number of text lines per report page.
pub const DEFAULT_LINES_PER_PAGE: usize = 48;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub recording: RecordingConfig,
    pub report: ReportConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the directory holding `sessions.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

/// Choices offered while logging notes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RecordingConfig {
    pub default_note_type: NoteType,
    pub apps: Vec<String>,
    pub oses: Vec<String>,
    pub envs: Vec<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            default_note_type: NoteType::Note,
            apps: vec!["UCL".to_string(), "UEL".to_string()],
            oses: vec!["Android".to_string(), "iOS".to_string()],
            envs: vec!["PROD".to_string(), "INT".to_string()],
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub lines_per_page: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }
}
