use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    SingleLine,
    MultiLine,
}

/// One comment found in candidate text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentOccurrence {
    /// 1-based line of the comment marker.
    pub line: usize,
    pub text: String,
    pub kind: CommentKind,
    /// The raw line the comment starts on, kept for diagnostics.
    pub source_line: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Redundant,
    Useful,
}

impl Category {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "redundant" => Some(Category::Redundant),
            "useful" => Some(Category::Useful),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub line: usize,
    pub comment_text: String,
    pub category: Category,
    pub reason: String,
}

impl Classification {
    pub fn for_occurrence(occurrence: &CommentOccurrence, category: Category, reason: impl Into<String>) -> Self {
        Classification {
            line: occurrence.line,
            comment_text: occurrence.text.clone(),
            category,
            reason: reason.into(),
        }
    }

    pub fn is_redundant(&self) -> bool {
        self.category == Category::Redundant
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("analyzer command not found: {0}")]
    NotFound(String),
    #[error("failed to start analyzer: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("analyzer timed out after {0:?}")]
    Timeout(Duration),
    #[error("analyzer exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },
    #[error("analyzer output could not be parsed: {0}")]
    MalformedOutput(String),
    #[error("failed to write analyzer prompt: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("failed to read hook input: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid JSON input: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
}
