//! Core data models used throughout Style Extract.
//!
//! These types represent the samples, conversation turns, and extraction
//! results that flow through the scan → load → prompt → extract pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of corpus a run works on.
///
/// The kind decides the size metric of each [`Sample`], the default
/// extensions and paths, and which prompt template is used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CorpusKind {
    /// Source-code samples; size metric is the line count.
    Code,
    /// Free-text writing samples; size metric is the word count.
    Writing,
}

impl CorpusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorpusKind::Code => "code",
            CorpusKind::Writing => "writing",
        }
    }

    /// Unit name of the size metric, used in progress output.
    pub fn metric_unit(&self) -> &'static str {
        match self {
            CorpusKind::Code => "lines",
            CorpusKind::Writing => "words",
        }
    }

    /// Compute the size metric of `content` for this kind.
    pub fn measure(&self, content: &str) -> usize {
        match self {
            CorpusKind::Code => content.lines().count(),
            CorpusKind::Writing => content.split_whitespace().count(),
        }
    }
}

impl fmt::Display for CorpusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorpusKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(CorpusKind::Code),
            "writing" => Ok(CorpusKind::Writing),
            other => anyhow::bail!("Unknown corpus kind: '{}'. Must be code or writing.", other),
        }
    }
}

/// One loaded corpus file.
///
/// The size metric is computed once from the content when the sample is
/// created and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub relative_path: String,
    pub content: String,
    size_metric: usize,
}

impl Sample {
    pub fn new(kind: CorpusKind, relative_path: String, content: String) -> Self {
        let size_metric = kind.measure(&content);
        Self {
            relative_path,
            content,
            size_metric,
        }
    }

    pub fn size_metric(&self) -> usize {
        self.size_metric
    }
}

/// Speaker of a [`PromptTurn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of the conversation kept in the session log.
///
/// Serializes to the `{"role": ..., "content": ...}` shape used by chat
/// completion endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTurn {
    pub role: Role,
    pub content: String,
}

impl PromptTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Outcome of one successful extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub draft_text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}
