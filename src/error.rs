//! Error types.
//!
//! Only malformed input is an error in the `Result` sense: without a typed
//! [`Instance`](crate::models::Instance) there is nothing left to check.
//! Every semantic defect is a [`Violation`](crate::validation::Violation)
//! collected into the report instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single syntactic defect in the input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDefect {
    /// Location in the document, e.g. `modes[2].duration`.
    pub path: String,
    /// What is wrong at that location.
    pub message: String,
    /// Identifiers of the enclosing entity, when they could be read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
}

impl SyntaxDefect {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            entities: Vec::new(),
        }
    }

    pub(crate) fn with_entities(mut self, entities: Vec<String>) -> Self {
        self.entities = entities;
        self
    }
}

impl std::fmt::Display for SyntaxDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// The input could not be turned into a typed instance.
///
/// Carries every defect found, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed input: {} syntactic defect(s), first: {}", .defects.len(), first_defect(.defects))]
pub struct MalformedInputError {
    /// All defects, in document order.
    pub defects: Vec<SyntaxDefect>,
}

impl MalformedInputError {
    pub(crate) fn new(defects: Vec<SyntaxDefect>) -> Self {
        Self { defects }
    }
}

fn first_defect(defects: &[SyntaxDefect]) -> String {
    defects
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none>".to_string())
}
