//! Context kinds and classification results.
//!
//! Pure domain types - no I/O, no platform dependencies.

use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Where the text cursor sits, as far as the heuristic classifier can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// Plain source code.
    Code,

    /// Inside a line comment or a block comment.
    Comment,

    /// Inside an open string or character literal on the current line.
    String,

    /// Classification failed; callers fall back to their own default.
    #[default]
    Unknown,
}

impl ContextKind {
    pub const ALL: [ContextKind; 4] = [
        ContextKind::Code,
        ContextKind::Comment,
        ContextKind::String,
        ContextKind::Unknown,
    ];

    /// Returns a human-readable label for the kind.
    pub fn label(&self) -> &'static str {
        match self {
            ContextKind::Code => "Code",
            ContextKind::Comment => "Comment",
            ContextKind::String => "String",
            ContextKind::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The string literal around the cursor, when the kind is [`ContextKind::String`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringLiteral {
    /// Identifier the literal is assigned or passed to (`title` in
    /// `title = "..."`), when one can be read off the line.
    pub name: Option<String>,

    /// Language of what is already typed between the quotes. `None` while
    /// the literal is empty.
    pub content: Option<Language>,
}

/// Result of a single classification call.
///
/// Produced fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextClassification {
    pub kind: ContextKind,

    /// Short explanation of which test decided the kind.
    pub rationale: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<StringLiteral>,
}

impl ContextClassification {
    pub fn new(kind: ContextKind, rationale: impl Into<String>) -> Self {
        Self {
            kind,
            rationale: rationale.into(),
            literal: None,
        }
    }

    pub fn string(literal: StringLiteral) -> Self {
        Self {
            kind: ContextKind::String,
            rationale: "inside string literal".to_string(),
            literal: Some(literal),
        }
    }

    pub fn unknown(rationale: impl Into<String>) -> Self {
        Self::new(ContextKind::Unknown, rationale)
    }
}

impl std::fmt::Display for ContextClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind, self.rationale)
    }
}
