//! Cursor context awareness for inputshift.
//!
//! This crate is the pure domain layer: it decides *where* the cursor is
//! and *what* the user asked for in each place, without touching the
//! platform.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  kind.rs       - ContextKind, ContextClassification         │
//! │  classifier.rs - classify(text, offset) (pure, heuristic)   │
//! │  language.rs   - Language, Preference, Scene                │
//! │  rules.rs      - user pattern rules around the cursor       │
//! │  strings.rs    - per-literal rules and learned habits       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use inputshift_context::{classify, ContextKind};
//!
//! let text = "let greeting = \"hello\"; // say hi";
//! let inside_string = text.find("hello").unwrap();
//! assert_eq!(classify(text, inside_string).kind, ContextKind::String);
//! assert_eq!(classify(text, text.len()).kind, ContextKind::Comment);
//! ```

mod classifier;
mod kind;
mod language;
mod rules;
mod strings;

pub use classifier::{classify, comment_marker_before, is_native_text, CommentMarker};
pub use kind::{ContextClassification, ContextKind, StringLiteral};
pub use language::{Language, Preference, Scene, UnknownScene};
pub use rules::{CompiledRule, MatchStrategy, PatternRule, RuleError, RuleInput, RuleSet};
pub use strings::{
    compile_string_rules, file_type_key, record_habit, string_target, CompiledStringRule,
    StringHabit, StringRule,
};
