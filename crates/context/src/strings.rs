//! Per-literal preferences: configured string rules and learned habits.
//!
//! Both are keyed by the file extension and the name the classifier reads
//! off the line (`title` in `title = "..."`). Habits are exact matches and
//! win over rules; rule names may use `*` as a wildcard.

use crate::language::Language;
use crate::rules::RuleError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configured preference for literals whose name matches `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringRule {
    pub enabled: bool,

    /// File extensions the rule applies to. Empty means all files.
    pub file_types: Vec<String>,

    /// Literal name, `*` matching any run of characters. Case-insensitive.
    pub name: String,

    pub target: Language,
}

impl Default for StringRule {
    fn default() -> Self {
        Self {
            enabled: true,
            file_types: Vec::new(),
            name: String::new(),
            target: Language::Native,
        }
    }
}

/// The language the user picked by hand inside a named literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringHabit {
    /// Lowercase extension, empty when the file name was unknown.
    pub file_type: String,
    pub name: String,
    pub target: Language,
    /// When the habit was last recorded, in milliseconds since epoch.
    #[serde(default)]
    pub recorded_ms: i64,
}

impl StringHabit {
    pub fn matches(&self, file_type: &str, name: &str) -> bool {
        self.name == name && self.file_type.eq_ignore_ascii_case(file_type)
    }
}

/// Normalizes an optional extension into a habit key.
pub fn file_type_key(extension: Option<&str>) -> String {
    extension
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .unwrap_or_default()
}

/// Records `target` for `(file_type, name)`, replacing an earlier habit for
/// the same literal. Returns false when nothing changed.
pub fn record_habit(
    habits: &mut Vec<StringHabit>,
    file_type: &str,
    name: &str,
    target: Language,
    now_ms: i64,
) -> bool {
    match habits.iter_mut().find(|h| h.matches(file_type, name)) {
        Some(habit) if habit.target == target => false,
        Some(habit) => {
            habit.target = target;
            habit.recorded_ms = now_ms;
            true
        }
        None => {
            habits.push(StringHabit {
                file_type: file_type.to_string(),
                name: name.to_string(),
                target,
                recorded_ms: now_ms,
            });
            true
        }
    }
}

/// A string rule with its name pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledStringRule {
    rule: StringRule,
    name: Regex,
}

impl CompiledStringRule {
    pub fn compile(rule: StringRule) -> Result<Self, RuleError> {
        let name = glob_regex(&rule.name).map_err(|source| RuleError::InvalidPattern {
            rule: rule.name.clone(),
            side: "name",
            source,
        })?;
        Ok(Self { rule, name })
    }

    pub fn target(&self) -> Language {
        self.rule.target
    }

    pub fn matches(&self, file_type: &str, name: &str) -> bool {
        if !self.rule.enabled {
            return false;
        }
        if !self.rule.file_types.is_empty()
            && !self
                .rule
                .file_types
                .iter()
                .any(|ft| ft.trim_start_matches('.').eq_ignore_ascii_case(file_type))
        {
            return false;
        }
        self.name.is_match(name)
    }
}

/// Compiles every rule, failing on the first bad one.
pub fn compile_string_rules(rules: &[StringRule]) -> Result<Vec<CompiledStringRule>, RuleError> {
    rules.iter().cloned().map(CompiledStringRule::compile).collect()
}

/// Target for a named literal: a matching habit first, then the first
/// matching rule.
pub fn string_target(
    habits: &[StringHabit],
    rules: &[CompiledStringRule],
    file_type: &str,
    name: &str,
) -> Option<Language> {
    if let Some(habit) = habits.iter().find(|h| h.matches(file_type, name)) {
        tracing::debug!(name, target = %habit.target, "string habit applies");
        return Some(habit.target);
    }
    rules
        .iter()
        .find(|rule| rule.matches(file_type, name))
        .map(CompiledStringRule::target)
}

fn glob_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?i)^{body}$"))
}
