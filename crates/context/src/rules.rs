//! User-defined cursor pattern rules.
//!
//! A rule looks at the current line split at the cursor and, when its
//! regular expressions match, forces a target language regardless of the
//! classified context. Rules are evaluated in order; the first match wins.

use crate::kind::ContextKind;
use crate::language::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How the left and right patterns combine when both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    #[default]
    Both,
    Either,
}

/// Serializable rule definition, as stored in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternRule {
    pub enabled: bool,
    pub name: String,

    /// File extensions the rule applies to. Empty means all files.
    pub file_types: Vec<String>,

    /// Context kinds the rule applies to. Empty means all kinds.
    pub areas: Vec<ContextKind>,

    /// Matched against the line text left of the cursor.
    pub left_pattern: String,

    /// Matched against the line text right of the cursor.
    pub right_pattern: String,

    pub strategy: MatchStrategy,
    pub target: Language,
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            enabled: true,
            name: String::new(),
            file_types: Vec::new(),
            areas: Vec::new(),
            left_pattern: String::new(),
            right_pattern: String::new(),
            strategy: MatchStrategy::Both,
            target: Language::English,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule '{rule}': invalid {side} pattern: {source}")]
    InvalidPattern {
        rule: String,
        side: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// What a rule is matched against.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub left: &'a str,
    pub right: &'a str,
    pub extension: Option<&'a str>,
    pub kind: ContextKind,
}

impl<'a> RuleInput<'a> {
    /// Splits the line containing `offset` at the cursor.
    pub fn at_cursor(
        text: &'a str,
        offset: usize,
        extension: Option<&'a str>,
        kind: ContextKind,
    ) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
        Self {
            left: text[start..offset].trim_end_matches('\r'),
            right: text[offset..end].trim_end_matches('\r'),
            extension,
            kind,
        }
    }
}

/// A rule with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: PatternRule,
    left: Option<Regex>,
    right: Option<Regex>,
}

impl CompiledRule {
    pub fn compile(rule: PatternRule) -> Result<Self, RuleError> {
        let left = compile_side(&rule.name, "left", &rule.left_pattern)?;
        let right = compile_side(&rule.name, "right", &rule.right_pattern)?;
        Ok(Self { rule, left, right })
    }

    pub fn name(&self) -> &str {
        &self.rule.name
    }

    pub fn target(&self) -> Language {
        self.rule.target
    }

    pub fn matches(&self, input: &RuleInput<'_>) -> bool {
        if !self.rule.enabled {
            return false;
        }

        if !self.rule.file_types.is_empty() {
            let Some(ext) = input.extension else {
                return false;
            };
            if !self
                .rule
                .file_types
                .iter()
                .any(|ft| ft.trim_start_matches('.').eq_ignore_ascii_case(ext))
            {
                return false;
            }
        }

        if !self.rule.areas.is_empty() && !self.rule.areas.contains(&input.kind) {
            return false;
        }

        let left = self.left.as_ref().map(|re| re.is_match(input.left));
        let right = self.right.as_ref().map(|re| re.is_match(input.right));

        match (left, right) {
            (None, None) => false,
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (Some(l), Some(r)) => match self.rule.strategy {
                MatchStrategy::Both => l && r,
                MatchStrategy::Either => l || r,
            },
        }
    }
}

fn compile_side(rule: &str, side: &'static str, pattern: &str) -> Result<Option<Regex>, RuleError> {
    if pattern.trim().is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| RuleError::InvalidPattern {
            rule: rule.to_string(),
            side,
            source,
        })
}

/// Ordered set of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn compile(rules: &[PatternRule]) -> Result<Self, RuleError> {
        let rules = rules
            .iter()
            .cloned()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// First enabled rule matching the input.
    pub fn first_match(&self, input: &RuleInput<'_>) -> Option<&CompiledRule> {
        let hit = self.rules.iter().find(|rule| rule.matches(input));
        if let Some(rule) = hit {
            tracing::debug!(rule = rule.name(), target = %rule.target(), "pattern rule matched");
        }
        hit
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
