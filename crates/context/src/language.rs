//! Target languages, per-context preferences, and override scenes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A logical input language. Platform identifiers are resolved from
/// configuration at switch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// The Latin keyboard layout used for code.
    English,

    /// The user's alternate-language input method.
    Native,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Native => "Native",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Configured preference for a context or scene.
///
/// `Auto` means "no explicit preference": the coordinator leaves the
/// input source alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    #[default]
    Auto,
    English,
    Native,
}

impl Preference {
    pub fn language(self) -> Option<Language> {
        match self {
            Preference::Auto => None,
            Preference::English => Some(Language::English),
            Preference::Native => Some(Language::Native),
        }
    }
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preference::Auto => write!(f, "Auto"),
            Preference::English => write!(f, "English"),
            Preference::Native => write!(f, "Native"),
        }
    }
}

impl From<Language> for Preference {
    fn from(language: Language) -> Self {
        match language {
            Language::English => Preference::English,
            Language::Native => Preference::Native,
        }
    }
}

/// Named editing scenes whose focus overrides classifier-driven switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scene {
    /// Composing a commit message.
    Commit,

    /// An auxiliary panel (terminal, search, run console) has focus.
    ToolWindow,
}

impl Scene {
    pub const ALL: [Scene; 2] = [Scene::Commit, Scene::ToolWindow];

    pub fn name(&self) -> &'static str {
        match self {
            Scene::Commit => "commit",
            Scene::ToolWindow => "tool-window",
        }
    }

    /// Dense index for flag storage; stable for the life of the process.
    pub fn index(&self) -> usize {
        match self {
            Scene::Commit => 0,
            Scene::ToolWindow => 1,
        }
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scene: {0}")]
pub struct UnknownScene(pub String);

impl FromStr for Scene {
    type Err = UnknownScene;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scene::ALL
            .iter()
            .copied()
            .find(|scene| scene.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownScene(s.to_string()))
    }
}
