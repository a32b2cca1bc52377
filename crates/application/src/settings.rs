//! User settings.
//!
//! Stored as JSON at `<config dir>/inputshift/settings.json`. Every field
//! has a default, so partial files (or files written by older versions)
//! load cleanly.

use crate::constants::*;
use inputshift_context::{
    compile_string_rules, record_habit, CompiledStringRule, ContextKind, Language, PatternRule,
    Preference, RuleError, RuleSet, Scene, StringHabit, StringRule,
};
use inputshift_switch::SwitchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    InvalidPattern(#[from] RuleError),
    #[error("timing.{field} must be between 1 and {max} ms, got {value}")]
    InvalidTiming {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("no configuration directory on this platform")]
    NoConfigDir,
}

/// Per-context preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextTargets {
    pub code: Preference,
    pub comment: Preference,
    pub string: Preference,
    pub unknown: Preference,
}

impl Default for ContextTargets {
    fn default() -> Self {
        Self {
            code: Preference::English,
            comment: Preference::Native,
            string: Preference::Native,
            unknown: Preference::Auto,
        }
    }
}

impl ContextTargets {
    pub fn for_kind(&self, kind: ContextKind) -> Preference {
        match kind {
            ContextKind::Code => self.code,
            ContextKind::Comment => self.comment,
            ContextKind::String => self.string,
            ContextKind::Unknown => self.unknown,
        }
    }
}

/// Per-scene preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTargets {
    pub commit: Preference,
    pub tool_window: Preference,
}

impl Default for SceneTargets {
    fn default() -> Self {
        Self {
            commit: Preference::Native,
            tool_window: Preference::Auto,
        }
    }
}

impl SceneTargets {
    pub fn for_scene(&self, scene: Scene) -> Preference {
        match scene {
            Scene::Commit => self.commit,
            Scene::ToolWindow => self.tool_window,
        }
    }
}

/// Platform identifiers for the two logical languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSources {
    pub english: String,
    pub native: String,
}

impl Default for InputSources {
    fn default() -> Self {
        Self {
            english: DEFAULT_ENGLISH_SOURCE.to_string(),
            native: DEFAULT_NATIVE_SOURCE.to_string(),
        }
    }
}

impl InputSources {
    pub fn id_for(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Native => &self.native,
        }
    }

    /// Exact-match lookup; `None` for ids configured for neither language.
    pub fn language_of(&self, id: &str) -> Option<Language> {
        if id == self.english {
            Some(Language::English)
        } else if id == self.native {
            Some(Language::Native)
        } else {
            None
        }
    }
}

/// Overrides the code preference for one file extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTypeRule {
    /// Extension without the dot, e.g. `"md"`.
    pub extension: String,
    pub enabled: bool,
    pub target: Preference,
}

impl Default for FileTypeRule {
    fn default() -> Self {
        Self {
            extension: String::new(),
            enabled: true,
            target: Preference::Auto,
        }
    }
}

impl FileTypeRule {
    pub fn matches(&self, extension: &str) -> bool {
        self.enabled
            && self
                .extension
                .trim_start_matches('.')
                .eq_ignore_ascii_case(extension)
    }
}

/// Preference for one auxiliary panel, keyed by its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolWindowRule {
    pub id: String,
    pub enabled: bool,
    pub target: Preference,
}

impl Default for ToolWindowRule {
    fn default() -> Self {
        Self {
            id: String::new(),
            enabled: true,
            target: Preference::Auto,
        }
    }
}

/// What to do with the input source when the host application loses focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStrategy {
    /// Go back to whatever was active when the application gained focus.
    #[default]
    RestorePrevious,
    English,
    Native,
    NoChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub cooldown_ms: u64,
    pub grace_ms: u64,
    pub current_cache_ms: u64,
    pub edit_delay_ms: u64,
    pub caret_delay_ms: u64,
    pub activation_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            grace_ms: DEFAULT_GRACE_MS,
            current_cache_ms: DEFAULT_CURRENT_CACHE_MS,
            edit_delay_ms: DEFAULT_EDIT_DELAY_MS,
            caret_delay_ms: DEFAULT_CARET_DELAY_MS,
            activation_delay_ms: DEFAULT_ACTIVATION_DELAY_MS,
        }
    }
}

impl TimingConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn current_cache(&self) -> Duration {
        Duration::from_millis(self.current_cache_ms)
    }

    fn fields(&self) -> [(&'static str, u64); 6] {
        [
            ("cooldown_ms", self.cooldown_ms),
            ("grace_ms", self.grace_ms),
            ("current_cache_ms", self.current_cache_ms),
            ("edit_delay_ms", self.edit_delay_ms),
            ("caret_delay_ms", self.caret_delay_ms),
            ("activation_delay_ms", self.activation_delay_ms),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.fields() {
            if value == 0 || value > MAX_TIMING_MS {
                return Err(ConfigError::InvalidTiming {
                    field,
                    value,
                    max: MAX_TIMING_MS,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    pub targets: ContextTargets,
    pub scenes: SceneTargets,
    pub input_sources: InputSources,
    pub file_type_rules: Vec<FileTypeRule>,
    pub pattern_rules: Vec<PatternRule>,
    pub tool_window_rules: Vec<ToolWindowRule>,
    pub strategy: SwitchConfig,
    pub timing: TimingConfig,
    pub leave_app: LeaveStrategy,
    pub show_comment_hint: bool,
    /// Pick English or native for a literal by what is already typed in it.
    pub follow_string_content: bool,
    pub string_rules: Vec<StringRule>,
    /// Remember the language the user switches to inside a named literal.
    pub learn_string_habits: bool,
    pub string_habits: Vec<StringHabit>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            targets: ContextTargets::default(),
            scenes: SceneTargets::default(),
            input_sources: InputSources::default(),
            file_type_rules: Vec::new(),
            pattern_rules: Vec::new(),
            tool_window_rules: Vec::new(),
            strategy: SwitchConfig::default(),
            timing: TimingConfig::default(),
            leave_app: LeaveStrategy::default(),
            show_comment_hint: true,
            follow_string_content: true,
            string_rules: Vec::new(),
            learn_string_habits: true,
            string_habits: Vec::new(),
        }
    }
}

impl Settings {
    /// `<config dir>/inputshift/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("inputshift").join("settings.json"))
    }

    /// Read, parse and validate a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Like [`Settings::load`], falling back to defaults when the file is
    /// missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "invalid settings, using defaults");
                Self::default()
            }
        }
    }

    /// Write as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        self.compile_rules()?;
        self.compile_string_rules()?;
        Ok(())
    }

    pub fn compile_rules(&self) -> Result<RuleSet, ConfigError> {
        Ok(RuleSet::compile(&self.pattern_rules)?)
    }

    pub fn compile_string_rules(&self) -> Result<Vec<CompiledStringRule>, ConfigError> {
        Ok(compile_string_rules(&self.string_rules)?)
    }

    /// Remember `target` for the literal `name` in `file_type` files.
    /// Returns false when the same habit was already recorded.
    pub fn record_string_habit(&mut self, file_type: &str, name: &str, target: Language, now_ms: i64) -> bool {
        record_habit(&mut self.string_habits, file_type, name, target, now_ms)
    }

    pub fn clear_string_habits(&mut self) {
        self.string_habits.clear();
    }

    /// Preference from the first enabled file-type rule for `extension`.
    pub fn file_type_target(&self, extension: &str) -> Option<Preference> {
        self.file_type_rules
            .iter()
            .find(|rule| rule.matches(extension))
            .map(|rule| rule.target)
    }

    /// Preference for a tool window: its rule if any, else the scene default.
    pub fn tool_window_target(&self, id: &str) -> Preference {
        self.tool_window_rules
            .iter()
            .find(|rule| rule.enabled && rule.id == id)
            .map(|rule| rule.target)
            .unwrap_or(self.scenes.tool_window)
    }
}
