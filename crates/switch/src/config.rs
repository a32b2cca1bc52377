//! Strategy selection and tuning.

use inputshift_input::{KeyChord, Modifier, KEYCODE_SPACE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default external switching tool.
pub const DEFAULT_TOOL: &str = "im-select";

/// Pause after a helper `switch` so the menu-bar indicator catches up.
pub const DEFAULT_SYSTEM_API_SETTLE_MS: u64 = 90;

/// Pause after a toggle shortcut so the OS finishes cycling sources.
pub const DEFAULT_SHORTCUT_SETTLE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Separately installed command-line tool (`im-select`).
    ExternalTool,
    /// Bundled helper selecting the source by id.
    #[default]
    SystemApi,
    /// Helper for queries, a toggle shortcut for the switch itself.
    ShortcutFallback,
}

impl StrategyKind {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::ExternalTool => "external tool",
            StrategyKind::SystemApi => "system API",
            StrategyKind::ShortcutFallback => "shortcut fallback",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Who posts the toggle chord for [`StrategyKind::ShortcutFallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChordSenderKind {
    /// The helper's `shortcut <modifiers> <keycode>` subcommand.
    #[default]
    Helper,
    /// Key events posted from this process.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub modifiers: Vec<Modifier>,
    pub keycode: u32,
    pub sender: ChordSenderKind,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            modifiers: vec![Modifier::Control],
            keycode: KEYCODE_SPACE,
            sender: ChordSenderKind::Helper,
        }
    }
}

impl ShortcutConfig {
    pub fn chord(&self) -> KeyChord {
        KeyChord::new(self.modifiers.clone(), self.keycode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    pub kind: StrategyKind,

    /// Name or absolute path of the external tool.
    pub tool: String,

    /// Explicit helper location. Discovered when unset.
    pub helper_path: Option<PathBuf>,

    pub shortcut: ShortcutConfig,
    pub system_api_settle_ms: u64,
    pub shortcut_settle_ms: u64,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::default(),
            tool: DEFAULT_TOOL.to_string(),
            helper_path: None,
            shortcut: ShortcutConfig::default(),
            system_api_settle_ms: DEFAULT_SYSTEM_API_SETTLE_MS,
            shortcut_settle_ms: DEFAULT_SHORTCUT_SETTLE_MS,
        }
    }
}
