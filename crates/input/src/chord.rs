//! Modifier + keycode chords.
//!
//! A chord is what the OS binds to "select the previous input source"
//! (Control+Space by default on macOS). Keycodes are raw virtual keycodes,
//! not characters, so a chord survives whatever layout is active.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Virtual keycode of the space bar on macOS.
pub const KEYCODE_SPACE: u32 = 49;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Control,
    Option,
    Command,
    Shift,
}

impl Modifier {
    /// Name understood by the switcher helper's `shortcut` subcommand.
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Control => "control",
            Modifier::Option => "option",
            Modifier::Command => "command",
            Modifier::Shift => "shift",
        }
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Modifier {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control" | "ctrl" => Ok(Modifier::Control),
            "option" | "alt" | "opt" => Ok(Modifier::Option),
            "command" | "cmd" | "meta" => Ok(Modifier::Command),
            "shift" => Ok(Modifier::Shift),
            other => Err(InputError::InvalidChord(format!("unknown modifier '{other}'"))),
        }
    }
}

/// A set of modifiers held while one key is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyChord {
    pub modifiers: Vec<Modifier>,
    pub keycode: u32,
}

impl Default for KeyChord {
    fn default() -> Self {
        Self {
            modifiers: vec![Modifier::Control],
            keycode: KEYCODE_SPACE,
        }
    }
}

impl KeyChord {
    pub fn new(modifiers: Vec<Modifier>, keycode: u32) -> Self {
        Self { modifiers, keycode }
    }

    /// Parse a comma-separated modifier list such as `"control,option"`.
    pub fn parse(modifiers: &str, keycode: u32) -> Result<Self, InputError> {
        let modifiers = modifiers
            .split(',')
            .filter(|m| !m.trim().is_empty())
            .map(Modifier::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { modifiers, keycode })
    }

    /// Comma-separated modifier names, as passed to the helper.
    pub fn modifier_list(&self) -> String {
        self.modifiers
            .iter()
            .map(Modifier::name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m)?;
        }
        write!(f, "#{}", self.keycode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        let chord = KeyChord::parse("ctrl, Alt,cmd,shift", 49).unwrap();
        assert_eq!(
            chord.modifiers,
            vec![
                Modifier::Control,
                Modifier::Option,
                Modifier::Command,
                Modifier::Shift
            ]
        );
        assert_eq!(chord.modifier_list(), "control,option,command,shift");
    }

    #[test]
    fn test_parse_rejects_unknown_modifier() {
        let err = KeyChord::parse("control,hyper", 49).unwrap_err();
        assert!(matches!(err, InputError::InvalidChord(_)));
    }

    #[test]
    fn test_default_is_control_space() {
        let chord = KeyChord::default();
        assert_eq!(chord.to_string(), "control+#49");
    }

    #[test]
    fn test_serde_shape() {
        let chord: KeyChord =
            serde_json::from_str(r#"{"modifiers": ["option"], "keycode": 50}"#).unwrap();
        assert_eq!(chord, KeyChord::new(vec![Modifier::Option], 50));
    }
}
