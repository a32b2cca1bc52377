//! Client for the bundled switcher helper.
//!
//! The helper is a small precompiled binary with subcommands:
//!
//! | subcommand | stdout |
//! |---|---|
//! | `current` | active input-source id |
//! | `isTargetLanguage <id>` | `true` or `false` |
//! | `switch <id>` | `SUCCESS` or `ERROR: <reason>` |
//! | `shortcut <modifiers> <keycode>` | `SUCCESS` or `ERROR: <reason>` |

use crate::error::{SwitchError, SwitchResult};
use crate::process::{self, ProcessOutput, HELPER_NAME};
use inputshift_input::{ChordSender, InputError, KeyChord};
use std::path::{Path, PathBuf};

/// Line printed by the helper when an action completed.
pub const SUCCESS_TOKEN: &str = "SUCCESS";

/// Prefix of the line printed by the helper when an action failed.
pub const ERROR_PREFIX: &str = "ERROR:";

#[derive(Debug, Clone)]
pub struct HelperClient {
    path: PathBuf,
}

impl HelperClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Find the helper via [`process::locate_helper`].
    pub fn locate(configured: Option<&Path>) -> Option<Self> {
        process::locate_helper(configured).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id of the active input source.
    pub fn current(&self) -> SwitchResult<String> {
        self.query(&["current"])
    }

    /// Whether `id` belongs to the alternate (non-Latin) language.
    pub fn is_target_language(&self, id: &str) -> SwitchResult<bool> {
        let answer = self.query(&["isTargetLanguage", id])?;
        match answer.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(SwitchError::Execution(format!(
                "unexpected isTargetLanguage answer '{other}'"
            ))),
        }
    }

    pub fn switch(&self, id: &str) -> SwitchResult<()> {
        let output = process::run(&self.path, ["switch", id])?;
        parse_status(&output)
    }

    pub fn shortcut(&self, chord: &KeyChord) -> SwitchResult<()> {
        let keycode = chord.keycode.to_string();
        let modifiers = chord.modifier_list();
        let output = process::run(&self.path, ["shortcut", modifiers.as_str(), keycode.as_str()])?;
        parse_status(&output)
    }

    fn query(&self, args: &[&str]) -> SwitchResult<String> {
        let output = process::run(&self.path, args)?;
        if let Some(reason) = error_line(&output) {
            return Err(SwitchError::Execution(reason));
        }
        if !output.success {
            return Err(exit_failure(&output));
        }
        let answer = output.stdout.trim();
        if answer.is_empty() {
            return Err(SwitchError::Execution(format!(
                "helper '{}' printed nothing",
                args.first().copied().unwrap_or_default()
            )));
        }
        Ok(answer.to_string())
    }
}

/// Error for a strategy that needs the helper when none was found.
pub fn helper_unavailable() -> SwitchError {
    let install_dir = dirs::data_dir()
        .map(|d| d.join("inputshift").join("bin").display().to_string())
        .unwrap_or_else(|| "the application data directory".to_string());
    SwitchError::Unavailable {
        what: format!("switcher helper '{HELPER_NAME}'"),
        guidance: format!(
            "install it into {install_dir} or set strategy.helper_path in settings"
        ),
    }
}

/// Interpret the output of an action subcommand.
pub fn parse_status(output: &ProcessOutput) -> SwitchResult<()> {
    if let Some(reason) = error_line(output) {
        return Err(SwitchError::Execution(reason));
    }
    if !output.success {
        return Err(exit_failure(output));
    }
    if output.stdout.lines().any(|line| line.trim() == SUCCESS_TOKEN) {
        return Ok(());
    }
    Err(SwitchError::Execution(format!(
        "helper did not report {SUCCESS_TOKEN}: '{}'",
        truncate(output.stdout.trim(), 120)
    )))
}

fn error_line(output: &ProcessOutput) -> Option<String> {
    output
        .stdout
        .lines()
        .chain(output.stderr.lines())
        .map(str::trim)
        .find_map(|line| line.strip_prefix(ERROR_PREFIX))
        .map(|reason| reason.trim().to_string())
}

fn exit_failure(output: &ProcessOutput) -> SwitchError {
    let stderr = output.stderr.trim();
    match output.exit_code {
        Some(code) if stderr.is_empty() => {
            SwitchError::Execution(format!("helper exited with code {code}"))
        }
        Some(code) => SwitchError::Execution(format!(
            "helper exited with code {code}: {}",
            truncate(stderr, 120)
        )),
        None => SwitchError::Execution("helper terminated by signal".to_string()),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Posts chords through the helper's `shortcut` subcommand.
#[derive(Debug, Clone)]
pub struct HelperChordSender {
    helper: HelperClient,
}

impl HelperChordSender {
    pub fn new(helper: HelperClient) -> Self {
        Self { helper }
    }
}

impl ChordSender for HelperChordSender {
    fn send(&self, chord: &KeyChord) -> Result<(), InputError> {
        self.helper
            .shortcut(chord)
            .map_err(|e| InputError::KeyFailed(e.to_string()))
    }
}
