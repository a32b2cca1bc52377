//! Switching through a separately installed command-line tool.
//!
//! The tool follows the `im-select` convention: with no argument it prints
//! the active input-source id, with an id argument it selects that source
//! and reports success through its exit code.

use crate::config::StrategyKind;
use crate::error::{SwitchError, SwitchResult};
use crate::process;
use crate::switcher::InputSourceSwitcher;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ExternalTool {
    tool: String,
}

impl ExternalTool {
    /// `tool` is a bare name looked up on `PATH`, or a path.
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Resolved each call so a tool installed while running is picked up.
    fn program(&self) -> SwitchResult<PathBuf> {
        process::find_tool(&self.tool).ok_or_else(|| SwitchError::Unavailable {
            what: format!("input method tool '{}'", self.tool),
            guidance: format!(
                "install it (for im-select: `brew tap daipeihust/tap && brew install im-select`) \
                 or set strategy.tool to its full path; searched PATH and {}",
                process::EXTRA_TOOL_DIRS.join(", ")
            ),
        })
    }
}

impl InputSourceSwitcher for ExternalTool {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExternalTool
    }

    fn current(&self) -> SwitchResult<String> {
        let program = self.program()?;
        let output = process::run(&program, std::iter::empty::<&str>())?;
        let id = output.stdout.trim();
        if !output.success || id.is_empty() {
            return Err(SwitchError::Execution(format!(
                "'{}' could not report the current source (exit code {:?})",
                self.tool, output.exit_code
            )));
        }
        Ok(id.to_string())
    }

    fn switch_to(&self, id: &str) -> SwitchResult<()> {
        let program = self.program()?;
        let output = process::run(&program, [id])?;
        if output.success {
            debug!(tool = %self.tool, id, "switched with external tool");
            return Ok(());
        }
        Err(SwitchError::Execution(format!(
            "'{}' exited with code {:?}: {}",
            self.tool,
            output.exit_code,
            output.stderr.trim()
        )))
    }
}
