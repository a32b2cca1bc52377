//! Running tools and helpers, and finding them on disk.
//!
//! Processes are started without a shell and waited on without a timeout;
//! the tool or helper is trusted to terminate.

use crate::error::{SwitchError, SwitchResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// File name of the bundled switcher helper.
pub const HELPER_NAME: &str = "inputshift-helper";

/// Extra directories searched for external tools, after `PATH`.
/// GUI apps on macOS start with a minimal `PATH` that misses Homebrew.
pub const EXTRA_TOOL_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin"];

/// Captured result of one process run.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Run `program` with `args` and wait for it to exit.
pub fn run<I, S>(program: &Path, args: I) -> SwitchResult<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = Instant::now();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| SwitchError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    let result = ProcessOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_ms: saturating_millis(start.elapsed()),
    };

    debug!(
        program = %program.display(),
        exit_code = ?result.exit_code,
        duration_ms = result.duration_ms,
        "process finished"
    );

    Ok(result)
}

/// True for a regular file we are allowed to execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Resolve a tool name the way a login shell would, plus [`EXTRA_TOOL_DIRS`].
///
/// Names containing a path separator are checked as given.
pub fn find_tool(name: &str) -> Option<PathBuf> {
    let path_dirs = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect::<Vec<_>>())
        .unwrap_or_default();
    let extra = EXTRA_TOOL_DIRS.iter().map(PathBuf::from);
    find_tool_in(name, path_dirs.into_iter().chain(extra))
}

pub fn find_tool_in<I>(name: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    if name.trim().is_empty() {
        return None;
    }

    let as_path = Path::new(name);
    if as_path.components().count() > 1 {
        return is_executable(as_path).then(|| as_path.to_path_buf());
    }

    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Locate the switcher helper.
///
/// Order: the configured path, then [`HELPER_NAME`] next to the running
/// executable, then `<data dir>/inputshift/bin/`.
pub fn locate_helper(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "configured helper is missing or not executable");
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(HELPER_NAME)));
    let in_data_dir = dirs::data_dir().map(|d| d.join("inputshift").join("bin").join(HELPER_NAME));

    beside_exe
        .into_iter()
        .chain(in_data_dir)
        .find(|candidate| is_executable(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_millis() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }
}
