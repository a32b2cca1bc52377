//! Whether this process may post synthetic key events.

use std::fmt;

/// Permission state for posting key events system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventAccess {
    Granted,
    /// macOS has not listed this process under Privacy > Accessibility.
    Missing,
    /// The platform has no such permission.
    NotRequired,
}

impl KeyEventAccess {
    pub fn allows_posting(self) -> bool {
        !matches!(self, KeyEventAccess::Missing)
    }
}

impl fmt::Display for KeyEventAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyEventAccess::Granted => "granted",
            KeyEventAccess::Missing => "missing",
            KeyEventAccess::NotRequired => "not_required",
        })
    }
}

/// Current permission state. Never prompts.
pub fn key_event_access() -> KeyEventAccess {
    #[cfg(target_os = "macos")]
    {
        if crate::macos::process_is_trusted() {
            KeyEventAccess::Granted
        } else {
            KeyEventAccess::Missing
        }
    }
    #[cfg(not(target_os = "macos"))]
    {
        KeyEventAccess::NotRequired
    }
}

/// Like [`key_event_access`], but opens the Accessibility settings pane
/// when access is missing. A grant only takes effect after a restart, so
/// the result stays `Missing` for the rest of this run.
pub fn request_key_event_access() -> KeyEventAccess {
    let access = key_event_access();
    if access == KeyEventAccess::Missing {
        tracing::warn!("key events need Accessibility permission; opening System Settings");
        #[cfg(target_os = "macos")]
        crate::macos::open_accessibility_pane();
    }
    access
}
