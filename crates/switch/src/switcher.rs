//! The strategy seam and the closed set of strategies.

use crate::config::{ChordSenderKind, StrategyKind, SwitchConfig};
use crate::error::{SwitchError, SwitchResult};
use crate::external::ExternalTool;
use crate::helper::{HelperChordSender, HelperClient};
use crate::shortcut::ShortcutFallback;
use crate::system_api::SystemApi;
use inputshift_input::{request_key_event_access, ChordSender, EnigoChordSender};
use std::sync::Arc;
use std::time::Duration;

/// A mechanism that can report and change the active input source.
///
/// Every method blocks for the duration of an external call and must be
/// called off any UI thread.
pub trait InputSourceSwitcher: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Platform id of the active input source.
    fn current(&self) -> SwitchResult<String>;

    /// Make `id` the active input source.
    fn switch_to(&self, id: &str) -> SwitchResult<()>;

    /// Whether `id` is an alternate-language source, when the mechanism can
    /// tell. `Ok(None)` means "cannot tell".
    fn is_native_source(&self, _id: &str) -> SwitchResult<Option<bool>> {
        Ok(None)
    }
}

/// Type alias for a shared switcher.
pub type SwitcherRef = Arc<dyn InputSourceSwitcher>;

/// The configured strategy, chosen once from [`SwitchConfig`].
#[derive(Debug)]
pub enum Switcher {
    ExternalTool(ExternalTool),
    SystemApi(SystemApi),
    ShortcutFallback(ShortcutFallback),
    /// The requested kind does not exist on this platform.
    Unsupported(StrategyKind),
}

impl Switcher {
    pub fn from_config(config: &SwitchConfig) -> Self {
        match config.kind {
            StrategyKind::ExternalTool => Switcher::ExternalTool(ExternalTool::new(&config.tool)),
            kind if !cfg!(target_os = "macos") => {
                tracing::warn!(%kind, platform = std::env::consts::OS, "strategy not available on this platform");
                Switcher::Unsupported(kind)
            }
            StrategyKind::SystemApi => {
                let helper = locate_helper(config);
                Switcher::SystemApi(SystemApi::new(
                    helper,
                    Duration::from_millis(config.system_api_settle_ms),
                ))
            }
            StrategyKind::ShortcutFallback => {
                let helper = locate_helper(config);
                // Without a helper the current-source query fails first, so
                // the sender choice only matters when one was found.
                let sender: Box<dyn ChordSender> = match (config.shortcut.sender, &helper) {
                    (ChordSenderKind::Helper, Some(h)) => Box::new(HelperChordSender::new(h.clone())),
                    _ => native_sender(),
                };
                Switcher::ShortcutFallback(ShortcutFallback::new(
                    helper,
                    sender,
                    config.shortcut.chord(),
                    Duration::from_millis(config.shortcut_settle_ms),
                ))
            }
        }
    }

    fn unsupported(kind: StrategyKind) -> SwitchError {
        SwitchError::UnsupportedPlatform {
            kind,
            platform: std::env::consts::OS,
        }
    }
}

/// The enigo sender. Opens the Accessibility pane when key events are not
/// yet permitted.
fn native_sender() -> Box<dyn ChordSender> {
    let access = request_key_event_access();
    if access.allows_posting() {
        tracing::debug!(%access, "native chord sender ready");
    } else {
        tracing::warn!(%access, "shortcut switching will fail until access is granted and the app restarts");
    }
    Box::new(EnigoChordSender::new())
}

fn locate_helper(config: &SwitchConfig) -> Option<HelperClient> {
    let helper = HelperClient::locate(config.helper_path.as_deref());
    match &helper {
        Some(h) => tracing::info!(path = %h.path().display(), "using switcher helper"),
        None => tracing::warn!("switcher helper not found"),
    }
    helper
}

impl InputSourceSwitcher for Switcher {
    fn kind(&self) -> StrategyKind {
        match self {
            Switcher::ExternalTool(s) => s.kind(),
            Switcher::SystemApi(s) => s.kind(),
            Switcher::ShortcutFallback(s) => s.kind(),
            Switcher::Unsupported(kind) => *kind,
        }
    }

    fn current(&self) -> SwitchResult<String> {
        match self {
            Switcher::ExternalTool(s) => s.current(),
            Switcher::SystemApi(s) => s.current(),
            Switcher::ShortcutFallback(s) => s.current(),
            Switcher::Unsupported(kind) => Err(Self::unsupported(*kind)),
        }
    }

    fn switch_to(&self, id: &str) -> SwitchResult<()> {
        match self {
            Switcher::ExternalTool(s) => s.switch_to(id),
            Switcher::SystemApi(s) => s.switch_to(id),
            Switcher::ShortcutFallback(s) => s.switch_to(id),
            Switcher::Unsupported(kind) => Err(Self::unsupported(*kind)),
        }
    }

    fn is_native_source(&self, id: &str) -> SwitchResult<Option<bool>> {
        match self {
            Switcher::ExternalTool(s) => s.is_native_source(id),
            Switcher::SystemApi(s) => s.is_native_source(id),
            Switcher::ShortcutFallback(s) => s.is_native_source(id),
            Switcher::Unsupported(kind) => Err(Self::unsupported(*kind)),
        }
    }
}
