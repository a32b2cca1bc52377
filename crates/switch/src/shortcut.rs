//! Switching by pressing the OS "select previous input source" shortcut.
//!
//! The shortcut only toggles between the two most recently used sources.
//! With exactly two sources installed that is the same as selecting the
//! target; with more, the toggle may land elsewhere. This is a known
//! limitation of the mechanism: the switch is reported successful and a
//! warning is logged when the follow-up query disagrees.

use crate::config::StrategyKind;
use crate::error::SwitchResult;
use crate::helper::{helper_unavailable, HelperClient};
use crate::switcher::InputSourceSwitcher;
use inputshift_input::{ChordSender, KeyChord};
use std::time::Duration;
use tracing::{debug, warn};

pub struct ShortcutFallback {
    helper: Option<HelperClient>,
    sender: Box<dyn ChordSender>,
    chord: KeyChord,
    settle: Duration,
}

impl ShortcutFallback {
    pub fn new(
        helper: Option<HelperClient>,
        sender: Box<dyn ChordSender>,
        chord: KeyChord,
        settle: Duration,
    ) -> Self {
        Self {
            helper,
            sender,
            chord,
            settle,
        }
    }

    pub fn chord(&self) -> &KeyChord {
        &self.chord
    }

    fn helper(&self) -> SwitchResult<&HelperClient> {
        self.helper.as_ref().ok_or_else(helper_unavailable)
    }
}

impl std::fmt::Debug for ShortcutFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcutFallback")
            .field("helper", &self.helper)
            .field("chord", &self.chord)
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

impl InputSourceSwitcher for ShortcutFallback {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ShortcutFallback
    }

    fn current(&self) -> SwitchResult<String> {
        self.helper()?.current()
    }

    fn switch_to(&self, id: &str) -> SwitchResult<()> {
        let before = self.current()?;
        if before == id {
            debug!(id, "already on target, shortcut not sent");
            return Ok(());
        }

        self.sender.send(&self.chord)?;
        if !self.settle.is_zero() {
            std::thread::sleep(self.settle);
        }

        match self.current() {
            Ok(after) if after != id => {
                warn!(
                    target_id = id,
                    landed = %after,
                    chord = %self.chord,
                    "toggle shortcut landed on another source; it only alternates between two"
                );
            }
            Ok(_) => debug!(id, "switched with toggle shortcut"),
            Err(e) => debug!(error = %e, "could not confirm source after shortcut"),
        }
        Ok(())
    }

    fn is_native_source(&self, id: &str) -> SwitchResult<Option<bool>> {
        self.helper()?.is_target_language(id).map(Some)
    }
}
