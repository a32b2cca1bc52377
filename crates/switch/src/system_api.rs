//! Switching by id through the helper.

use crate::config::StrategyKind;
use crate::error::SwitchResult;
use crate::helper::{helper_unavailable, HelperClient};
use crate::process::saturating_millis;
use crate::switcher::InputSourceSwitcher;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SystemApi {
    helper: Option<HelperClient>,
    settle: Duration,
}

impl SystemApi {
    /// `helper` is `None` when discovery failed; every call then reports
    /// the helper as unavailable.
    pub fn new(helper: Option<HelperClient>, settle: Duration) -> Self {
        Self { helper, settle }
    }

    fn helper(&self) -> SwitchResult<&HelperClient> {
        self.helper.as_ref().ok_or_else(helper_unavailable)
    }
}

impl InputSourceSwitcher for SystemApi {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SystemApi
    }

    fn current(&self) -> SwitchResult<String> {
        self.helper()?.current()
    }

    fn switch_to(&self, id: &str) -> SwitchResult<()> {
        self.helper()?.switch(id)?;
        debug!(id, settle_ms = saturating_millis(self.settle), "helper switched source");
        if !self.settle.is_zero() {
            std::thread::sleep(self.settle);
        }
        Ok(())
    }

    fn is_native_source(&self, id: &str) -> SwitchResult<Option<bool>> {
        self.helper()?.is_target_language(id).map(Some)
    }
}
