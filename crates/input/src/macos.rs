//! ApplicationServices trust check and the Accessibility settings deep link.

use std::process::Command;

const ACCESSIBILITY_PANE: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

pub(crate) fn process_is_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

pub(crate) fn open_accessibility_pane() {
    match Command::new("open").arg(ACCESSIBILITY_PANE).spawn() {
        Ok(_) => tracing::debug!("opened accessibility settings"),
        Err(e) => tracing::warn!(error = %e, "failed to open accessibility settings"),
    }
}
