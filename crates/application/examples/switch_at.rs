//! Example: Evaluate one cursor position end to end and switch for real.
//!
//! Run with: cargo run -p inputshift-application --example switch_at -- <path> <offset> [settings.json]
//!
//! Uses the strategy from the settings file (or the defaults) and logs
//! every emitted event.

use anyhow::{bail, Context, Result};
use inputshift_application::{init_logging, Settings, SwitchCoordinator};
use inputshift_context::classify;
use inputshift_events::{EventBusRef, LogEventBus};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(offset)) = (args.next(), args.next()) else {
        bail!("usage: switch_at <path> <offset> [settings.json]");
    };
    let offset: usize = offset.parse().context("offset must be a byte offset")?;

    let settings = match args.next().map(PathBuf::from).or_else(Settings::default_path) {
        Some(settings_path) => Settings::load_or_default(&settings_path),
        None => Settings::default(),
    };

    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;

    let bus: EventBusRef = Arc::new(LogEventBus);
    let coordinator = SwitchCoordinator::from_settings(settings, bus)?;

    println!("context: {}", classify(&text, offset));
    let outcome = coordinator.evaluate_cursor(&text, offset, Some(path.as_str()));
    println!("outcome: {} ({})", outcome.status, outcome.message);
    if let Some(language) = outcome.actual_language {
        println!("now:     {language}");
    }

    Ok(())
}
