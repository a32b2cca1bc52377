//! Orchestration layer for inputshift.
//!
//! Editor events flow through here:
//!
//! ```text
//! editor event ─► EditorSession ─► EventDebouncer (per session)
//!                                        │ fires on the session worker
//!                                        ▼
//!                  classify ─► SwitchCoordinator ─► InputSourceSwitcher
//!                                        │
//!                                        └─► EventBus (switch:outcome)
//! ```
//!
//! Scene collaborators (commit dialog, tool windows) and host focus
//! callbacks talk to the [`SwitchCoordinator`] directly.

mod constants;
mod cooldown;
mod coordinator;
mod debounce;
mod logging;
mod scene;
mod session;
mod settings;

pub use constants::*;
pub use cooldown::{CachedSource, CooldownState, SourceCache};
pub use coordinator::{SwitchCoordinator, SwitchOutcome, SwitchRequest};
pub use debounce::EventDebouncer;
pub use logging::{init_logging, DEFAULT_LOG_FILTER};
pub use scene::SceneArbiter;
pub use session::{CursorSnapshot, EditorSession, TriggerSource};
pub use settings::{
    ConfigError, ContextTargets, FileTypeRule, InputSources, LeaveStrategy, SceneTargets,
    Settings, TimingConfig, ToolWindowRule,
};
