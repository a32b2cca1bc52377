//! Shared event contracts between the switching core and its collaborators.
//!
//! This crate defines the DTOs handed to notification, theming and status
//! collaborators. Using shared types keeps producers and consumers in
//! agreement on field names.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{
    emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, LogEventBus, NullEventBus,
};

use inputshift_context::{ContextKind, Language, Scene};
use serde::{Deserialize, Serialize};

/// How a coordination decision ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchStatus {
    /// No preference, plugin disabled, or suppressed by an active scene.
    Skipped,
    /// The input source already matched the target; nothing dispatched.
    AlreadyCorrect,
    /// Same target switched to within the cooldown window; nothing dispatched.
    Cooled,
    /// The strategy reported success.
    Switched,
    /// The strategy failed or is unavailable.
    Failed,
}

impl SwitchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SwitchStatus::Skipped => "skipped",
            SwitchStatus::AlreadyCorrect => "already_correct",
            SwitchStatus::Cooled => "cooled",
            SwitchStatus::Switched => "switched",
            SwitchStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a switch request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RequestOrigin {
    /// Normal classification of the cursor position.
    Context(ContextKind),
    /// A user pattern rule matched around the cursor.
    PatternRule,
    /// A scene-owning collaborator (commit message, tool window).
    Scene(Scene),
    /// The host application gained or lost focus.
    AppFocus,
}

impl std::fmt::Display for RequestOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestOrigin::Context(kind) => write!(f, "context:{}", kind),
            RequestOrigin::PatternRule => write!(f, "pattern-rule"),
            RequestOrigin::Scene(scene) => write!(f, "scene:{}", scene),
            RequestOrigin::AppFocus => write!(f, "app-focus"),
        }
    }
}

/// Event emitted after every dispatched or suppressed switch decision.
///
/// Producers: switch coordinator
/// Consumers: notification toasts, caret theming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchOutcomeEvent {
    pub status: SwitchStatus,
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub actual_language: Option<Language>,
    pub origin: RequestOrigin,
    /// Timestamp in milliseconds since epoch.
    #[serde(default)]
    pub timestamp_ms: i64,
}

/// Event emitted when the user just typed a comment opener.
///
/// Producers: editor sessions
/// Consumers: notification toasts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentHintEvent {
    pub session: String,
    /// `"line"` for `//`, `"block"` for `/*`.
    pub marker: String,
    #[serde(default)]
    pub timestamp_ms: i64,
}

/// Event emitted when a scene flag changes.
///
/// Producers: switch coordinator
/// Consumers: status widgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneChangedEvent {
    pub scene: Scene,
    pub active: bool,
    #[serde(default)]
    pub timestamp_ms: i64,
}

/// Event emitted when a hand-picked language is remembered for a literal.
///
/// Producers: switch coordinator
/// Consumers: settings persistence, notification toasts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringHabitEvent {
    pub file_type: String,
    pub name: String,
    pub target: Language,
    #[serde(default)]
    pub timestamp_ms: i64,
}

/// Current wall-clock time in milliseconds, for event timestamps.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Switch outcome event.
    pub const SWITCH_OUTCOME: &str = "switch:outcome";
    /// Comment opener typed.
    pub const COMMENT_HINT: &str = "hint:comment";
    /// Scene flag changed.
    pub const SCENE_CHANGED: &str = "scene:changed";
    /// Habit learned inside a string literal.
    pub const STRING_HABIT: &str = "string:habit";
}
