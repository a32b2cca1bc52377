//! Editor sessions: one per open editor, feeding the shared coordinator.

use crate::coordinator::{SwitchCoordinator, SwitchOutcome};
use crate::debounce::EventDebouncer;
use crate::settings::TimingConfig;
use inputshift_context::{comment_marker_before, CommentMarker};
use inputshift_events::{emit_event, event_names, now_ms, CommentHintEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Which editor event asked for a re-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    DocumentEdit,
    CaretMove,
    /// The editor gained focus.
    Activation,
}

impl TriggerSource {
    pub fn delay(&self, timing: &TimingConfig) -> Duration {
        let ms = match self {
            TriggerSource::DocumentEdit => timing.edit_delay_ms,
            TriggerSource::CaretMove => timing.caret_delay_ms,
            TriggerSource::Activation => timing.activation_delay_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Document text and caret at the time of an event.
///
/// The text is shared, so snapshots are cheap to take on every keystroke.
#[derive(Debug, Clone)]
pub struct CursorSnapshot {
    pub text: Arc<str>,
    /// Byte offset of the caret.
    pub offset: usize,
    pub file_name: Option<Arc<str>>,
}

impl CursorSnapshot {
    pub fn new(text: impl Into<Arc<str>>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<Arc<str>>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

type OutcomeListener = Box<dyn Fn(&SwitchOutcome) + Send + 'static>;

pub struct EditorSession {
    id: String,
    coordinator: Arc<SwitchCoordinator>,
    debouncer: EventDebouncer<CursorSnapshot>,
}

impl EditorSession {
    pub fn new(id: impl Into<String>, coordinator: Arc<SwitchCoordinator>) -> Self {
        Self::build(id.into(), coordinator, None)
    }

    /// Like [`EditorSession::new`], also handing every outcome to `listener`
    /// on the session worker.
    pub fn with_listener<F>(id: impl Into<String>, coordinator: Arc<SwitchCoordinator>, listener: F) -> Self
    where
        F: Fn(&SwitchOutcome) + Send + 'static,
    {
        Self::build(id.into(), coordinator, Some(Box::new(listener)))
    }

    fn build(id: String, coordinator: Arc<SwitchCoordinator>, listener: Option<OutcomeListener>) -> Self {
        let worker_coordinator = Arc::clone(&coordinator);
        let session_id = id.clone();
        let debouncer = EventDebouncer::new(format!("session:{id}"), move |snapshot: CursorSnapshot| {
            let outcome = worker_coordinator.evaluate_cursor(
                &snapshot.text,
                snapshot.offset,
                snapshot.file_name.as_deref(),
            );
            debug!(session = %session_id, status = %outcome.status, "session evaluated");
            if let Some(listener) = &listener {
                listener(&outcome);
            }
        });

        debug!(session = %id, "editor session opened");
        Self {
            id,
            coordinator,
            debouncer,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Schedule a re-evaluation with the delay for `source`.
    pub fn trigger(&self, source: TriggerSource, snapshot: CursorSnapshot) {
        let delay = source.delay(&self.coordinator.timing());
        self.debouncer.schedule(snapshot, delay);
    }

    pub fn on_document_edit(&self, snapshot: CursorSnapshot) {
        if self.coordinator.show_comment_hint() {
            if let Some(marker) = comment_marker_before(&snapshot.text, snapshot.offset) {
                self.emit_comment_hint(marker);
            }
        }
        self.trigger(TriggerSource::DocumentEdit, snapshot);
    }

    pub fn on_caret_move(&self, snapshot: CursorSnapshot) {
        self.trigger(TriggerSource::CaretMove, snapshot);
    }

    pub fn on_activated(&self, snapshot: CursorSnapshot) {
        self.trigger(TriggerSource::Activation, snapshot);
    }

    fn emit_comment_hint(&self, marker: CommentMarker) {
        let marker = match marker {
            CommentMarker::Line => "line",
            CommentMarker::Block => "block",
        };
        emit_event(
            self.coordinator.bus().as_ref(),
            event_names::COMMENT_HINT,
            &CommentHintEvent {
                session: self.id.clone(),
                marker: marker.to_string(),
                timestamp_ms: now_ms(),
            },
        );
    }

    /// Cancel the pending evaluation and stop the worker. Other sessions
    /// and the shared cooldown state are untouched.
    pub fn dispose(mut self) {
        self.debouncer.shutdown();
        debug!(session = %self.id, "editor session disposed");
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.debouncer.shutdown();
    }
}
