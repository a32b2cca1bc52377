//! The switching policy core.
//!
//! Every decision runs the same pipeline:
//!
//! ```text
//! request ─► enabled? ─► scene suppression ─► current source (cached)
//!         ─► already correct? ─► cooling? ─► strategy dispatch ─► record
//! ```
//!
//! The coordinator owns all state shared between sessions (cooldown,
//! scene flags, the current-source cache) and is shared as an `Arc`.
//! Each piece of state sits behind its own lock, and no lock is held
//! across a strategy call.

use crate::cooldown::{CooldownState, SourceCache};
use crate::scene::SceneArbiter;
use crate::settings::{ConfigError, LeaveStrategy, Settings, TimingConfig};
use inputshift_context::{
    classify, file_type_key, string_target, CompiledStringRule, ContextClassification,
    ContextKind, Language, Preference, RuleInput, RuleSet, Scene, StringHabit, StringLiteral,
};
use inputshift_events::{
    emit_event, event_names, now_ms, EventBusRef, RequestOrigin, SceneChangedEvent,
    StringHabitEvent, SwitchOutcomeEvent, SwitchStatus,
};
use inputshift_switch::{
    saturating_millis, InputSourceSwitcher, SwitchError, Switcher, SwitcherRef,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One decision to make, created per debounced firing or scene event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchRequest {
    pub target: Language,
    pub origin: RequestOrigin,
    pub timestamp: Instant,
}

impl SwitchRequest {
    pub fn new(target: Language, origin: RequestOrigin) -> Self {
        Self {
            target,
            origin,
            timestamp: Instant::now(),
        }
    }
}

/// Result of one decision, returned to the caller and forwarded on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub status: SwitchStatus,
    /// True when the input source is (believed to be) where it should be.
    pub success: bool,
    pub message: String,
    pub actual_language: Option<Language>,
}

impl SwitchOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: SwitchStatus::Skipped,
            success: false,
            message: reason.into(),
            actual_language: None,
        }
    }

    fn already_correct(language: Language) -> Self {
        Self {
            status: SwitchStatus::AlreadyCorrect,
            success: true,
            message: format!("already {language}"),
            actual_language: Some(language),
        }
    }

    fn cooled(target: Language, known: Option<Language>) -> Self {
        Self {
            status: SwitchStatus::Cooled,
            success: true,
            message: format!("switched to {target} moments ago"),
            actual_language: known,
        }
    }

    fn switched(language: Language) -> Self {
        Self {
            status: SwitchStatus::Switched,
            success: true,
            message: format!("switched to {language}"),
            actual_language: Some(language),
        }
    }

    fn failed(message: impl Into<String>, known: Option<Language>) -> Self {
        Self {
            status: SwitchStatus::Failed,
            success: false,
            message: message.into(),
            actual_language: known,
        }
    }

    pub fn to_event(&self, origin: RequestOrigin) -> SwitchOutcomeEvent {
        SwitchOutcomeEvent {
            status: self.status,
            success: self.success,
            message: self.message.clone(),
            actual_language: self.actual_language,
            origin,
            timestamp_ms: now_ms(),
        }
    }
}

/// Settings together with their compiled rules.
#[derive(Debug)]
struct Snapshot {
    settings: Settings,
    rules: RuleSet,
    string_rules: Vec<CompiledStringRule>,
}

impl Snapshot {
    fn compile(settings: Settings) -> Result<Self, ConfigError> {
        settings.timing.validate()?;
        let rules = settings.compile_rules()?;
        let string_rules = settings.compile_string_rules()?;
        Ok(Self {
            settings,
            rules,
            string_rules,
        })
    }

    /// Same compiled rules, different settings.
    fn with_settings(&self, settings: Settings) -> Self {
        Self {
            settings,
            rules: self.rules.clone(),
            string_rules: self.string_rules.clone(),
        }
    }
}

/// The named literal the cursor was last classified into.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LiteralFocus {
    file_type: String,
    name: String,
}

fn extension_of(file_name: Option<&str>) -> Option<&str> {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
}

pub struct SwitchCoordinator {
    config: RwLock<Arc<Snapshot>>,
    switcher: RwLock<SwitcherRef>,
    /// Whether `switcher` was built from settings and follows strategy changes.
    owns_switcher: bool,
    scenes: SceneArbiter,
    state: Mutex<CooldownState>,
    cache: Mutex<SourceCache>,
    /// Source active when the host application last gained focus.
    entry_source: Mutex<Option<String>>,
    literal_focus: Mutex<Option<LiteralFocus>>,
    bus: EventBusRef,
    unsupported_reported: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SwitchCoordinator {
    /// Coordinator with an explicit strategy.
    pub fn new(
        settings: Settings,
        switcher: SwitcherRef,
        bus: EventBusRef,
    ) -> Result<Self, ConfigError> {
        Self::build(settings, switcher, false, bus)
    }

    /// Coordinator whose strategy is chosen from `settings.strategy`.
    pub fn from_settings(settings: Settings, bus: EventBusRef) -> Result<Self, ConfigError> {
        let switcher: SwitcherRef = Arc::new(Switcher::from_config(&settings.strategy));
        Self::build(settings, switcher, true, bus)
    }

    fn build(
        settings: Settings,
        switcher: SwitcherRef,
        owns_switcher: bool,
        bus: EventBusRef,
    ) -> Result<Self, ConfigError> {
        let snapshot = Snapshot::compile(settings)?;
        info!(
            strategy = %switcher.kind(),
            rules = snapshot.rules.len(),
            enabled = snapshot.settings.enabled,
            "switch coordinator ready"
        );
        Ok(Self {
            config: RwLock::new(Arc::new(snapshot)),
            switcher: RwLock::new(switcher),
            owns_switcher,
            scenes: SceneArbiter::new(),
            state: Mutex::new(CooldownState::default()),
            cache: Mutex::new(SourceCache::default()),
            entry_source: Mutex::new(None),
            literal_focus: Mutex::new(None),
            bus,
            unsupported_reported: AtomicBool::new(false),
        })
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn switcher(&self) -> SwitcherRef {
        let guard = self
            .switcher
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the settings. On error the previous settings stay active.
    pub fn update_settings(&self, settings: Settings) -> Result<(), ConfigError> {
        let snapshot = Snapshot::compile(settings)?;
        let strategy_changed = self.snapshot().settings.strategy != snapshot.settings.strategy;

        if self.owns_switcher && strategy_changed {
            let switcher: SwitcherRef = Arc::new(Switcher::from_config(&snapshot.settings.strategy));
            info!(strategy = %switcher.kind(), "switch strategy changed");
            *self
                .switcher
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = switcher;
            self.unsupported_reported.store(false, Ordering::SeqCst);
        }

        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(snapshot);
        lock(&self.cache).invalidate();
        debug!("settings updated");
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        self.snapshot().settings.clone()
    }

    pub fn timing(&self) -> TimingConfig {
        self.snapshot().settings.timing.clone()
    }

    pub fn show_comment_hint(&self) -> bool {
        self.snapshot().settings.show_comment_hint
    }

    pub fn scenes(&self) -> &SceneArbiter {
        &self.scenes
    }

    pub fn cooldown_state(&self) -> CooldownState {
        lock(&self.state).clone()
    }

    pub fn bus(&self) -> &EventBusRef {
        &self.bus
    }

    // ------------------------------------------------------------------
    // Cursor-driven requests
    // ------------------------------------------------------------------

    /// Pick the target for a classified cursor position.
    ///
    /// Pattern rules come first. Strings then consult habits, string rules
    /// and their typed content; code consults file-type rules. The per-kind
    /// preference comes last. `None` means "no preference".
    pub fn resolve(
        &self,
        classification: &ContextClassification,
        text: &str,
        offset: usize,
        file_name: Option<&str>,
    ) -> Option<SwitchRequest> {
        let config = self.snapshot();
        let settings = &config.settings;
        let kind = classification.kind;
        let extension = extension_of(file_name);

        if !config.rules.is_empty() {
            let input = RuleInput::at_cursor(text, offset, extension, kind);
            if let Some(rule) = config.rules.first_match(&input) {
                return Some(SwitchRequest::new(rule.target(), RequestOrigin::PatternRule));
            }
        }

        if kind == ContextKind::String {
            if let Some(target) = Self::string_language(&config, classification.literal.as_ref(), extension) {
                return Some(SwitchRequest::new(target, RequestOrigin::Context(kind)));
            }
        }

        let file_type = match (kind, extension) {
            (ContextKind::Code, Some(ext)) => settings.file_type_target(ext),
            _ => None,
        };
        let preference = file_type.unwrap_or_else(|| settings.targets.for_kind(kind));

        preference
            .language()
            .map(|target| SwitchRequest::new(target, RequestOrigin::Context(kind)))
    }

    fn string_language(
        config: &Snapshot,
        literal: Option<&StringLiteral>,
        extension: Option<&str>,
    ) -> Option<Language> {
        let literal = literal?;
        let settings = &config.settings;
        if let Some(name) = &literal.name {
            let file_type = file_type_key(extension);
            let target = string_target(&settings.string_habits, &config.string_rules, &file_type, name);
            if target.is_some() {
                return target;
            }
        }
        if settings.follow_string_content {
            literal.content
        } else {
            None
        }
    }

    /// Classify the cursor, resolve a target and evaluate it.
    pub fn evaluate_cursor(&self, text: &str, offset: usize, file_name: Option<&str>) -> SwitchOutcome {
        let classification = classify(text, offset);
        debug!(%classification, offset, "cursor classified");
        self.track_literal(&classification, file_name);

        match self.resolve(&classification, text, offset, file_name) {
            Some(request) => self.evaluate(request),
            None => SwitchOutcome::skipped(format!("no preference for {}", classification.kind)),
        }
    }

    /// Decide on one request, dispatching to the strategy if needed.
    ///
    /// Never fails: strategy errors come back as a `Failed` outcome.
    pub fn evaluate(&self, request: SwitchRequest) -> SwitchOutcome {
        let config = self.snapshot();
        let (outcome, emit) = self.decide(&config, &request);

        match outcome.status {
            SwitchStatus::Skipped | SwitchStatus::AlreadyCorrect | SwitchStatus::Cooled => debug!(
                status = %outcome.status,
                origin = %request.origin,
                target = %request.target,
                message = %outcome.message,
                "switch decision"
            ),
            SwitchStatus::Switched => info!(
                origin = %request.origin,
                target = %request.target,
                latency_ms = saturating_millis(request.timestamp.elapsed()),
                "input source switched"
            ),
            SwitchStatus::Failed if emit => warn!(
                origin = %request.origin,
                target = %request.target,
                error = %outcome.message,
                "input source switch failed"
            ),
            SwitchStatus::Failed => debug!(error = %outcome.message, "switch failed again"),
        }

        if emit {
            emit_event(
                self.bus.as_ref(),
                event_names::SWITCH_OUTCOME,
                &outcome.to_event(request.origin),
            );
        }
        outcome
    }

    fn decide(&self, config: &Snapshot, request: &SwitchRequest) -> (SwitchOutcome, bool) {
        let settings = &config.settings;
        let target = request.target;

        if !settings.enabled {
            return (SwitchOutcome::skipped("auto-switching disabled"), false);
        }

        if let Some(reason) = self.suppression(request.origin) {
            return (SwitchOutcome::skipped(reason), false);
        }

        let current = self.current_language_with(config);
        if current == Some(target) {
            lock(&self.state).record_already_correct(target);
            return (SwitchOutcome::already_correct(target), true);
        }

        {
            let state = lock(&self.state);
            if state.is_cooling(target, Instant::now(), settings.timing.cooldown()) {
                return (SwitchOutcome::cooled(target, state.current_known), true);
            }
        }

        let id = settings.input_sources.id_for(target);
        match self.switcher().switch_to(id) {
            Ok(()) => {
                lock(&self.state).record_switch(target, Instant::now(), settings.timing.grace());
                lock(&self.cache).invalidate();
                (SwitchOutcome::switched(target), true)
            }
            Err(e) => {
                let known = lock(&self.state).current_known;
                let emit = self.should_report(&e);
                (SwitchOutcome::failed(e.to_string(), known), emit)
            }
        }
    }

    /// Unsupported-platform errors are reported once; everything else every time.
    fn should_report(&self, error: &SwitchError) -> bool {
        if error.is_unsupported_platform() {
            return !self.unsupported_reported.swap(true, Ordering::SeqCst);
        }
        true
    }

    fn suppression(&self, origin: RequestOrigin) -> Option<String> {
        match origin {
            RequestOrigin::Context(_) | RequestOrigin::PatternRule => self
                .scenes
                .active_scenes()
                .first()
                .map(|scene| format!("{scene} scene active")),
            RequestOrigin::Scene(scene) if !self.scenes.is_active(scene) => {
                Some(format!("{scene} scene no longer active"))
            }
            RequestOrigin::Scene(_) | RequestOrigin::AppFocus => None,
        }
    }

    // ------------------------------------------------------------------
    // Current source
    // ------------------------------------------------------------------

    /// Language of the active input source, if it can be told.
    ///
    /// Answers are cached for `timing.current_cache_ms`.
    pub fn current_language(&self) -> Option<Language> {
        self.current_language_with(&self.snapshot())
    }

    fn current_language_with(&self, config: &Snapshot) -> Option<Language> {
        let ttl = config.settings.timing.current_cache();
        if let Some(cached) = lock(&self.cache).get(Instant::now(), ttl) {
            return cached.language;
        }

        let switcher = self.switcher();
        let queried_at = Instant::now();
        match switcher.current() {
            Ok(id) => {
                let language = self.language_of(config, switcher.as_ref(), &id);
                debug!(id = %id, language = ?language, "current input source");
                lock(&self.cache).set(id, language, queried_at);
                language
            }
            Err(e) => {
                debug!(error = %e, "current input source unknown");
                None
            }
        }
    }

    fn language_of(
        &self,
        config: &Snapshot,
        switcher: &dyn InputSourceSwitcher,
        id: &str,
    ) -> Option<Language> {
        if let Some(language) = config.settings.input_sources.language_of(id) {
            return Some(language);
        }
        match switcher.is_native_source(id) {
            Ok(Some(true)) => Some(Language::Native),
            Ok(_) => None,
            Err(e) => {
                debug!(id, error = %e, "could not classify input source");
                None
            }
        }
    }

    fn track_literal(&self, classification: &ContextClassification, file_name: Option<&str>) {
        let focus = classification
            .literal
            .as_ref()
            .and_then(|literal| literal.name.clone())
            .map(|name| LiteralFocus {
                file_type: file_type_key(extension_of(file_name)),
                name,
            });
        *lock(&self.literal_focus) = focus;
    }

    /// An observer saw the active input source change to `id`.
    ///
    /// Changes inside the grace window after one of our own switches are
    /// ignored. When the user switched by hand while the cursor sits in a
    /// named string literal, the new language is remembered for that
    /// literal and returned.
    pub fn on_input_source_changed(&self, id: &str) -> Option<StringHabit> {
        if self.is_self_caused_change() {
            debug!(id, "own switch observed");
            return None;
        }

        let config = self.snapshot();
        let language = self.language_of(&config, self.switcher().as_ref(), id);
        lock(&self.cache).set(id.to_string(), language, Instant::now());
        lock(&self.state).current_known = language;

        if !config.settings.enabled || !config.settings.learn_string_habits {
            return None;
        }
        let focus = lock(&self.literal_focus).clone()?;
        let target = language?;

        let habit = StringHabit {
            file_type: focus.file_type,
            name: focus.name,
            target,
            recorded_ms: now_ms(),
        };
        {
            let mut guard = self
                .config
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut settings = guard.settings.clone();
            if !settings.record_string_habit(&habit.file_type, &habit.name, target, habit.recorded_ms) {
                return None;
            }
            let next = Arc::new(guard.with_settings(settings));
            *guard = next;
        }

        info!(name = %habit.name, file_type = %habit.file_type, %target, "string habit learned");
        emit_event(
            self.bus.as_ref(),
            event_names::STRING_HABIT,
            &StringHabitEvent {
                file_type: habit.file_type.clone(),
                name: habit.name.clone(),
                target,
                timestamp_ms: habit.recorded_ms,
            },
        );
        Some(habit)
    }

    /// True shortly after a switch made by this coordinator, so observers
    /// of input-source changes can tell them apart from the user's own.
    pub fn is_self_caused_change(&self) -> bool {
        lock(&self.state).in_grace(Instant::now())
    }

    // ------------------------------------------------------------------
    // Scenes
    // ------------------------------------------------------------------

    /// Set a scene flag and announce the change.
    pub fn set_scene(&self, scene: Scene, active: bool) {
        let previous = self.scenes.set_flag(scene, active);
        if previous != active {
            emit_event(
                self.bus.as_ref(),
                event_names::SCENE_CHANGED,
                &SceneChangedEvent {
                    scene,
                    active,
                    timestamp_ms: now_ms(),
                },
            );
        }
    }

    fn enter_scene(&self, scene: Scene, preference: Preference) -> SwitchOutcome {
        self.set_scene(scene, true);
        match preference.language() {
            Some(target) => self.evaluate(SwitchRequest::new(target, RequestOrigin::Scene(scene))),
            None => SwitchOutcome::skipped(format!("no preference for {scene} scene")),
        }
    }

    /// The commit-message editor gained focus.
    pub fn enter_commit_scene(&self) -> SwitchOutcome {
        let preference = self.snapshot().settings.scenes.commit;
        self.enter_scene(Scene::Commit, preference)
    }

    pub fn leave_commit_scene(&self) {
        self.set_scene(Scene::Commit, false);
    }

    /// An auxiliary panel with the given id gained focus.
    pub fn enter_tool_window(&self, id: &str) -> SwitchOutcome {
        let preference = self.snapshot().settings.tool_window_target(id);
        debug!(id, %preference, "tool window focused");
        self.enter_scene(Scene::ToolWindow, preference)
    }

    pub fn leave_tool_window(&self) {
        self.set_scene(Scene::ToolWindow, false);
    }

    // ------------------------------------------------------------------
    // Host application focus
    // ------------------------------------------------------------------

    /// Remember the source the user arrived with.
    pub fn on_app_focus_gained(&self) {
        lock(&self.cache).invalidate();
        match self.switcher().current() {
            Ok(id) => {
                debug!(id = %id, "application focused");
                *lock(&self.entry_source) = Some(id);
            }
            Err(e) => debug!(error = %e, "could not record source on focus"),
        }
    }

    /// Apply the configured leave strategy.
    pub fn on_app_focus_lost(&self) -> SwitchOutcome {
        let config = self.snapshot();
        let entry = lock(&self.entry_source).take();
        *lock(&self.literal_focus) = None;

        match config.settings.leave_app {
            LeaveStrategy::NoChange => SwitchOutcome::skipped("leave strategy is no-change"),
            LeaveStrategy::English => {
                self.evaluate(SwitchRequest::new(Language::English, RequestOrigin::AppFocus))
            }
            LeaveStrategy::Native => {
                self.evaluate(SwitchRequest::new(Language::Native, RequestOrigin::AppFocus))
            }
            LeaveStrategy::RestorePrevious => {
                let Some(id) = entry else {
                    return SwitchOutcome::skipped("no source recorded on focus");
                };
                match self.language_of(&config, self.switcher().as_ref(), &id) {
                    Some(target) => {
                        self.evaluate(SwitchRequest::new(target, RequestOrigin::AppFocus))
                    }
                    None => self.restore_source(&config, &id),
                }
            }
        }
    }

    /// Switch straight to a platform id that maps to neither language.
    fn restore_source(&self, config: &Snapshot, id: &str) -> SwitchOutcome {
        if !config.settings.enabled {
            return SwitchOutcome::skipped("auto-switching disabled");
        }

        let (outcome, emit) = match self.switcher().switch_to(id) {
            Ok(()) => {
                lock(&self.cache).invalidate();
                let mut state = lock(&self.state);
                state.current_known = None;
                state.grace_until = Some(Instant::now() + config.settings.timing.grace());
                let outcome = SwitchOutcome {
                    status: SwitchStatus::Switched,
                    success: true,
                    message: format!("restored {id}"),
                    actual_language: None,
                };
                (outcome, true)
            }
            Err(e) => (SwitchOutcome::failed(e.to_string(), None), self.should_report(&e)),
        };

        info!(id, status = %outcome.status, "restored input source on leave");
        if emit {
            emit_event(
                self.bus.as_ref(),
                event_names::SWITCH_OUTCOME,
                &outcome.to_event(RequestOrigin::AppFocus),
            );
        }
        outcome
    }
}

impl std::fmt::Debug for SwitchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchCoordinator")
            .field("strategy", &self.switcher().kind())
            .field("scenes", &self.scenes.active_scenes())
            .field("state", &self.cooldown_state())
            .finish_non_exhaustive()
    }
}
