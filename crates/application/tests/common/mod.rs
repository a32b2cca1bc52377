//! Shared fixtures for application integration tests.

#![allow(dead_code)]

use inputshift_application::{Settings, SwitchCoordinator};
use inputshift_events::{EventBusRef, InMemoryEventBus};
use inputshift_switch::{InputSourceSwitcher, StrategyKind, SwitchError, SwitchResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ABC: &str = "com.apple.keylayout.ABC";
pub const PINYIN: &str = "com.apple.inputmethod.SCIM.Pinyin";
pub const GERMAN: &str = "com.apple.keylayout.German";

#[derive(Debug, Clone, Copy)]
pub enum FailMode {
    Execution,
    Unsupported,
}

/// Scriptable switcher counting every call.
#[derive(Default)]
pub struct MockSwitcher {
    current: Mutex<Option<String>>,
    /// When set, a successful switch changes what `current` reports.
    follow: bool,
    fail: Mutex<Option<FailMode>>,
    native_ids: Vec<String>,
    pub current_calls: AtomicUsize,
    pub switch_calls: AtomicUsize,
    pub switched_to: Mutex<Vec<String>>,
}

impl MockSwitcher {
    /// `current` never changes, like a platform whose indicator lags.
    pub fn fixed(current: &str) -> Self {
        Self {
            current: Mutex::new(Some(current.to_string())),
            ..Default::default()
        }
    }

    /// `current` follows successful switches.
    pub fn following(current: &str) -> Self {
        Self {
            current: Mutex::new(Some(current.to_string())),
            follow: true,
            ..Default::default()
        }
    }

    pub fn with_native_ids(mut self, ids: &[&str]) -> Self {
        self.native_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn set_current(&self, id: &str) {
        *self.current.lock().unwrap() = Some(id.to_string());
    }

    pub fn fail_with(&self, mode: Option<FailMode>) {
        *self.fail.lock().unwrap() = mode;
    }

    pub fn switches(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> Vec<String> {
        self.switched_to.lock().unwrap().clone()
    }
}

impl InputSourceSwitcher for MockSwitcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SystemApi
    }

    fn current(&self) -> SwitchResult<String> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SwitchError::Execution("no source".to_string()))
    }

    fn switch_to(&self, id: &str) -> SwitchResult<()> {
        self.switch_calls.fetch_add(1, Ordering::SeqCst);
        match *self.fail.lock().unwrap() {
            Some(FailMode::Execution) => {
                return Err(SwitchError::Execution("helper exited with code 1".to_string()))
            }
            Some(FailMode::Unsupported) => {
                return Err(SwitchError::UnsupportedPlatform {
                    kind: StrategyKind::SystemApi,
                    platform: "test-os",
                })
            }
            None => {}
        }
        self.switched_to.lock().unwrap().push(id.to_string());
        if self.follow {
            self.set_current(id);
        }
        Ok(())
    }

    fn is_native_source(&self, id: &str) -> SwitchResult<Option<bool>> {
        Ok(Some(self.native_ids.iter().any(|n| n == id)))
    }
}

pub struct Harness {
    pub switcher: Arc<MockSwitcher>,
    pub bus: Arc<InMemoryEventBus>,
    pub coordinator: Arc<SwitchCoordinator>,
}

impl Harness {
    pub fn new(settings: Settings, switcher: MockSwitcher) -> Self {
        let switcher = Arc::new(switcher);
        let bus = Arc::new(InMemoryEventBus::new());
        let bus_ref: EventBusRef = bus.clone();
        let coordinator = Arc::new(
            SwitchCoordinator::new(settings, switcher.clone(), bus_ref)
                .expect("valid test settings"),
        );
        Self {
            switcher,
            bus,
            coordinator,
        }
    }

    pub fn outcome_events(&self) -> usize {
        self.bus
            .events_for(inputshift_events::event_names::SWITCH_OUTCOME)
            .len()
    }
}

/// Defaults with a short cache so back-to-back calls query again.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.timing.current_cache_ms = 1;
    settings
}
