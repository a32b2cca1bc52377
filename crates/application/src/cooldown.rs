//! Switch bookkeeping shared by every session.

use inputshift_context::Language;
use std::time::{Duration, Instant};

/// What the coordinator remembers between decisions.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    /// Never moves backwards, even when concurrent sessions record out of
    /// order.
    pub last_switch: Option<Instant>,
    pub last_target: Option<Language>,
    pub current_known: Option<Language>,
    pub grace_until: Option<Instant>,
}

impl CooldownState {
    /// True when `target` was switched to less than `window` ago.
    pub fn is_cooling(&self, target: Language, now: Instant, window: Duration) -> bool {
        match (self.last_switch, self.last_target) {
            (Some(at), Some(last)) => last == target && now.saturating_duration_since(at) < window,
            _ => false,
        }
    }

    /// The source already matched; nothing was dispatched.
    pub fn record_already_correct(&mut self, target: Language) {
        self.last_target = Some(target);
        self.current_known = Some(target);
    }

    pub fn record_switch(&mut self, target: Language, now: Instant, grace: Duration) {
        let at = match self.last_switch {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.last_switch = Some(at);
        self.last_target = Some(target);
        self.current_known = Some(target);
        self.grace_until = Some(now + grace);
    }

    pub fn in_grace(&self, now: Instant) -> bool {
        self.grace_until.is_some_and(|until| now < until)
    }
}

/// Short-lived memo of the last current-source query.
#[derive(Debug, Clone, Default)]
pub struct SourceCache {
    entry: Option<CachedSource>,
}

#[derive(Debug, Clone)]
pub struct CachedSource {
    pub id: String,
    pub language: Option<Language>,
    pub at: Instant,
}

impl SourceCache {
    pub fn get(&self, now: Instant, ttl: Duration) -> Option<&CachedSource> {
        self.entry
            .as_ref()
            .filter(|cached| now.saturating_duration_since(cached.at) < ttl)
    }

    pub fn set(&mut self, id: String, language: Option<Language>, at: Instant) {
        self.entry = Some(CachedSource { id, language, at });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[test]
    fn test_cooling_requires_same_target() {
        let now = Instant::now();
        let mut state = CooldownState::default();
        assert!(!state.is_cooling(Language::English, now, WINDOW));

        state.record_switch(Language::English, now, Duration::from_millis(500));
        assert!(state.is_cooling(Language::English, now + Duration::from_millis(50), WINDOW));
        assert!(!state.is_cooling(Language::Native, now + Duration::from_millis(50), WINDOW));
        assert!(!state.is_cooling(Language::English, now + WINDOW, WINDOW));
    }

    #[test]
    fn test_last_switch_is_monotonic() {
        let later = Instant::now() + Duration::from_secs(1);
        let earlier = later - Duration::from_millis(500);

        let mut state = CooldownState::default();
        state.record_switch(Language::Native, later, Duration::ZERO);
        state.record_switch(Language::English, earlier, Duration::ZERO);

        assert_eq!(state.last_switch, Some(later));
        assert_eq!(state.last_target, Some(Language::English));
    }

    #[test]
    fn test_grace_window() {
        let now = Instant::now();
        let mut state = CooldownState::default();
        assert!(!state.in_grace(now));

        state.record_switch(Language::Native, now, Duration::from_millis(500));
        assert!(state.in_grace(now + Duration::from_millis(499)));
        assert!(!state.in_grace(now + Duration::from_millis(500)));
    }

    #[test]
    fn test_already_correct_keeps_timestamp() {
        let mut state = CooldownState::default();
        state.record_already_correct(Language::Native);
        assert_eq!(state.current_known, Some(Language::Native));
        assert_eq!(state.last_switch, None);
    }

    #[test]
    fn test_source_cache_expires() {
        let now = Instant::now();
        let ttl = Duration::from_millis(300);
        let mut cache = SourceCache::default();
        assert!(cache.get(now, ttl).is_none());

        cache.set("abc".to_string(), Some(Language::English), now);
        assert_eq!(cache.get(now + Duration::from_millis(10), ttl).unwrap().id, "abc");
        assert!(cache.get(now + ttl, ttl).is_none());

        cache.invalidate();
        assert!(cache.get(now, ttl).is_none());
    }
}
