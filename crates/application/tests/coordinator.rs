//! Integration tests for the switch coordinator.
//!
//! Uses a mock switcher with call counters; no process is ever spawned.

mod common;

use common::*;
use inputshift_application::{FileTypeRule, LeaveStrategy, Settings, SwitchRequest, ToolWindowRule};
use inputshift_context::{ContextKind, Language, PatternRule, Preference, Scene, StringRule};
use inputshift_events::{event_names, RequestOrigin, SwitchStatus};
use std::thread::sleep;
use std::time::Duration;

fn code_request(target: Language) -> SwitchRequest {
    SwitchRequest::new(target, RequestOrigin::Context(ContextKind::Code))
}

// =============================================================================
// Decision pipeline
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn test_already_correct_never_dispatches() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(ABC));

        let outcome = h.coordinator.evaluate_cursor("let x = 1;", 4, Some("main.rs"));

        assert_eq!(outcome.status, SwitchStatus::AlreadyCorrect);
        assert!(outcome.success);
        assert_eq!(outcome.actual_language, Some(Language::English));
        assert_eq!(h.switcher.switches(), 0);

        let state = h.coordinator.cooldown_state();
        assert_eq!(state.last_target, Some(Language::English));
        assert_eq!(state.current_known, Some(Language::English));
        assert_eq!(state.last_switch, None);
    }

    #[test]
    fn test_comment_switches_to_native() {
        let h = Harness::new(test_settings(), MockSwitcher::following(ABC));
        let text = "let x = 1; // 注释";

        let outcome = h.coordinator.evaluate_cursor(text, text.len(), None);

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(outcome.actual_language, Some(Language::Native));
        assert_eq!(h.switcher.targets(), vec![PINYIN.to_string()]);

        let events = h.bus.events_for(event_names::SWITCH_OUTCOME);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["status"], "switched");
        assert_eq!(events[0].payload["origin"]["value"], "comment");
    }

    #[test]
    fn test_auto_preference_is_skipped_silently() {
        let mut settings = test_settings();
        settings.targets.code = Preference::Auto;
        let h = Harness::new(settings, MockSwitcher::fixed(PINYIN));

        let outcome = h.coordinator.evaluate_cursor("fn main() {}", 3, None);

        assert_eq!(outcome.status, SwitchStatus::Skipped);
        assert!(!outcome.success);
        assert_eq!(h.switcher.queries(), 0);
        assert_eq!(h.switcher.switches(), 0);
        assert_eq!(h.outcome_events(), 0);
    }

    #[test]
    fn test_disabled_skips_everything() {
        let mut settings = test_settings();
        settings.enabled = false;
        let h = Harness::new(settings, MockSwitcher::fixed(PINYIN));

        let outcome = h.coordinator.evaluate(code_request(Language::English));

        assert_eq!(outcome.status, SwitchStatus::Skipped);
        assert_eq!(h.switcher.switches(), 0);
    }

    #[test]
    fn test_unknown_current_source_still_switches() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(GERMAN));

        let outcome = h.coordinator.evaluate(code_request(Language::English));

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string()]);
    }

    #[test]
    fn test_current_source_resolved_through_strategy() {
        let sogou = "com.sogou.inputmethod.sogou.pinyin";
        let h = Harness::new(
            test_settings(),
            MockSwitcher::fixed(sogou).with_native_ids(&[sogou]),
        );

        let outcome = h
            .coordinator
            .evaluate(SwitchRequest::new(Language::Native, RequestOrigin::Context(ContextKind::Comment)));

        assert_eq!(outcome.status, SwitchStatus::AlreadyCorrect);
        assert_eq!(h.switcher.switches(), 0);
    }

    #[test]
    fn test_current_source_is_cached() {
        let mut settings = test_settings();
        settings.timing.current_cache_ms = 1_000;
        let h = Harness::new(settings, MockSwitcher::fixed(ABC));

        for _ in 0..5 {
            h.coordinator.evaluate(code_request(Language::English));
        }

        assert_eq!(h.switcher.queries(), 1);
        assert_eq!(h.coordinator.current_language(), Some(Language::English));
        assert_eq!(h.switcher.queries(), 1);
    }
}

// =============================================================================
// Cooldown and grace
// =============================================================================

mod cooldown {
    use super::*;

    #[test]
    fn test_second_request_within_window_is_cooled() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(GERMAN));

        let first = h.coordinator.evaluate(code_request(Language::English));
        let second = h.coordinator.evaluate(code_request(Language::English));

        assert_eq!(first.status, SwitchStatus::Switched);
        assert_eq!(second.status, SwitchStatus::Cooled);
        assert!(second.success);
        assert_eq!(h.switcher.switches(), 1);
        assert_eq!(h.outcome_events(), 2);
    }

    #[test]
    fn test_window_expires() {
        let mut settings = test_settings();
        settings.timing.cooldown_ms = 40;
        let h = Harness::new(settings, MockSwitcher::fixed(GERMAN));

        h.coordinator.evaluate(code_request(Language::English));
        sleep(Duration::from_millis(80));
        let again = h.coordinator.evaluate(code_request(Language::English));

        assert_eq!(again.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.switches(), 2);
    }

    #[test]
    fn test_different_target_is_not_cooled() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(GERMAN));

        h.coordinator.evaluate(code_request(Language::English));
        let other = h.coordinator.evaluate(SwitchRequest::new(
            Language::Native,
            RequestOrigin::Context(ContextKind::Comment),
        ));

        assert_eq!(other.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string(), PINYIN.to_string()]);
    }

    #[test]
    fn test_grace_marks_changes_as_self_caused() {
        let mut settings = test_settings();
        settings.timing.grace_ms = 60;
        let h = Harness::new(settings, MockSwitcher::following(ABC));

        assert!(!h.coordinator.is_self_caused_change());
        h.coordinator.evaluate(SwitchRequest::new(
            Language::Native,
            RequestOrigin::Context(ContextKind::String),
        ));
        assert!(h.coordinator.is_self_caused_change());

        sleep(Duration::from_millis(100));
        assert!(!h.coordinator.is_self_caused_change());
    }
}

// =============================================================================
// Failures
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_failure_leaves_state_unchanged() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(GERMAN));
        h.switcher.fail_with(Some(FailMode::Execution));

        let outcome = h.coordinator.evaluate(code_request(Language::English));

        assert_eq!(outcome.status, SwitchStatus::Failed);
        assert!(!outcome.success);
        assert!(outcome.message.contains("exited with code 1"));
        let state = h.coordinator.cooldown_state();
        assert_eq!(state.last_switch, None);
        assert_eq!(state.last_target, None);
        assert!(!h.coordinator.is_self_caused_change());

        // Not cooled: the next event retries.
        h.switcher.fail_with(None);
        let retry = h.coordinator.evaluate(code_request(Language::English));
        assert_eq!(retry.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.switches(), 2);
    }

    #[test]
    fn test_unsupported_platform_reported_once() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(GERMAN));
        h.switcher.fail_with(Some(FailMode::Unsupported));

        let first = h.coordinator.evaluate(code_request(Language::English));
        let second = h.coordinator.evaluate(code_request(Language::English));

        assert_eq!(first.status, SwitchStatus::Failed);
        assert_eq!(second.status, SwitchStatus::Failed);
        assert_eq!(h.outcome_events(), 1);
    }

    #[test]
    fn test_execution_failures_reported_every_time() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(GERMAN));
        h.switcher.fail_with(Some(FailMode::Execution));

        h.coordinator.evaluate(code_request(Language::English));
        h.coordinator.evaluate(code_request(Language::English));

        assert_eq!(h.outcome_events(), 2);
    }
}

// =============================================================================
// Scenes
// =============================================================================

mod scenes {
    use super::*;

    #[test]
    fn test_scene_suppresses_cursor_requests() {
        let h = Harness::new(test_settings(), MockSwitcher::following(ABC));

        let entered = h.coordinator.enter_commit_scene();
        assert_eq!(entered.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![PINYIN.to_string()]);

        let suppressed = h.coordinator.evaluate_cursor("fn main() {}", 3, None);
        assert_eq!(suppressed.status, SwitchStatus::Skipped);
        assert!(suppressed.message.contains("commit"));
        assert_eq!(h.switcher.switches(), 1);

        h.coordinator.leave_commit_scene();
        let resumed = h.coordinator.evaluate_cursor("fn main() {}", 3, None);
        assert_eq!(resumed.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![PINYIN.to_string(), ABC.to_string()]);
    }

    #[test]
    fn test_scene_changes_are_announced() {
        let h = Harness::new(test_settings(), MockSwitcher::following(PINYIN));

        h.coordinator.enter_commit_scene();
        h.coordinator.enter_commit_scene();
        h.coordinator.leave_commit_scene();

        let events = h.bus.events_for(event_names::SCENE_CHANGED);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload["scene"], "commit");
        assert_eq!(events[0].payload["active"], true);
        assert_eq!(events[1].payload["active"], false);
    }

    #[test]
    fn test_stale_scene_request_is_skipped() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(ABC));

        let outcome = h.coordinator.evaluate(SwitchRequest::new(
            Language::Native,
            RequestOrigin::Scene(Scene::Commit),
        ));

        assert_eq!(outcome.status, SwitchStatus::Skipped);
        assert_eq!(h.switcher.switches(), 0);
    }

    #[test]
    fn test_tool_window_rules() {
        let mut settings = test_settings();
        settings.tool_window_rules.push(ToolWindowRule {
            id: "Terminal".to_string(),
            enabled: true,
            target: Preference::English,
        });
        let h = Harness::new(settings, MockSwitcher::following(PINYIN));

        let terminal = h.coordinator.enter_tool_window("Terminal");
        assert_eq!(terminal.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string()]);
        h.coordinator.leave_tool_window();

        // No rule and the scene default is Auto: flag raised, nothing switched.
        let project = h.coordinator.enter_tool_window("Project");
        assert_eq!(project.status, SwitchStatus::Skipped);
        assert!(h.coordinator.scenes().is_active(Scene::ToolWindow));
        assert_eq!(h.switcher.switches(), 1);
    }
}

// =============================================================================
// Rules
// =============================================================================

mod rules {
    use super::*;

    #[test]
    fn test_pattern_rule_wins_over_kind() {
        let mut settings = test_settings();
        settings.pattern_rules.push(PatternRule {
            name: "cjk neighbour".to_string(),
            left_pattern: r"[\p{Han}]$".to_string(),
            target: Language::Native,
            ..Default::default()
        });
        let h = Harness::new(settings, MockSwitcher::following(ABC));
        let text = "let 名";

        let outcome = h.coordinator.evaluate_cursor(text, text.len(), Some("main.rs"));

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![PINYIN.to_string()]);
        let events = h.bus.events_for(event_names::SWITCH_OUTCOME);
        assert_eq!(events[0].payload["origin"]["type"], "pattern_rule");
    }

    #[test]
    fn test_file_type_rule_overrides_code_target() {
        let mut settings = test_settings();
        settings.file_type_rules.push(FileTypeRule {
            extension: "md".to_string(),
            enabled: true,
            target: Preference::Native,
        });
        let h = Harness::new(settings, MockSwitcher::following(ABC));

        let notes = h.coordinator.evaluate_cursor("Some notes", 4, Some("README.md"));
        assert_eq!(notes.status, SwitchStatus::Switched);
        assert_eq!(notes.actual_language, Some(Language::Native));

        let code = h.coordinator.evaluate_cursor("fn main() {}", 3, Some("main.rs"));
        assert_eq!(code.actual_language, Some(Language::English));
    }
}

// =============================================================================
// Host application focus
// =============================================================================

mod focus {
    use super::*;

    fn with_leave(strategy: LeaveStrategy) -> Settings {
        let mut settings = test_settings();
        settings.leave_app = strategy;
        settings
    }

    #[test]
    fn test_restore_previous_unknown_source() {
        let h = Harness::new(
            with_leave(LeaveStrategy::RestorePrevious),
            MockSwitcher::following(GERMAN),
        );

        h.coordinator.on_app_focus_gained();
        h.coordinator.evaluate(code_request(Language::English));
        let outcome = h.coordinator.on_app_focus_lost();

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string(), GERMAN.to_string()]);
    }

    #[test]
    fn test_restore_previous_known_source() {
        let h = Harness::new(
            with_leave(LeaveStrategy::RestorePrevious),
            MockSwitcher::following(PINYIN),
        );

        h.coordinator.on_app_focus_gained();
        h.coordinator.evaluate(code_request(Language::English));
        let outcome = h.coordinator.on_app_focus_lost();

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(outcome.actual_language, Some(Language::Native));
    }

    #[test]
    fn test_leave_ignores_scene_suppression() {
        let h = Harness::new(with_leave(LeaveStrategy::English), MockSwitcher::following(PINYIN));

        h.coordinator.set_scene(Scene::Commit, true);
        let outcome = h.coordinator.on_app_focus_lost();

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string()]);
    }

    #[test]
    fn test_no_change_and_missing_entry_skip() {
        let h = Harness::new(with_leave(LeaveStrategy::NoChange), MockSwitcher::following(PINYIN));
        assert_eq!(h.coordinator.on_app_focus_lost().status, SwitchStatus::Skipped);

        let h = Harness::new(
            with_leave(LeaveStrategy::RestorePrevious),
            MockSwitcher::following(PINYIN),
        );
        assert_eq!(h.coordinator.on_app_focus_lost().status, SwitchStatus::Skipped);
        assert_eq!(h.switcher.switches(), 0);
    }
}

// =============================================================================
// Settings updates
// =============================================================================

mod settings_updates {
    use super::*;

    #[test]
    fn test_invalid_update_keeps_previous_settings() {
        let h = Harness::new(test_settings(), MockSwitcher::fixed(ABC));

        let mut broken = test_settings();
        broken.pattern_rules.push(PatternRule {
            name: "broken".to_string(),
            right_pattern: "(".to_string(),
            ..Default::default()
        });
        assert!(h.coordinator.update_settings(broken).is_err());
        assert!(h.coordinator.settings().pattern_rules.is_empty());

        let mut disabled = test_settings();
        disabled.enabled = false;
        h.coordinator.update_settings(disabled).unwrap();
        let outcome = h.coordinator.evaluate(code_request(Language::Native));
        assert_eq!(outcome.status, SwitchStatus::Skipped);
    }
}

// =============================================================================
// String literals
// =============================================================================

mod strings {
    use super::*;

    const EMPTY_TITLE: &str = "let title = \"";

    #[test]
    fn test_cjk_content_switches_to_native() {
        let h = Harness::new(test_settings(), MockSwitcher::following(ABC));
        let text = "let title = \"你好世界\";";

        let offset = text.find('好').unwrap();

        let outcome = h.coordinator.evaluate_cursor(text, offset, Some("main.rs"));

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![PINYIN.to_string()]);
    }

    #[test]
    fn test_ascii_content_follows_typed_language() {
        let text = "let title = \"hello world\";";
        let offset = text.len() - 4;

        let h = Harness::new(test_settings(), MockSwitcher::following(PINYIN));
        let outcome = h.coordinator.evaluate_cursor(text, offset, Some("main.rs"));
        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string()]);

        let mut settings = test_settings();
        settings.follow_string_content = false;
        let h = Harness::new(settings, MockSwitcher::following(PINYIN));
        let outcome = h.coordinator.evaluate_cursor(text, offset, Some("main.rs"));
        assert_eq!(outcome.status, SwitchStatus::AlreadyCorrect);
        assert_eq!(h.switcher.switches(), 0);
    }

    #[test]
    fn test_empty_literal_uses_string_target() {
        let h = Harness::new(test_settings(), MockSwitcher::following(ABC));

        let outcome = h.coordinator.evaluate_cursor(EMPTY_TITLE, EMPTY_TITLE.len(), Some("main.rs"));

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![PINYIN.to_string()]);
    }

    #[test]
    fn test_string_rule_beats_content() {
        let mut settings = test_settings();
        settings.string_rules = vec![StringRule {
            name: "*sql*".to_string(),
            target: Language::English,
            ..Default::default()
        }];
        let h = Harness::new(settings, MockSwitcher::following(PINYIN));
        let text = "let sql_query = \"选择";

        let outcome = h.coordinator.evaluate_cursor(text, text.len(), Some("main.rs"));

        assert_eq!(outcome.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string()]);
    }

    #[test]
    fn test_manual_switch_in_literal_is_learned() {
        let h = Harness::new(test_settings(), MockSwitcher::following(PINYIN));

        let first = h.coordinator.evaluate_cursor(EMPTY_TITLE, EMPTY_TITLE.len(), Some("main.rs"));
        assert_eq!(first.status, SwitchStatus::AlreadyCorrect);

        h.switcher.set_current(ABC);
        let habit = h.coordinator.on_input_source_changed(ABC).expect("habit recorded");
        assert_eq!(habit.file_type, "rs");
        assert_eq!(habit.name, "title");
        assert_eq!(habit.target, Language::English);
        assert_eq!(h.coordinator.settings().string_habits.len(), 1);

        let events = h.bus.events_for(event_names::STRING_HABIT);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["name"], "title");
        assert_eq!(events[0].payload["target"], "english");

        // Back in the same literal later, after the user moved to pinyin.
        h.switcher.set_current(PINYIN);
        sleep(Duration::from_millis(10));
        let again = h.coordinator.evaluate_cursor(EMPTY_TITLE, EMPTY_TITLE.len(), Some("main.rs"));
        assert_eq!(again.status, SwitchStatus::Switched);
        assert_eq!(h.switcher.targets(), vec![ABC.to_string()]);

        // Same name in another file type is not affected.
        let other = h.coordinator.resolve(
            &inputshift_context::classify(EMPTY_TITLE, EMPTY_TITLE.len()),
            EMPTY_TITLE,
            EMPTY_TITLE.len(),
            Some("main.py"),
        );
        assert_eq!(other.map(|r| r.target), Some(Language::Native));
    }

    #[test]
    fn test_own_switch_is_not_learned() {
        let h = Harness::new(test_settings(), MockSwitcher::following(ABC));
        let text = "let title = \"你好";

        let outcome = h.coordinator.evaluate_cursor(text, text.len(), Some("main.rs"));
        assert_eq!(outcome.status, SwitchStatus::Switched);

        assert!(h.coordinator.is_self_caused_change());
        assert!(h.coordinator.on_input_source_changed(PINYIN).is_none());
        assert!(h.coordinator.settings().string_habits.is_empty());
        assert!(h.bus.events_for(event_names::STRING_HABIT).is_empty());
    }

    #[test]
    fn test_learning_can_be_disabled() {
        let mut settings = test_settings();
        settings.learn_string_habits = false;
        let h = Harness::new(settings, MockSwitcher::following(PINYIN));

        h.coordinator.evaluate_cursor(EMPTY_TITLE, EMPTY_TITLE.len(), Some("main.rs"));
        h.switcher.set_current(ABC);

        assert!(h.coordinator.on_input_source_changed(ABC).is_none());
        assert!(h.coordinator.settings().string_habits.is_empty());
        assert_eq!(h.coordinator.current_language(), Some(Language::English));
    }

    #[test]
    fn test_change_outside_literal_is_not_learned() {
        let h = Harness::new(test_settings(), MockSwitcher::following(ABC));

        h.coordinator.evaluate_cursor("fn main() {}", 3, Some("main.rs"));
        h.switcher.set_current(PINYIN);

        assert!(h.coordinator.on_input_source_changed(PINYIN).is_none());
        assert!(h.coordinator.settings().string_habits.is_empty());
    }
}
