/// Minimum time between two switches to the same target.
pub const DEFAULT_COOLDOWN_MS: u64 = 200;

/// Window after a switch during which source changes count as self-caused.
pub const DEFAULT_GRACE_MS: u64 = 500;

/// How long a current-source answer is reused before asking again.
pub const DEFAULT_CURRENT_CACHE_MS: u64 = 300;

/// Debounce delay after a document edit.
pub const DEFAULT_EDIT_DELAY_MS: u64 = 120;

/// Debounce delay after a caret move; slightly longer than edits so
/// typing (which also moves the caret) settles on the edit timer.
pub const DEFAULT_CARET_DELAY_MS: u64 = 150;

/// Debounce delay after a session gains focus.
pub const DEFAULT_ACTIVATION_DELAY_MS: u64 = 30;

/// Upper bound accepted for any timing setting.
pub const MAX_TIMING_MS: u64 = 10_000;

/// Default platform id of the Latin layout.
pub const DEFAULT_ENGLISH_SOURCE: &str = "com.apple.keylayout.ABC";

/// Default platform id of the alternate-language input method.
pub const DEFAULT_NATIVE_SOURCE: &str = "com.apple.inputmethod.SCIM.Pinyin";
