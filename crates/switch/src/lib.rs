//! Input-source switching strategies for inputshift.
//!
//! Three interchangeable mechanisms sit behind [`InputSourceSwitcher`]:
//!
//! - [`ExternalTool`]: an installed command-line tool (`im-select`), success
//!   by exit code.
//! - [`SystemApi`]: the bundled helper selects a source by id and prints
//!   `SUCCESS`, followed by a short settle delay.
//! - [`ShortcutFallback`]: the helper reports the current source and the
//!   OS "previous input source" shortcut does the switch.
//!
//! [`Switcher::from_config`] picks one once. All calls block on a child
//! process; run them on a worker thread.
//!
//! # Example
//!
//! ```no_run
//! use inputshift_switch::{InputSourceSwitcher, StrategyKind, SwitchConfig, Switcher};
//!
//! let config = SwitchConfig { kind: StrategyKind::ExternalTool, ..Default::default() };
//! let switcher = Switcher::from_config(&config);
//! match switcher.switch_to("com.apple.keylayout.ABC") {
//!     Ok(()) => println!("switched"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

mod config;
mod error;
mod external;
mod helper;
mod process;
mod shortcut;
mod switcher;
mod system_api;

pub use config::{
    ChordSenderKind, ShortcutConfig, StrategyKind, SwitchConfig, DEFAULT_SHORTCUT_SETTLE_MS,
    DEFAULT_SYSTEM_API_SETTLE_MS, DEFAULT_TOOL,
};
pub use error::{SwitchError, SwitchResult};
pub use external::ExternalTool;
pub use helper::{
    helper_unavailable, parse_status, HelperChordSender, HelperClient, ERROR_PREFIX, SUCCESS_TOKEN,
};
pub use process::{
    find_tool, find_tool_in, is_executable, locate_helper, run, saturating_millis, ProcessOutput,
    EXTRA_TOOL_DIRS, HELPER_NAME,
};
pub use shortcut::ShortcutFallback;
pub use switcher::{InputSourceSwitcher, Switcher, SwitcherRef};
pub use system_api::SystemApi;
