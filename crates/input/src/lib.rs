//! Key-chord synthesis for inputshift.
//!
//! The shortcut strategy cannot select an input source by id; it presses
//! the chord the OS binds to "select the previous input source". This
//! crate describes such chords and posts them as platform key events.
//!
//! # Example
//!
//! ```ignore
//! use inputshift_input::{ChordSender, EnigoChordSender, KeyChord};
//!
//! let chord = KeyChord::parse("control", 49)?;
//! EnigoChordSender::new().send(&chord)?;
//! ```

mod access;
mod chord;
mod error;
mod sender;

#[cfg(target_os = "macos")]
mod macos;

pub use access::{key_event_access, request_key_event_access, KeyEventAccess};
pub use chord::{KeyChord, Modifier, KEYCODE_SPACE};
pub use error::InputError;
pub use sender::{ChordSender, EnigoChordSender};
