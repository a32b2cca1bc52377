//! Posting chords as platform key events.

use crate::chord::{KeyChord, Modifier};
use crate::error::InputError;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};

/// Something that can press a key chord system-wide.
///
/// Blocking; call from a worker thread.
pub trait ChordSender: Send + Sync {
    fn send(&self, chord: &KeyChord) -> Result<(), InputError>;
}

/// Sends chords through `enigo`.
///
/// A fresh `Enigo` is created per chord: chords are rare (one per switch)
/// and `Enigo` is not `Sync`.
#[derive(Debug, Default)]
pub struct EnigoChordSender;

impl EnigoChordSender {
    pub fn new() -> Self {
        Self
    }
}

fn modifier_key(modifier: Modifier) -> Key {
    match modifier {
        Modifier::Control => Key::Control,
        Modifier::Option => Key::Alt,
        Modifier::Command => Key::Meta,
        Modifier::Shift => Key::Shift,
    }
}

impl ChordSender for EnigoChordSender {
    fn send(&self, chord: &KeyChord) -> Result<(), InputError> {
        if !crate::key_event_access().allows_posting() {
            return Err(InputError::AccessibilityNotGranted);
        }

        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| InputError::InitFailed(e.to_string()))?;

        let mut pressed = Vec::with_capacity(chord.modifiers.len());
        let mut result = Ok(());

        for &modifier in &chord.modifiers {
            let key = modifier_key(modifier);
            if let Err(e) = enigo.key(key, Direction::Press) {
                result = Err(InputError::KeyFailed(e.to_string()));
                break;
            }
            pressed.push(key);
        }

        if result.is_ok() {
            result = enigo
                .key(Key::Other(chord.keycode), Direction::Click)
                .map_err(|e| InputError::KeyFailed(e.to_string()));
        }

        // Always release what was pressed, even after a failure.
        for key in pressed.into_iter().rev() {
            if let Err(e) = enigo.key(key, Direction::Release) {
                tracing::warn!(error = %e, "failed to release modifier");
            }
        }

        if result.is_ok() {
            tracing::debug!(%chord, "chord sent");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<KeyChord>>,
    }

    impl ChordSender for RecordingSender {
        fn send(&self, chord: &KeyChord) -> Result<(), InputError> {
            self.sent.lock().unwrap().push(chord.clone());
            Ok(())
        }
    }

    #[test]
    fn test_sender_is_object_safe() {
        let recorder = RecordingSender::default();
        let sender: &dyn ChordSender = &recorder;
        sender.send(&KeyChord::default()).unwrap();
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_modifier_mapping() {
        assert_eq!(modifier_key(Modifier::Command), Key::Meta);
        assert_eq!(modifier_key(Modifier::Option), Key::Alt);
    }
}
