use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState, Modifiers};

/// Current keyboard state for a single window.
///
/// The runtime applies translated events as they arrive; applications poll
/// `key_down` once per frame. Auto-repeat events do not change the state.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Release everything on focus loss; the key-up would be delivered
                    // to another window and the key would stay stuck otherwise.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => {
                        self.keys_down.insert(*key);
                    }
                    KeyState::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    #[test]
    fn press_and_release_track_held_keys() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::G, KeyState::Pressed));
        assert!(s.key_down(Key::G));
        assert!(!s.key_down(Key::C));

        s.apply_event(&key(Key::G, KeyState::Released));
        assert!(!s.key_down(Key::G));
    }

    #[test]
    fn repeated_press_keeps_key_down() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::C, KeyState::Pressed));
        s.apply_event(&InputEvent::Key {
            key: Key::C,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: true,
        });
        assert!(s.key_down(Key::C));
        assert_eq!(s.keys_down.len(), 1);
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Focused(true));
        s.apply_event(&key(Key::Escape, KeyState::Pressed));
        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.focused);
        assert!(s.keys_down.is_empty());
    }

    #[test]
    fn key_event_updates_modifiers() {
        let mut s = InputState::default();
        let shift = Modifiers { shift: true, ..Modifiers::default() };
        s.apply_event(&InputEvent::Key {
            key: Key::A,
            state: KeyState::Pressed,
            modifiers: shift,
            repeat: false,
        });
        assert!(s.modifiers.any());
    }
}
