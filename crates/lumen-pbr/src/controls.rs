//! Edge-triggered key bindings.

use std::collections::HashMap;

use lumen_engine::input::{InputState, Key};

/// Remembers each key's state from the previous poll.
///
/// `pressed_once` is true only on the poll where a key goes from up to down, so a
/// key held across many frames fires once, and releasing then pressing again fires
/// again.
#[derive(Debug, Default)]
pub struct KeyEdges {
    prev: HashMap<Key, bool>,
}

impl KeyEdges {
    pub fn pressed_once(&mut self, key: Key, down: bool) -> bool {
        let was_down = self.prev.insert(key, down).unwrap_or(false);
        down && !was_down
    }
}

/// Scene actions, one per binding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    Quit,
    ToggleMode,
    CyclePreset,
}

/// Key for each action.
#[derive(Debug, Clone)]
pub struct Bindings {
    pub quit: Key,
    pub toggle_mode: Key,
    pub cycle_preset: Key,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            quit: Key::Escape,
            toggle_mode: Key::G,
            cycle_preset: Key::C,
        }
    }
}

/// Polls the bound keys once per frame and reports the actions that fired.
#[derive(Debug, Default)]
pub struct Controls {
    bindings: Bindings,
    edges: KeyEdges,
}

impl Controls {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            edges: KeyEdges::default(),
        }
    }

    /// Every bound key is sampled on every poll so its previous state stays current.
    pub fn poll(&mut self, input: &InputState) -> Vec<Action> {
        let bound = [
            (self.bindings.quit, Action::Quit),
            (self.bindings.toggle_mode, Action::ToggleMode),
            (self.bindings.cycle_preset, Action::CyclePreset),
        ];

        bound
            .into_iter()
            .filter(|&(key, _)| self.edges.pressed_once(key, input.key_down(key)))
            .map(|(_, action)| action)
            .collect()
    }
}
