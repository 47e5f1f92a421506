//! InputState: which modifiers and keys are held right now.
//!
//! Both sets sit behind one mutex so a key-down's "add modifier, test held,
//! mark held" sequence is a single critical section.  Auto-repeat detection
//! depends on that: two workers handling the same key code can never both
//! observe it as not-yet-held.

use std::collections::HashSet;

use parking_lot::Mutex;

use super::hotkey::HotkeyKey;
use super::modifiers::ModifierSet;
use crate::keymap::classify;

#[derive(Debug, Default)]
struct Held {
    modifiers: ModifierSet,
    keys: HashSet<u32>,
}

/// Held-key state updated from OS-reported transitions.
#[derive(Debug, Default)]
pub struct InputState {
    held: Mutex<Held>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key-down.
    ///
    /// Returns the lookup key (held modifiers plus `vk_code`) when this is a
    /// genuine press, or `None` when the key was already held (OS auto-repeat).
    /// Modifier keys update the held modifier set before the lookup key is
    /// built, so a modifier press carries its own kind.
    pub fn press(&self, vk_code: u32) -> Option<HotkeyKey> {
        let mut held = self.held.lock();
        if let Some(kind) = classify(vk_code) {
            held.modifiers.insert(kind);
        }
        if !held.keys.insert(vk_code) {
            return None;
        }
        Some(HotkeyKey::new(held.modifiers, vk_code))
    }

    /// Records a key-up.
    pub fn release(&self, vk_code: u32) {
        let mut held = self.held.lock();
        if let Some(kind) = classify(vk_code) {
            held.modifiers.remove(kind);
        }
        held.keys.remove(&vk_code);
    }

    pub fn held_modifiers(&self) -> ModifierSet {
        self.held.lock().modifiers
    }

    pub fn is_held(&self, vk_code: u32) -> bool {
        self.held.lock().keys.contains(&vk_code)
    }

    /// Forgets every held key and modifier.
    pub fn clear(&self) {
        let mut held = self.held.lock();
        held.modifiers = ModifierSet::empty();
        held.keys.clear();
    }
}
