//! Hotkey identity: the combination that triggers an action.

use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use super::modifiers::ModifierSet;
use crate::keymap::classify;

/// Opaque token returned by registration and accepted by targeted removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyId(Uuid);

impl HotkeyId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for HotkeyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HotkeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A virtual key code plus the modifiers that must be held with it.
///
/// Equality and hashing consider only `vk_code` and `modifiers`; `id` is
/// ignored so a lookup key built from live input (no id) finds the stored
/// registration (with id).
#[derive(Debug, Clone, Copy)]
pub struct HotkeyKey {
    pub vk_code: u32,
    pub modifiers: ModifierSet,
    pub id: Option<HotkeyId>,
}

impl HotkeyKey {
    /// Builds a lookup key with no identifier.
    pub fn new(modifiers: ModifierSet, vk_code: u32) -> Self {
        Self {
            vk_code,
            modifiers,
            id: None,
        }
    }

    /// Builds the key a caller-supplied combination is stored and removed under.
    ///
    /// When `vk_code` is itself a modifier its own kind is added to the set,
    /// because that modifier is always held by the time its key-down is matched.
    pub fn normalized(modifiers: ModifierSet, vk_code: u32) -> Self {
        let modifiers = match classify(vk_code) {
            Some(kind) => modifiers.with(kind),
            None => modifiers,
        };
        Self::new(modifiers, vk_code)
    }

    /// Builds a registration key: [`HotkeyKey::normalized`] tagged with `id`.
    pub fn registration(modifiers: ModifierSet, vk_code: u32, id: HotkeyId) -> Self {
        Self {
            id: Some(id),
            ..Self::normalized(modifiers, vk_code)
        }
    }
}

impl PartialEq for HotkeyKey {
    fn eq(&self, other: &Self) -> bool {
        self.vk_code == other.vk_code && self.modifiers == other.modifiers
    }
}

impl Eq for HotkeyKey {}

impl Hash for HotkeyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vk_code.hash(state);
        self.modifiers.hash(state);
    }
}

impl fmt::Display for HotkeyKey {
    /// Renders as `Control+0x7A`, or just `0x7A` with no modifiers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{:#04X}", self.vk_code)
        } else {
            write!(f, "{}+{:#04X}", self.modifiers, self.vk_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use crate::domain::modifiers::ModifierKind;
    use crate::keymap::vk;

    fn hash_of(key: &HotkeyKey) -> u64 {
        let mut h = DefaultHasher::new();
        key.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_keys_with_reordered_modifiers_are_equal_and_hash_alike() {
        // Arrange
        let a = HotkeyKey::new(
            [ModifierKind::Control, ModifierKind::Alt].iter().collect(),
            vk::F1,
        );
        let b = HotkeyKey::new(
            [ModifierKind::Alt, ModifierKind::Control].iter().collect(),
            vk::F1,
        );

        // Assert
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_identifier_is_ignored_by_equality() {
        let lookup = HotkeyKey::new(ModifierKind::Control.into(), vk::F11);
        let stored = HotkeyKey::registration(ModifierKind::Control.into(), vk::F11, HotkeyId::new());
        assert_eq!(lookup, stored);
        assert_eq!(hash_of(&lookup), hash_of(&stored));
    }

    #[test]
    fn test_different_modifier_sets_are_not_equal() {
        let bare = HotkeyKey::new(ModifierSet::empty(), vk::F1);
        let ctrl = HotkeyKey::new(ModifierKind::Control.into(), vk::F1);
        assert_ne!(bare, ctrl);
    }

    #[test]
    fn test_different_key_codes_are_not_equal() {
        let a = HotkeyKey::new(ModifierKind::Control.into(), vk::F11);
        let b = HotkeyKey::new(ModifierKind::Control.into(), vk::F12);
        assert_ne!(a, b);
    }

    #[test]
    fn test_registration_of_modifier_key_includes_its_own_kind() {
        let key = HotkeyKey::registration(ModifierSet::empty(), vk::LCONTROL, HotkeyId::new());
        assert_eq!(key.modifiers, ModifierSet::from(ModifierKind::Control));
    }

    #[test]
    fn test_normalized_matches_registration_for_modifier_trigger() {
        let stored = HotkeyKey::registration(ModifierSet::empty(), vk::RMENU, HotkeyId::new());
        let removal = HotkeyKey::normalized(ModifierSet::empty(), vk::RMENU);

        assert_eq!(removal, stored);
        assert_eq!(removal.id, None);
    }

    #[test]
    fn test_normalized_leaves_ordinary_keys_alone() {
        let key = HotkeyKey::normalized(ModifierKind::Shift.into(), vk::F12);
        assert_eq!(key.modifiers, ModifierSet::from(ModifierKind::Shift));
    }

    #[test]
    fn test_display_formats_modifiers_and_hex_code() {
        let key = HotkeyKey::new(ModifierKind::Control.into(), vk::F11);
        assert_eq!(key.to_string(), "Control+0x7A");
        assert_eq!(HotkeyKey::new(ModifierSet::empty(), vk::F1).to_string(), "0x70");
    }

    #[test]
    fn test_fresh_identifiers_are_unique() {
        assert_ne!(HotkeyId::new(), HotkeyId::new());
    }
}
