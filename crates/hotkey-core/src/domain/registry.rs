//! HotkeyRegistry: the table of registered combinations and their actions.
//!
//! # Snapshot publishing
//!
//! The published table is an immutable `Arc<Table>`.  Writers are serialised by
//! their own mutex, build the next table from a copy of the current one
//! without touching the published slot, and then swap the `Arc` in.  The
//! `RwLock` around the slot is therefore only ever held for a pointer copy
//! (readers) or a pointer swap (writers): a lookup never waits on a table
//! clone, only, at worst, on one pointer store.
//!
//! Registrations are rare (startup, configuration changes) while lookups run
//! on every key-down, which is why writes pay for the clone.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::debug;

use super::hotkey::{HotkeyId, HotkeyKey};
use super::modifiers::ModifierSet;

/// The callback bound to a hotkey.  Invoked once per qualifying key-down.
pub type Action = Arc<dyn Fn() + Send + Sync + 'static>;

/// Error type for registry mutations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("hotkey {0} is already registered")]
    AlreadyRegistered(HotkeyKey),
    #[error("hotkey {0} is not registered")]
    NotRegistered(String),
}

type Table = HashMap<HotkeyKey, Action>;

/// Registry of hotkey combinations, shared between registration callers and
/// the dispatch thread.
#[derive(Default)]
pub struct HotkeyRegistry {
    /// Currently published snapshot.
    table: RwLock<Arc<Table>>,
    /// Serialises read-copy-publish cycles.
    writer: Mutex<()>,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `action` to the combination and returns its new identifier.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyRegistered`] if an equal combination (same key,
    /// same modifier set) is already present; the existing binding is kept.
    pub fn register(
        &self,
        modifiers: ModifierSet,
        vk_code: u32,
        action: Action,
    ) -> Result<HotkeyId, RegistryError> {
        let id = HotkeyId::new();
        let key = HotkeyKey::registration(modifiers, vk_code, id);

        let _writer = self.writer.lock();
        let current = self.snapshot();
        if current.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered(key));
        }
        let mut next = Table::clone(&current);
        next.insert(key, action);
        self.publish(next);
        debug!(%id, hotkey = %key, "hotkey registered");
        Ok(id)
    }

    /// Removes the binding whose combination equals `(modifiers, vk_code)`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if no such combination exists.
    pub fn unregister(&self, modifiers: ModifierSet, vk_code: u32) -> Result<(), RegistryError> {
        let key = HotkeyKey::normalized(modifiers, vk_code);

        let _writer = self.writer.lock();
        let current = self.snapshot();
        if !current.contains_key(&key) {
            return Err(RegistryError::NotRegistered(key.to_string()));
        }
        let mut next = Table::clone(&current);
        next.remove(&key);
        self.publish(next);
        debug!(hotkey = %key, "hotkey unregistered");
        Ok(())
    }

    /// Removes the binding carrying `id`.
    ///
    /// This is a linear scan; registries hold tens of entries.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if no binding carries `id`.
    pub fn unregister_id(&self, id: HotkeyId) -> Result<(), RegistryError> {
        let _writer = self.writer.lock();
        let current = self.snapshot();
        let key = current
            .keys()
            .find(|k| k.id == Some(id))
            .copied()
            .ok_or_else(|| RegistryError::NotRegistered(format!("id {id}")))?;
        let mut next = Table::clone(&current);
        next.remove(&key);
        self.publish(next);
        debug!(%id, hotkey = %key, "hotkey unregistered");
        Ok(())
    }

    /// Removes every binding.  Never fails.
    pub fn unregister_all(&self) {
        let _writer = self.writer.lock();
        let removed = self.snapshot().len();
        self.publish(Table::new());
        debug!(removed, "all hotkeys unregistered");
    }

    /// Returns the action bound to `(modifiers, vk_code)`, if any.
    pub fn lookup(&self, modifiers: ModifierSet, vk_code: u32) -> Option<Action> {
        self.find(&HotkeyKey::normalized(modifiers, vk_code))
            .map(|(_, action)| action)
    }

    /// Returns the identifier and action of the binding equal to `key`.
    pub fn find(&self, key: &HotkeyKey) -> Option<(HotkeyId, Action)> {
        let snapshot = self.snapshot();
        let (stored, action) = snapshot.get_key_value(key)?;
        // Every stored key is built by `HotkeyKey::registration` and carries an id.
        let id = stored.id?;
        Some((id, Arc::clone(action)))
    }

    /// Returns `true` if `id` names a current binding.
    pub fn contains_id(&self, id: HotkeyId) -> bool {
        self.snapshot().keys().any(|k| k.id == Some(id))
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Returns the currently published table.
    fn snapshot(&self) -> Arc<Table> {
        Arc::clone(&self.table.read())
    }

    /// Swaps `next` in.  The write lock covers only the pointer store; the
    /// previous table is dropped after the lock is released.
    fn publish(&self, next: Table) {
        let next = Arc::new(next);
        let previous = std::mem::replace(&mut *self.table.write(), next);
        drop(previous);
    }
}

impl fmt::Debug for HotkeyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("HotkeyRegistry")
            .field("hotkeys", &snapshot.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::modifiers::ModifierKind;
    use crate::keymap::vk;

    fn counting_action(counter: &Arc<AtomicUsize>) -> Action {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn noop() -> Action {
        Arc::new(|| {})
    }

    #[test]
    fn test_register_then_lookup_returns_bound_action() {
        // Arrange
        let registry = HotkeyRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry
            .register(ModifierKind::Control.into(), vk::F1, counting_action(&hits))
            .expect("register");

        // Act
        let action = registry
            .lookup(ModifierKind::Control.into(), vk::F1)
            .expect("action must be bound");
        action();

        // Assert
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_fails_and_keeps_first_action() {
        // Arrange
        let registry = HotkeyRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        registry
            .register(ModifierKind::Control.into(), vk::F1, counting_action(&first))
            .expect("first register");

        // Act
        let result = registry.register(ModifierKind::Control.into(), vk::F1, counting_action(&second));

        // Assert
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(_))));
        assert_eq!(registry.len(), 1);
        registry.lookup(ModifierKind::Control.into(), vk::F1).expect("bound")();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregister_unknown_combination_fails_without_change() {
        let registry = HotkeyRegistry::new();
        registry.register(ModifierSet::empty(), vk::F1, noop()).expect("register");

        let result = registry.unregister(ModifierKind::Control.into(), vk::F1);

        assert!(matches!(result, Err(RegistryError::NotRegistered(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_by_combination_matches_reordered_modifiers() {
        let registry = HotkeyRegistry::new();
        registry
            .register(ModifierKind::Control | ModifierKind::Shift, vk::F12, noop())
            .expect("register");

        registry
            .unregister(ModifierKind::Shift | ModifierKind::Control, vk::F12)
            .expect("unregister");

        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_by_id_removes_only_that_binding() {
        // Arrange
        let registry = HotkeyRegistry::new();
        let keep = registry.register(ModifierSet::empty(), vk::F1, noop()).expect("register");
        let removed = registry
            .register(ModifierKind::Alt.into(), vk::F1, noop())
            .expect("register");

        // Act
        registry.unregister_id(removed).expect("unregister by id");

        // Assert
        assert!(registry.contains_id(keep));
        assert!(!registry.contains_id(removed));
        assert!(registry.lookup(ModifierKind::Alt.into(), vk::F1).is_none());
    }

    #[test]
    fn test_unregister_unknown_id_fails() {
        let registry = HotkeyRegistry::new();
        let result = registry.unregister_id(HotkeyId::new());
        assert!(matches!(result, Err(RegistryError::NotRegistered(_))));
    }

    #[test]
    fn test_unregister_all_clears_every_binding() {
        let registry = HotkeyRegistry::new();
        registry.register(ModifierSet::empty(), vk::F1, noop()).expect("register");
        registry.register(ModifierKind::Control.into(), vk::F11, noop()).expect("register");

        registry.unregister_all();

        assert!(registry.is_empty());
        assert!(registry.lookup(ModifierSet::empty(), vk::F1).is_none());
    }

    #[test]
    fn test_unregister_all_on_empty_registry_is_fine() {
        let registry = HotkeyRegistry::new();
        registry.unregister_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_find_returns_registration_id() {
        let registry = HotkeyRegistry::new();
        let id = registry
            .register(ModifierKind::Control.into(), vk::F11, noop())
            .expect("register");

        let (found, _) = registry
            .find(&HotkeyKey::new(ModifierKind::Control.into(), vk::F11))
            .expect("find");

        assert_eq!(found, id);
    }

    #[test]
    fn test_modifier_only_binding_is_removed_with_its_registration_arguments() {
        // Arrange
        let registry = HotkeyRegistry::new();
        registry
            .register(ModifierSet::empty(), vk::LCONTROL, noop())
            .expect("register");

        // Act
        let result = registry.unregister(ModifierSet::empty(), vk::LCONTROL);

        // Assert
        assert!(result.is_ok(), "got {result:?}");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_modifier_only_binding_is_found_with_its_registration_arguments() {
        let registry = HotkeyRegistry::new();
        registry.register(ModifierSet::empty(), vk::LSHIFT, noop()).expect("register");

        assert!(registry.lookup(ModifierSet::empty(), vk::LSHIFT).is_some());
        assert!(registry.lookup(ModifierKind::Shift.into(), vk::LSHIFT).is_some());
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_concurrent_writes() {
        // Arrange
        let registry = Arc::new(HotkeyRegistry::new());
        registry.register(ModifierSet::empty(), vk::F1, noop()).expect("register");

        // Act: a writer churns while a reader keeps looking up F1
        let writer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for code in 0..200u32 {
                    registry
                        .register(ModifierKind::Alt.into(), 0x100 + code, noop())
                        .expect("register");
                }
            })
        };
        for _ in 0..1_000 {
            assert!(registry.lookup(ModifierSet::empty(), vk::F1).is_some());
        }
        writer.join().expect("writer thread");

        // Assert
        assert_eq!(registry.len(), 201);
    }

    #[test]
    fn test_snapshot_taken_before_mutation_is_unaffected() {
        // Arrange
        let registry = HotkeyRegistry::new();
        registry.register(ModifierSet::empty(), vk::F1, noop()).expect("register");
        let before = registry.snapshot();

        // Act
        registry.unregister_all();

        // Assert
        assert_eq!(before.len(), 1);
        assert!(registry.is_empty());
    }
}
