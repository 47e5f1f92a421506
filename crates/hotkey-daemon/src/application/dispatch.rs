//! KeyDispatcher: turns raw key transitions into hotkey invocations.
//!
//! For every transition, in the order the OS delivered them:
//!
//! - **Key-down**: update the held modifiers, then (unless the key is already
//!   held, i.e. OS auto-repeat) look up the held modifiers plus this key in the
//!   registry and hand a match to the [`ActionExecutor`].
//! - **Key-up**: release the modifier and the key.
//!
//! The dispatcher runs on a single thread fed by a FIFO channel, so held-key
//! state always reflects the true OS order (a Control key-up can never be
//! applied after the key-down that followed it).  Only action invocations fan
//! out to the worker pool; their relative order is not guaranteed.

use std::sync::Arc;

use hotkey_core::{Action, HotkeyId, HotkeyRegistry, InputState};
use tracing::{debug, trace};

use crate::infrastructure::keyboard_hook::{KeyTransition, RawKeyEvent};

/// Runs matched actions off the dispatch thread.
///
/// Production uses [`crate::infrastructure::executor::TokioActionExecutor`];
/// tests may run actions inline.
pub trait ActionExecutor: Send + Sync {
    /// Schedules one invocation of `action`.  Must not block on the action.
    fn execute(&self, id: HotkeyId, action: Action);
}

/// Per-event state machine shared by the hook manager's dispatch thread.
#[derive(Clone)]
pub struct KeyDispatcher {
    state: Arc<InputState>,
    registry: Arc<HotkeyRegistry>,
    executor: Arc<dyn ActionExecutor>,
}

impl KeyDispatcher {
    pub fn new(
        state: Arc<InputState>,
        registry: Arc<HotkeyRegistry>,
        executor: Arc<dyn ActionExecutor>,
    ) -> Self {
        Self {
            state,
            registry,
            executor,
        }
    }

    /// Applies one transition.  Returns the id of the hotkey it triggered.
    pub fn handle(&self, event: RawKeyEvent) -> Option<HotkeyId> {
        match event.transition {
            KeyTransition::Down => {
                let Some(key) = self.state.press(event.vk_code) else {
                    trace!(vk = event.vk_code, "auto-repeat ignored");
                    return None;
                };
                let (id, action) = self.registry.find(&key)?;
                debug!(%id, hotkey = %key, "hotkey triggered");
                self.executor.execute(id, action);
                Some(id)
            }
            KeyTransition::Up => {
                self.state.release(event.vk_code);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hotkey_core::keymap::vk;
    use hotkey_core::{ModifierKind, ModifierSet};

    use super::*;

    /// Runs actions on the calling thread.
    struct InlineExecutor;

    impl ActionExecutor for InlineExecutor {
        fn execute(&self, _id: HotkeyId, action: Action) {
            action();
        }
    }

    struct Fixture {
        dispatcher: KeyDispatcher,
        registry: Arc<HotkeyRegistry>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(HotkeyRegistry::new());
        let dispatcher = KeyDispatcher::new(
            Arc::new(InputState::new()),
            Arc::clone(&registry),
            Arc::new(InlineExecutor),
        );
        Fixture {
            dispatcher,
            registry,
        }
    }

    fn counter_action(counter: &Arc<AtomicUsize>) -> Action {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_down_up_down_fires_once_per_down() {
        // Arrange
        let f = fixture();
        let hits = Arc::new(AtomicUsize::new(0));
        f.registry
            .register(ModifierSet::empty(), vk::F1, counter_action(&hits))
            .expect("register");

        // Act
        f.dispatcher.handle(RawKeyEvent::down(vk::F1));
        f.dispatcher.handle(RawKeyEvent::up(vk::F1));
        assert_eq!(hits.load(Ordering::SeqCst), 1, "key-up must not fire");
        f.dispatcher.handle(RawKeyEvent::down(vk::F1));

        // Assert
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_auto_repeat_down_fires_once() {
        let f = fixture();
        let hits = Arc::new(AtomicUsize::new(0));
        f.registry
            .register(ModifierSet::empty(), vk::F1, counter_action(&hits))
            .expect("register");

        let first = f.dispatcher.handle(RawKeyEvent::down(vk::F1));
        let repeat = f.dispatcher.handle(RawKeyEvent::down(vk::F1));

        assert!(first.is_some());
        assert!(repeat.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_returns_triggered_id() {
        let f = fixture();
        let id = f
            .registry
            .register(ModifierKind::Control.into(), vk::F11, Arc::new(|| {}))
            .expect("register");

        f.dispatcher.handle(RawKeyEvent::down(vk::LCONTROL));
        let triggered = f.dispatcher.handle(RawKeyEvent::down(vk::F11));

        assert_eq!(triggered, Some(id));
    }

    #[test]
    fn test_unmatched_key_triggers_nothing_but_is_tracked() {
        let f = fixture();

        let triggered = f.dispatcher.handle(RawKeyEvent::down(vk::KEY_A));

        assert!(triggered.is_none());
        assert!(f.dispatcher.state.is_held(vk::KEY_A));
    }

    #[test]
    fn test_unregister_all_silences_every_key() {
        // Arrange
        let f = fixture();
        let hits = Arc::new(AtomicUsize::new(0));
        for code in [vk::F10, vk::F11, vk::F12] {
            f.registry
                .register(ModifierKind::Control.into(), code, counter_action(&hits))
                .expect("register");
        }

        // Act
        f.registry.unregister_all();
        f.dispatcher.handle(RawKeyEvent::down(vk::LCONTROL));
        for code in [vk::F10, vk::F11, vk::F12] {
            f.dispatcher.handle(RawKeyEvent::down(code));
            f.dispatcher.handle(RawKeyEvent::up(code));
        }

        // Assert
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_modifier_only_binding_fires_on_modifier_press() {
        let f = fixture();
        let hits = Arc::new(AtomicUsize::new(0));
        f.registry
            .register(ModifierSet::empty(), vk::LWIN, counter_action(&hits))
            .expect("register");

        f.dispatcher.handle(RawKeyEvent::down(vk::LWIN));
        f.dispatcher.handle(RawKeyEvent::down(vk::LWIN));
        f.dispatcher.handle(RawKeyEvent::up(vk::LWIN));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(f.dispatcher.state.held_modifiers().is_empty());
    }
}
