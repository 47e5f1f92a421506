//! HookManager: the consumer-facing global hotkey service.
//!
//! Owns the keyboard hook, the held-key state and the dispatch thread, and
//! exposes the registration API.  Lifecycle:
//!
//! ```text
//! Stopped ──start()──► Running ──stop()──► Stopped
//!    ▲  start() on Running and stop() on Stopped are no-ops
//! ```
//!
//! # Threads (for beginners)
//!
//! Three kinds of thread cooperate:
//!
//! - The **hook thread** (owned by the [`KeyboardHook`]) receives every
//!   keystroke from Windows and only forwards it into a channel.
//! - The **dispatch thread** (`hotkey-dispatch`, owned here) drains that
//!   channel in order and runs the [`KeyDispatcher`] state machine.
//! - **Worker threads** (behind the [`ActionExecutor`]) run matched actions.
//!
//! The registry may be changed from any thread at any time, running or not.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use hotkey_core::{
    Action, HotkeyId, HotkeyRegistry, InputState, ModifierKind, ModifierSet, RegistryError,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::dispatch::{ActionExecutor, KeyDispatcher};
use crate::infrastructure::keyboard_hook::{HookError, KeyboardHook, RawKeyEvent};

/// Global hotkey service.
pub struct HookManager {
    hook: Box<dyn KeyboardHook>,
    registry: Arc<HotkeyRegistry>,
    state: Arc<InputState>,
    executor: Arc<dyn ActionExecutor>,
    /// `Some` while running.
    dispatch_thread: Mutex<Option<JoinHandle<()>>>,
}

impl HookManager {
    /// Creates a stopped manager with an empty registry.
    pub fn new(hook: Box<dyn KeyboardHook>, executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            hook,
            registry: Arc::new(HotkeyRegistry::new()),
            state: Arc::new(InputState::new()),
            executor,
            dispatch_thread: Mutex::new(None),
        }
    }

    /// Installs the keyboard hook and starts dispatching.  No-op when running.
    ///
    /// # Errors
    ///
    /// [`HookError::InstallationFailed`] if the OS refuses the hook.  Nothing is
    /// retried; the manager stays stopped and the caller may call `start` again.
    pub fn start(&self) -> Result<(), HookError> {
        let mut slot = self.dispatch_thread.lock();
        if slot.is_some() {
            debug!("hook manager already running");
            return Ok(());
        }

        let events = self.hook.install()?;
        let dispatcher = KeyDispatcher::new(
            Arc::clone(&self.state),
            Arc::clone(&self.registry),
            Arc::clone(&self.executor),
        );
        let handle = thread::Builder::new()
            .name("hotkey-dispatch".to_string())
            .spawn(move || run_dispatch_loop(&events, &dispatcher))
            .map_err(|e| {
                if let Err(uninstall) = self.hook.uninstall() {
                    warn!("keyboard hook left installed after failed start: {uninstall}");
                }
                HookError::DispatchThread(e.to_string())
            })?;

        *slot = Some(handle);
        info!("hotkey service started");
        Ok(())
    }

    /// Removes the keyboard hook and stops dispatching.  No-op when stopped.
    ///
    /// Events already queued are still dispatched before this returns; actions
    /// already handed to the executor run to completion.  Held-key state is
    /// reset because key-ups are not observed while stopped.  Registrations
    /// are kept.
    ///
    /// # Errors
    ///
    /// [`HookError::UninstallFailed`] if the hook could not be removed.  The
    /// manager then stays running (the dispatch thread is not joined, since
    /// its channel never closes) and `stop` may be called again.
    pub fn stop(&self) -> Result<(), HookError> {
        let mut slot = self.dispatch_thread.lock();
        if slot.is_none() {
            return Ok(());
        }

        self.hook.uninstall()?;
        let Some(handle) = slot.take() else {
            return Ok(());
        };
        if handle.join().is_err() {
            warn!("dispatch thread panicked");
        }
        self.state.clear();
        info!("hotkey service stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.dispatch_thread.lock().is_some()
    }

    // ── Registration ──────────────────────────────────────────────────────────

    /// Binds `action` to a bare key (no modifiers).
    pub fn register<F>(&self, vk_code: u32, action: F) -> Result<HotkeyId, RegistryError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register_with_modifiers(ModifierSet::empty(), vk_code, action)
    }

    /// Binds `action` to `modifiers` + `vk_code`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyRegistered`] if the combination is taken.
    pub fn register_with_modifiers<F>(
        &self,
        modifiers: ModifierSet,
        vk_code: u32,
        action: F,
    ) -> Result<HotkeyId, RegistryError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let action: Action = Arc::new(action);
        self.registry.register(modifiers, vk_code, action)
    }

    /// Binds `action` to a list of modifiers + `vk_code`.  Order and
    /// duplicates in `modifiers` do not matter.
    pub fn register_with_list<F>(
        &self,
        modifiers: &[ModifierKind],
        vk_code: u32,
        action: F,
    ) -> Result<HotkeyId, RegistryError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register_with_modifiers(modifiers.iter().collect(), vk_code, action)
    }

    /// Removes the bare-key binding for `vk_code`.
    pub fn unregister_key(&self, vk_code: u32) -> Result<(), RegistryError> {
        self.registry.unregister(ModifierSet::empty(), vk_code)
    }

    /// Removes the binding for `modifiers` + `vk_code`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if no such binding exists.
    pub fn unregister(&self, modifiers: ModifierSet, vk_code: u32) -> Result<(), RegistryError> {
        self.registry.unregister(modifiers, vk_code)
    }

    /// Removes the binding returned by an earlier `register*` call.
    pub fn unregister_id(&self, id: HotkeyId) -> Result<(), RegistryError> {
        self.registry.unregister_id(id)
    }

    /// Removes every binding.
    pub fn unregister_all(&self) {
        self.registry.unregister_all();
    }

    pub fn registry(&self) -> &Arc<HotkeyRegistry> {
        &self.registry
    }
}

impl Drop for HookManager {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("dispatch thread detached on drop: {e}");
        }
    }
}

/// Body of the `hotkey-dispatch` thread.  Exits when the hook's sender is dropped.
fn run_dispatch_loop(events: &Receiver<RawKeyEvent>, dispatcher: &KeyDispatcher) {
    debug!("dispatch loop started");
    while let Ok(event) = events.recv() {
        dispatcher.handle(event);
    }
    debug!("keyboard event channel closed; dispatch loop exiting");
}
