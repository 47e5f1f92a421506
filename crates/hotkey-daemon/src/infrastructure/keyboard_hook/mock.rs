//! Mock keyboard hook for unit testing.
//!
//! Allows tests to inject synthetic [`RawKeyEvent`]s without requiring
//! a running Windows message loop or OS hooks.

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{HookError, KeyboardHook, RawKeyEvent};

/// A mock implementation of [`KeyboardHook`] that allows tests to inject events.
///
/// Clones share the same channel, so a test can keep one handle for injection
/// while the other is owned by the hook manager.
#[derive(Clone, Default)]
pub struct MockKeyboardHook {
    sender: Arc<Mutex<Option<Sender<RawKeyEvent>>>>,
    install_count: Arc<Mutex<u32>>,
    fail_install: Arc<Mutex<bool>>,
    fail_next_uninstall: Arc<Mutex<bool>>,
}

impl MockKeyboardHook {
    /// Creates a new mock hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `install()` fail, as if the OS denied the hook.
    pub fn fail_installs(&self) {
        *self.fail_install.lock() = true;
    }

    /// Makes the next `uninstall()` fail and leave the hook installed, as if
    /// the hook thread could not be signalled.
    pub fn fail_next_uninstall(&self) {
        *self.fail_next_uninstall.lock() = true;
    }

    /// Injects a synthetic transition, as if captured from hardware.
    ///
    /// Returns `false` when the hook is not installed; the event is dropped,
    /// just as a real keystroke is invisible to an uninstalled hook.
    pub fn inject(&self, event: RawKeyEvent) -> bool {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Injects a key-down.
    pub fn key_down(&self, vk_code: u32) -> bool {
        self.inject(RawKeyEvent::down(vk_code))
    }

    /// Injects a key-up.
    pub fn key_up(&self, vk_code: u32) -> bool {
        self.inject(RawKeyEvent::up(vk_code))
    }

    /// Returns `true` while the hook is installed.
    pub fn is_installed(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Returns how many times `install()` has succeeded.
    pub fn install_count(&self) -> u32 {
        *self.install_count.lock()
    }
}

impl KeyboardHook for MockKeyboardHook {
    fn install(&self) -> Result<mpsc::Receiver<RawKeyEvent>, HookError> {
        if *self.fail_install.lock() {
            return Err(HookError::InstallationFailed(
                "mock hook configured to fail".to_string(),
            ));
        }
        let (tx, rx) = mpsc::channel();
        *self.sender.lock() = Some(tx);
        *self.install_count.lock() += 1;
        Ok(rx)
    }

    fn uninstall(&self) -> Result<(), HookError> {
        if std::mem::take(&mut *self.fail_next_uninstall.lock()) {
            return Err(HookError::UninstallFailed(
                "mock hook configured to fail".to_string(),
            ));
        }
        // Drop the sender to close the channel
        *self.sender.lock() = None;
        Ok(())
    }
}
