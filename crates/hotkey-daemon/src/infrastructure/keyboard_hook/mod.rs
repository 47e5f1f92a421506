//! Keyboard hook infrastructure.
//!
//! On Windows, this installs a low-level keyboard hook (WH_KEYBOARD_LL) on a
//! dedicated Win32 message loop thread.  Each raw transition is placed into a
//! channel and consumed by the dispatch thread owned by
//! [`crate::application::hook_manager::HookManager`].
//!
//! # Windows-Specific Implementation
//!
//! The hook callback must complete within the `LowLevelHooksTimeout` budget
//! (a few hundred ms) or Windows silently removes the hook.  The callback
//! therefore only reads the key code, sends it, and forwards the event down the
//! hook chain.  Classification, state updates and actions all happen elsewhere.
//!
//! # Testability
//!
//! The [`KeyboardHook`] trait lets tests inject synthetic transitions through
//! [`mock::MockKeyboardHook`] without installing any OS hook.

use std::sync::mpsc;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// The edge of a key press.  The OS "system key" variants (Alt-chords and F10)
/// are folded into the plain ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Down,
    Up,
}

/// A raw key transition captured by the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub transition: KeyTransition,
    /// Windows Virtual Key code.
    pub vk_code: u32,
}

impl RawKeyEvent {
    pub fn down(vk_code: u32) -> Self {
        Self {
            transition: KeyTransition::Down,
            vk_code,
        }
    }

    pub fn up(vk_code: u32) -> Self {
        Self {
            transition: KeyTransition::Up,
            vk_code,
        }
    }
}

/// Message identifiers a low-level keyboard hook receives in `wParam`.
pub mod wm {
    pub const KEYDOWN: u32 = 0x0100;
    pub const KEYUP: u32 = 0x0101;
    pub const SYSKEYDOWN: u32 = 0x0104;
    pub const SYSKEYUP: u32 = 0x0105;
}

/// Maps a hook message to a transition.  `SYSKEYDOWN`/`SYSKEYUP` (keys pressed
/// with Alt, and F10) count as ordinary presses; anything else is ignored.
pub fn transition_for(message: u32) -> Option<KeyTransition> {
    match message {
        wm::KEYDOWN | wm::SYSKEYDOWN => Some(KeyTransition::Down),
        wm::KEYUP | wm::SYSKEYUP => Some(KeyTransition::Up),
        _ => None,
    }
}

/// Error type for keyboard hook operations.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to install keyboard hook: {0}")]
    InstallationFailed(String),
    #[error("failed to remove keyboard hook: {0}")]
    UninstallFailed(String),
    #[error("failed to spawn dispatch thread: {0}")]
    DispatchThread(String),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting the OS keyboard hook.
///
/// The production implementation uses `WH_KEYBOARD_LL`; tests use
/// [`mock::MockKeyboardHook`].
pub trait KeyboardHook: Send + Sync {
    /// Installs the hook and returns a receiver for captured transitions.
    ///
    /// The receiver disconnects once [`KeyboardHook::uninstall`] has completed.
    fn install(&self) -> Result<mpsc::Receiver<RawKeyEvent>, HookError>;
    /// Removes the hook.  No events are delivered after this returns `Ok`, and
    /// the receiver handed out by `install` disconnects.
    ///
    /// On `Err` the hook is still installed and `uninstall` may be retried.
    fn uninstall(&self) -> Result<(), HookError>;
}

/// Hook used on platforms without a low-level keyboard hook.
#[derive(Debug, Default)]
pub struct UnsupportedKeyboardHook;

impl KeyboardHook for UnsupportedKeyboardHook {
    fn install(&self) -> Result<mpsc::Receiver<RawKeyEvent>, HookError> {
        Err(HookError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }

    fn uninstall(&self) -> Result<(), HookError> {
        Ok(())
    }
}

/// Returns the keyboard hook for the current platform.
pub fn platform_hook() -> Box<dyn KeyboardHook> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsKeyboardHook::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(UnsupportedKeyboardHook)
    }
}
