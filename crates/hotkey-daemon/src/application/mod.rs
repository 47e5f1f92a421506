//! Application layer of the hotkey daemon.
//!
//! Use cases here depend on traits (`KeyboardHook`, `ActionExecutor`,
//! `VolumeControl`, `Presenter`) rather than on Windows APIs, so they can be
//! unit-tested with mocks on any platform.
//!
//! # Sub-modules
//!
//! - **`dispatch`**       – The per-keystroke state machine: held modifiers,
//!   auto-repeat suppression, registry lookup, hand-off to workers.
//!
//! - **`hook_manager`**   – Start/stop lifecycle and the registration API.
//!
//! - **`volume_hotkeys`** – The built-in mute / volume-down / volume-up actions.

pub mod dispatch;
pub mod hook_manager;
pub mod volume_hotkeys;
