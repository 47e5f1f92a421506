//! Infrastructure layer of the hotkey daemon.
//!
//! Contains OS-facing adapters: the keyboard hook, the worker-pool executor,
//! the audio endpoint, the overlay bridge, and configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and `hotkey_core`,
//! but MUST NOT be imported by the domain layer.

pub mod audio;
pub mod executor;
pub mod keyboard_hook;
pub mod overlay;
pub mod storage;
