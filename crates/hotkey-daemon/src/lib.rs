//! Global hotkey service and the volume daemon built on it.
//!
//! The binary in `main.rs` and the tests under `tests/` both link this
//! library, so they exercise the same hook manager and adapters.

pub mod application;
pub mod infrastructure;
