//! # hotkey-core
//!
//! Pure building blocks of the global hotkey daemon: the modifier classifier,
//! the hotkey registry with its set-based matching rule, and the held-key
//! state shared between dispatch workers.
//!
//! This crate has zero dependencies on OS APIs or async runtimes, so every
//! rule in it can be unit-tested on any platform.
//!
//! # Architecture overview (for beginners)
//!
//! A global hotkey is a combination such as `Ctrl+F11` that triggers an action
//! no matter which window has focus.  The daemon sees raw key-down and key-up
//! transitions from the operating system and must decide, for each key-down,
//! whether the keys currently held form a registered combination.
//!
//! - **`keymap`** – Windows virtual-key constants and the function that tells
//!   whether a key code is a modifier (Shift, Control, Alt, Windows key).
//!
//! - **`domain`** – The registry of combinations ([`HotkeyRegistry`]) and the
//!   record of which keys are held right now ([`InputState`]).

pub mod domain;
pub mod keymap;

pub use domain::hotkey::{HotkeyId, HotkeyKey};
pub use domain::input_state::InputState;
pub use domain::modifiers::{ModifierKind, ModifierSet};
pub use domain::registry::{Action, HotkeyRegistry, RegistryError};
pub use keymap::classify;
