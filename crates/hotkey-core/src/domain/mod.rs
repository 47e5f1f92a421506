//! Domain types for the hotkey daemon.
//!
//! Pure rules only: nothing in here touches the OS hook, threads, or the
//! async runtime.  The only synchronisation primitives are the locks inside
//! [`registry::HotkeyRegistry`] and [`input_state::InputState`], which let both
//! be shared between the hook dispatch thread and registration callers.

pub mod hotkey;
pub mod input_state;
pub mod modifiers;
pub mod registry;
