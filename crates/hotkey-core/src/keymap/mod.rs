//! Windows Virtual Key (VK) constants and modifier classification.
//!
//! # What is a Windows Virtual Key (VK) code? (for beginners)
//!
//! Windows assigns each keyboard key a number called a "Virtual Key code".
//! These are defined in `<winuser.h>` and named `VK_*` (e.g., `VK_F11 = 0x7A`).
//! Modifier keys have three codes each: a generic one (`VK_CONTROL`) and a
//! left/right pair (`VK_LCONTROL`, `VK_RCONTROL`).  The low-level keyboard hook
//! reports the left/right variants, but synthetic input may carry the generic
//! code, so [`classify`] accepts all of them.
//!
//! Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes

use crate::domain::modifiers::ModifierKind;

/// Well-known virtual key codes used by the daemon and its tests.
pub mod vk {
    pub const SHIFT: u32 = 0x10;
    pub const CONTROL: u32 = 0x11;
    /// `VK_MENU` is the Alt key.
    pub const MENU: u32 = 0x12;
    pub const LWIN: u32 = 0x5B;
    pub const RWIN: u32 = 0x5C;
    pub const LSHIFT: u32 = 0xA0;
    pub const RSHIFT: u32 = 0xA1;
    pub const LCONTROL: u32 = 0xA2;
    pub const RCONTROL: u32 = 0xA3;
    pub const LMENU: u32 = 0xA4;
    pub const RMENU: u32 = 0xA5;

    pub const F1: u32 = 0x70;
    pub const F10: u32 = 0x79;
    pub const F11: u32 = 0x7A;
    pub const F12: u32 = 0x7B;

    pub const KEY_A: u32 = 0x41;
}

/// Maps a virtual key code to the modifier it represents, if any.
///
/// Every generic and left/right variant of Shift, Control, Alt and the Windows
/// key must appear here; a missing code silently breaks every combination that
/// uses that modifier.
pub fn classify(vk_code: u32) -> Option<ModifierKind> {
    match vk_code {
        vk::SHIFT | vk::LSHIFT | vk::RSHIFT => Some(ModifierKind::Shift),
        vk::CONTROL | vk::LCONTROL | vk::RCONTROL => Some(ModifierKind::Control),
        vk::MENU | vk::LMENU | vk::RMENU => Some(ModifierKind::Alt),
        vk::LWIN | vk::RWIN => Some(ModifierKind::WindowsKey),
        _ => None,
    }
}
