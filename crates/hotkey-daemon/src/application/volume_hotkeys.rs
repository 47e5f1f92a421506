//! The daemon's built-in hotkeys: mute toggle, volume down, volume up.
//!
//! Each action first asks the overlay to show, then drives the audio
//! endpoint.  Stepping the volume while muted unmutes first, so the user
//! always hears the level they just selected.
//!
//! Both collaborators are traits so the actions can be tested with mocks and
//! so the Windows-only audio code stays in the infrastructure layer.

use std::sync::Arc;

use hotkey_core::{HotkeyId, ModifierSet, RegistryError};
use thiserror::Error;
use tracing::warn;

use super::hook_manager::HookManager;

/// Error type for volume operations.
#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("audio endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("audio endpoint call failed: {0}")]
    Os(String),
}

/// The system volume facility.
#[cfg_attr(test, mockall::automock)]
pub trait VolumeControl: Send + Sync {
    fn toggle_mute(&self) -> Result<(), VolumeError>;
    fn is_muted(&self) -> Result<bool, VolumeError>;
    /// Changes the master volume by `delta_percent` points, clamped to 0–100.
    fn step_volume(&self, delta_percent: i32) -> Result<(), VolumeError>;
}

/// The on-screen volume overlay.
///
/// Actions run on worker threads, so implementations must marshal `show` to
/// whichever thread owns the presentation.
#[cfg_attr(test, mockall::automock)]
pub trait Presenter: Send + Sync {
    fn show(&self);
}

/// One combination from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub modifiers: ModifierSet,
    pub vk_code: u32,
}

/// The three built-in combinations plus the step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeBindings {
    pub mute: Binding,
    pub volume_down: Binding,
    pub volume_up: Binding,
    pub step_percent: i32,
}

/// Identifiers of the registered built-in hotkeys.
#[derive(Debug, Clone, Copy)]
pub struct VolumeHotkeyIds {
    pub mute: HotkeyId,
    pub volume_down: HotkeyId,
    pub volume_up: HotkeyId,
}

/// Registers the three built-in hotkeys with `manager`.
///
/// # Errors
///
/// [`RegistryError::AlreadyRegistered`] if a combination is taken (including
/// two of the configured combinations being equal).  Hotkeys registered
/// before the failure are removed again.
pub fn install_volume_hotkeys(
    manager: &HookManager,
    bindings: &VolumeBindings,
    volume: Arc<dyn VolumeControl>,
    presenter: Arc<dyn Presenter>,
) -> Result<VolumeHotkeyIds, RegistryError> {
    let mute = {
        let volume = Arc::clone(&volume);
        let presenter = Arc::clone(&presenter);
        manager.register_with_modifiers(bindings.mute.modifiers, bindings.mute.vk_code, move || {
            toggle_mute(volume.as_ref(), presenter.as_ref())
        })?
    };

    let step = bindings.step_percent;
    let volume_down = {
        let volume = Arc::clone(&volume);
        let presenter = Arc::clone(&presenter);
        manager.register_with_modifiers(
            bindings.volume_down.modifiers,
            bindings.volume_down.vk_code,
            move || step_volume(volume.as_ref(), presenter.as_ref(), -step),
        )
    };
    let volume_down = match volume_down {
        Ok(id) => id,
        Err(e) => {
            let _ = manager.unregister_id(mute);
            return Err(e);
        }
    };

    let volume_up = manager.register_with_modifiers(
        bindings.volume_up.modifiers,
        bindings.volume_up.vk_code,
        move || step_volume(volume.as_ref(), presenter.as_ref(), step),
    );
    let volume_up = match volume_up {
        Ok(id) => id,
        Err(e) => {
            let _ = manager.unregister_id(mute);
            let _ = manager.unregister_id(volume_down);
            return Err(e);
        }
    };

    Ok(VolumeHotkeyIds {
        mute,
        volume_down,
        volume_up,
    })
}

/// Mute-toggle action body.
pub fn toggle_mute(volume: &dyn VolumeControl, presenter: &dyn Presenter) {
    presenter.show();
    if let Err(e) = volume.toggle_mute() {
        warn!("failed to toggle mute: {e}");
    }
}

/// Volume-step action body: unmute if muted, then step by `delta_percent`.
pub fn step_volume(volume: &dyn VolumeControl, presenter: &dyn Presenter, delta_percent: i32) {
    presenter.show();
    match volume.is_muted() {
        Ok(true) => {
            if let Err(e) = volume.toggle_mute() {
                warn!("failed to unmute before volume step: {e}");
            }
        }
        Ok(false) => {}
        Err(e) => warn!("failed to read mute state: {e}"),
    }
    if let Err(e) = volume.step_volume(delta_percent) {
        warn!(delta_percent, "failed to step volume: {e}");
    }
}
