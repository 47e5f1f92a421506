//! System volume adapters.
//!
//! On Windows the default render endpoint is driven through Core Audio's
//! `IAudioEndpointVolume`.  Other platforms get [`UnavailableVolumeControl`],
//! whose every call fails with [`VolumeError::Unavailable`].

use std::sync::Arc;

use crate::application::volume_hotkeys::{VolumeControl, VolumeError};

#[cfg(target_os = "windows")]
pub mod windows;

/// Volume control for platforms without an audio adapter.
#[derive(Debug, Default)]
pub struct UnavailableVolumeControl;

impl UnavailableVolumeControl {
    fn error() -> VolumeError {
        VolumeError::Unavailable(format!("no audio adapter for {}", std::env::consts::OS))
    }
}

impl VolumeControl for UnavailableVolumeControl {
    fn toggle_mute(&self) -> Result<(), VolumeError> {
        Err(Self::error())
    }

    fn is_muted(&self) -> Result<bool, VolumeError> {
        Err(Self::error())
    }

    fn step_volume(&self, _delta_percent: i32) -> Result<(), VolumeError> {
        Err(Self::error())
    }
}

/// Returns the volume control for the current platform.
pub fn platform_volume_control() -> Arc<dyn VolumeControl> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::EndpointVolumeControl::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnavailableVolumeControl)
    }
}

/// Applies a percent-point step to a scalar level in `0.0..=1.0`.
pub fn stepped_level(current: f32, delta_percent: i32) -> f32 {
    (current + delta_percent as f32 / 100.0).clamp(0.0, 1.0)
}
