//! Core Audio adapter for the default render endpoint.
//!
//! Actions run on pool threads that may never have touched COM, so every call
//! initialises COM for its thread and resolves the current default endpoint.
//! That also follows the user switching output devices between keystrokes.
//!
//! # Safety
//!
//! `unsafe` is used only for COM calls; each block is annotated.

#![cfg(target_os = "windows")]

use windows::core::BOOL;
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{eMultimedia, eRender, IMMDeviceEnumerator, MMDeviceEnumerator};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CLSCTX_ALL, COINIT_MULTITHREADED,
};

use super::stepped_level;
use crate::application::volume_hotkeys::{VolumeControl, VolumeError};

/// Master volume of the default multimedia render device.
#[derive(Debug, Default)]
pub struct EndpointVolumeControl;

impl EndpointVolumeControl {
    pub fn new() -> Self {
        Self
    }

    fn endpoint(&self) -> Result<IAudioEndpointVolume, VolumeError> {
        // SAFETY: COM initialisation is per-thread and idempotent for the same
        // apartment; S_FALSE (already initialised) is not an error here.
        let _ = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };

        // SAFETY: Standard Core Audio activation sequence on an initialised
        // COM thread; every interface is reference-counted by the bindings.
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(unavailable)?;
            let device = enumerator
                .GetDefaultAudioEndpoint(eRender, eMultimedia)
                .map_err(unavailable)?;
            device
                .Activate::<IAudioEndpointVolume>(CLSCTX_ALL, None)
                .map_err(unavailable)
        }
    }
}

impl VolumeControl for EndpointVolumeControl {
    fn toggle_mute(&self) -> Result<(), VolumeError> {
        let endpoint = self.endpoint()?;
        // SAFETY: `endpoint` is a live IAudioEndpointVolume.
        unsafe {
            let muted = endpoint.GetMute().map_err(os)?.as_bool();
            endpoint
                .SetMute(BOOL::from(!muted), std::ptr::null())
                .map_err(os)
        }
    }

    fn is_muted(&self) -> Result<bool, VolumeError> {
        let endpoint = self.endpoint()?;
        // SAFETY: `endpoint` is a live IAudioEndpointVolume.
        unsafe { endpoint.GetMute().map(|b| b.as_bool()).map_err(os) }
    }

    fn step_volume(&self, delta_percent: i32) -> Result<(), VolumeError> {
        let endpoint = self.endpoint()?;
        // SAFETY: `endpoint` is a live IAudioEndpointVolume.
        unsafe {
            let current = endpoint.GetMasterVolumeLevelScalar().map_err(os)?;
            endpoint
                .SetMasterVolumeLevelScalar(stepped_level(current, delta_percent), std::ptr::null())
                .map_err(os)
        }
    }
}

fn unavailable(e: windows::core::Error) -> VolumeError {
    VolumeError::Unavailable(e.to_string())
}

fn os(e: windows::core::Error) -> VolumeError {
    VolumeError::Os(e.to_string())
}
