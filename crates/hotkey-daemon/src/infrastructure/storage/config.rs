//! TOML-based configuration for the hotkey daemon.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\HotkeyDaemon\config.toml`
//! - Linux:    `~/.config/hotkey-daemon/config.toml`
//! - macOS:    `~/Library/Application Support/HotkeyDaemon/config.toml`
//!
//! A missing file is not an error: the defaults reproduce the classic layout
//! (Ctrl+F10 mute, Ctrl+F11 volume down, Ctrl+F12 volume up, 2 % steps).
//!
//! ```toml
//! [service]
//! log_level = "debug"
//!
//! [bindings]
//! volume_up = { modifiers = ["Control", "Shift"], key = 0x26 }
//! ```
//!
//! # Partial files
//!
//! Every section and field carries a `#[serde(default)]`, so a file that only
//! overrides one binding still yields a complete configuration.

use std::path::{Path, PathBuf};

use hotkey_core::keymap::vk;
use hotkey_core::{ModifierKind, ModifierSet};
use serde::Deserialize;
use thiserror::Error;

use crate::application::volume_hotkeys::{Binding, VolumeBindings};

/// Failure to locate, read or parse the daemon configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `APPDATA` nor `HOME`/`XDG_CONFIG_HOME` is set.
    #[error("no config directory for this platform")]
    NoPlatformConfigDir,

    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`AppConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub volume: VolumeConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub bindings: BindingsConfig,
}

/// General daemon settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Volume stepping.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VolumeConfig {
    /// Percent points per volume-up/down press.
    #[serde(default = "default_step_percent")]
    pub step_percent: u8,
}

/// On-screen overlay.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OverlayConfig {
    /// How long the overlay stays visible after being shown.
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,
}

/// One key combination as written in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BindingConfig {
    #[serde(default)]
    pub modifiers: Vec<ModifierKind>,
    /// Windows Virtual Key code (TOML accepts `0x7A` hex literals).
    pub key: u32,
}

/// The built-in hotkeys.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BindingsConfig {
    #[serde(default = "default_mute")]
    pub mute: BindingConfig,
    #[serde(default = "default_volume_down")]
    pub volume_down: BindingConfig,
    #[serde(default = "default_volume_up")]
    pub volume_up: BindingConfig,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_step_percent() -> u8 {
    2
}
fn default_display_ms() -> u64 {
    1500
}
fn ctrl(key: u32) -> BindingConfig {
    BindingConfig {
        modifiers: vec![ModifierKind::Control],
        key,
    }
}
fn default_mute() -> BindingConfig {
    ctrl(vk::F10)
}
fn default_volume_down() -> BindingConfig {
    ctrl(vk::F11)
}
fn default_volume_up() -> BindingConfig {
    ctrl(vk::F12)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            step_percent: default_step_percent(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            display_ms: default_display_ms(),
        }
    }
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            mute: default_mute(),
            volume_down: default_volume_down(),
            volume_up: default_volume_up(),
        }
    }
}

// ── Conversion to application types ───────────────────────────────────────────

impl BindingConfig {
    pub fn to_binding(&self) -> Binding {
        Binding {
            modifiers: self.modifiers.iter().collect::<ModifierSet>(),
            vk_code: self.key,
        }
    }
}

impl AppConfig {
    /// The built-in hotkeys in the form the application layer registers.
    pub fn volume_bindings(&self) -> VolumeBindings {
        VolumeBindings {
            mute: self.bindings.mute.to_binding(),
            volume_down: self.bindings.volume_down.to_binding(),
            volume_up: self.bindings.volume_up.to_binding(),
            step_percent: i32::from(self.volume.step_percent),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Path of `config.toml` inside the platform config directory.
///
/// # Errors
///
/// [`ConfigError::NoPlatformConfigDir`] when no base directory is known.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not exist.
///
/// # Errors
///
/// [`ConfigError::Io`] when the file exists but cannot be read;
/// [`ConfigError::Parse`] when its contents do not match the schema.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`; see [`load_config`].
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolves the platform config directory for this application.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("HotkeyDaemon"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hotkey-daemon"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("HotkeyDaemon")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_are_ctrl_f10_f11_f12() {
        let bindings = AppConfig::default().volume_bindings();

        assert_eq!(bindings.mute.vk_code, 0x79);
        assert_eq!(bindings.volume_down.vk_code, 0x7A);
        assert_eq!(bindings.volume_up.vk_code, 0x7B);
        assert_eq!(bindings.mute.modifiers, ModifierSet::from(ModifierKind::Control));
        assert_eq!(bindings.step_percent, 2);
    }

    #[test]
    fn test_default_overlay_and_log_level() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.overlay.display_ms, 1500);
        assert_eq!(cfg.service.log_level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_bindings_override_only_named_entries() {
        // Arrange
        let toml_str = r#"
[bindings]
volume_up = { modifiers = ["Shift", "Control"], key = 0x26 }
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");
        let bindings = cfg.volume_bindings();

        // Assert
        assert_eq!(bindings.volume_up.vk_code, 0x26);
        assert_eq!(
            bindings.volume_up.modifiers,
            ModifierKind::Control | ModifierKind::Shift
        );
        assert_eq!(bindings.mute.vk_code, 0x79, "unspecified bindings keep defaults");
    }

    #[test]
    fn test_binding_without_modifiers_is_bare_key() {
        let cfg: AppConfig = toml::from_str("[bindings]\nmute = { key = 0xAD }\n")
            .expect("deserialize");
        assert!(cfg.volume_bindings().mute.modifiers.is_empty());
    }

    #[test]
    fn test_unknown_modifier_name_is_parse_error() {
        let result: Result<AppConfig, toml::de::Error> =
            toml::from_str("[bindings]\nmute = { modifiers = [\"Hyper\"], key = 1 }\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let cfg = load_config_from(&path).expect("missing file is not an error");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reads_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("hotkey_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[volume]\nstep_percent = 5\n[service]\nlog_level = \"debug\"\n")
            .unwrap();

        // Act
        let cfg = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(cfg.volume.step_percent, 5);
        assert_eq!(cfg.service.log_level, "debug");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("hotkey_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[volume\n").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
        // NoPlatformConfigDir in a stripped environment is also acceptable.
    }
}
