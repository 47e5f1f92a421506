//! Storage infrastructure: TOML configuration.
//!
//! The daemon only reads its configuration; registrations made at runtime are
//! never written back.

pub mod config;

pub use config::{load_config, AppConfig, ConfigError};
