//! Hotkey daemon entry point.
//!
//! Wires the keyboard hook, the hotkey service, the audio endpoint and the
//! overlay together, then runs until Ctrl+C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()              -- TOML, defaults when absent
//!  └─ HookManager::start()
//!       ├─ hotkey-hook-loop      (OS hook + message loop thread)
//!       └─ hotkey-dispatch       (ordered state machine thread)
//!  └─ install_volume_hotkeys()   -- Ctrl+F10 / F11 / F12 by default
//!  └─ Overlay::run()             (Tokio task, owns the overlay)
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hotkey_daemon::application::hook_manager::HookManager;
use hotkey_daemon::application::volume_hotkeys::install_volume_hotkeys;
use hotkey_daemon::infrastructure::audio::platform_volume_control;
use hotkey_daemon::infrastructure::executor::TokioActionExecutor;
use hotkey_daemon::infrastructure::keyboard_hook::platform_hook;
use hotkey_daemon::infrastructure::overlay::Overlay;
use hotkey_daemon::infrastructure::storage::{load_config, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config is loaded before logging so its level can seed the filter; a
    // load error is reported once the subscriber exists.
    let loaded = load_config();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    info!("hotkey daemon starting");
    if let Err(e) = &loaded {
        warn!("using default configuration: {e}");
    }

    run(config).await
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let (overlay, overlay_handle) = Overlay::new(Duration::from_millis(config.overlay.display_ms));

    let manager = HookManager::new(platform_hook(), Arc::new(TokioActionExecutor::current()));
    manager
        .start()
        .context("failed to start the global keyboard hook")?;

    let bindings = config.volume_bindings();
    let ids = install_volume_hotkeys(
        &manager,
        &bindings,
        platform_volume_control(),
        Arc::new(overlay_handle),
    )
    .context("failed to register volume hotkeys")?;
    info!(
        mute = %ids.mute,
        volume_down = %ids.volume_down,
        volume_up = %ids.volume_up,
        "volume hotkeys registered"
    );

    // The overlay task only ends if every handle is gone, which cannot happen
    // while the registered actions hold theirs.
    tokio::select! {
        () = overlay.run() => warn!("overlay task ended unexpectedly"),
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => warn!("failed to listen for shutdown signal: {e}"),
        },
    }

    manager.unregister_all();
    manager
        .stop()
        .context("failed to remove the global keyboard hook")?;
    info!("hotkey daemon stopped");
    Ok(())
}
