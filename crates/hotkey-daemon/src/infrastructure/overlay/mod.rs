//! Overlay bridge: thread-affine presentation of the volume overlay.
//!
//! Hotkey actions run on worker threads, but the overlay belongs to one owner
//! task.  [`OverlayHandle::show`] therefore only posts a command; the
//! [`Overlay`] task applies it.  This daemon is headless, so "visible" is a
//! state tracked and logged by the task rather than a native window.
//!
//! Behaviour:
//!
//! - `show` while hidden makes the overlay visible and arms an auto-close
//!   timer of `display` duration.
//! - `show` while visible is ignored (the timer is not extended).
//! - `close` hides immediately.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::application::volume_hotkeys::Presenter;

/// Commands accepted by the overlay task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCommand {
    Show,
    Close,
}

/// Cloneable, thread-safe sender side of the overlay.
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    tx: mpsc::UnboundedSender<OverlayCommand>,
    visible: watch::Receiver<bool>,
}

impl OverlayHandle {
    pub fn close(&self) {
        let _ = self.tx.send(OverlayCommand::Close);
    }

    /// Returns the visibility last published by the overlay task.
    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Returns a receiver that observes every visibility change.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.clone()
    }
}

impl Presenter for OverlayHandle {
    fn show(&self) {
        // Send errors mean the overlay task has exited during shutdown.
        let _ = self.tx.send(OverlayCommand::Show);
    }
}

/// The overlay owner.  Run with [`Overlay::run`] on the presentation task.
pub struct Overlay {
    rx: mpsc::UnboundedReceiver<OverlayCommand>,
    visible: watch::Sender<bool>,
    display: Duration,
}

impl Overlay {
    /// Creates the overlay and its handle.
    pub fn new(display: Duration) -> (Self, OverlayHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (visible_tx, visible_rx) = watch::channel(false);
        let overlay = Self {
            rx,
            visible: visible_tx,
            display,
        };
        let handle = OverlayHandle {
            tx,
            visible: visible_rx,
        };
        (overlay, handle)
    }

    /// Processes commands until every handle has been dropped.
    pub async fn run(mut self) {
        let mut close_at: Option<Instant> = None;

        loop {
            let command = match close_at {
                Some(deadline) => {
                    tokio::select! {
                        command = self.rx.recv() => command,
                        () = sleep_until(deadline) => {
                            close_at = None;
                            self.set_visible(false);
                            debug!("overlay auto-closed");
                            continue;
                        }
                    }
                }
                None => self.rx.recv().await,
            };

            match command {
                Some(OverlayCommand::Show) if close_at.is_none() => {
                    close_at = Some(Instant::now() + self.display);
                    self.set_visible(true);
                    info!("overlay shown");
                }
                Some(OverlayCommand::Show) => {}
                Some(OverlayCommand::Close) => {
                    close_at = None;
                    self.set_visible(false);
                    debug!("overlay closed");
                }
                None => break,
            }
        }
    }

    fn set_visible(&self, visible: bool) {
        self.visible.send_replace(visible);
    }
}
