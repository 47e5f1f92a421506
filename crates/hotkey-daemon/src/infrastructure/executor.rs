//! Worker-pool executor for hotkey actions.
//!
//! Each matched action runs as its own task on tokio's blocking pool, so a
//! slow or panicking action can neither stall the dispatch thread nor stop
//! later hotkeys from firing.  Panics are observed through the task's
//! `JoinHandle` and logged with the hotkey id.

use hotkey_core::{Action, HotkeyId};
use tokio::runtime::Handle;
use tracing::{error, trace};

use crate::application::dispatch::ActionExecutor;

/// Runs actions on the tokio blocking pool of the runtime behind `handle`.
#[derive(Debug, Clone)]
pub struct TokioActionExecutor {
    handle: Handle,
}

impl TokioActionExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl ActionExecutor for TokioActionExecutor {
    fn execute(&self, id: HotkeyId, action: Action) {
        let task = self.handle.spawn_blocking(move || action());
        self.handle.spawn(async move {
            match task.await {
                Ok(()) => trace!(%id, "hotkey action completed"),
                Err(e) if e.is_panic() => error!(%id, "hotkey action panicked"),
                Err(e) => error!(%id, "hotkey action did not complete: {e}"),
            }
        });
    }
}
