//! Windows low-level keyboard hook implementation.
//!
//! This module installs a `WH_KEYBOARD_LL` hook on a dedicated Win32
//! message-loop thread.  Windows calls the hook procedure on the thread that
//! installed it, so the event sender lives in a thread-local owned by that
//! thread: no process-wide mutable state is needed and the callback never
//! takes a lock.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE,
    WH_KEYBOARD_LL, WM_QUIT, WM_USER,
};

use super::{transition_for, HookError, KeyboardHook, RawKeyEvent};

thread_local! {
    /// Sender used by the hook procedure.  Set only on the hook loop thread.
    static EVENT_SENDER: RefCell<Option<Sender<RawKeyEvent>>> = const { RefCell::new(None) };
}

/// Handle to the running hook loop thread.
struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

/// Windows low-level keyboard hook.
pub struct WindowsKeyboardHook {
    thread: Mutex<Option<HookThread>>,
}

impl WindowsKeyboardHook {
    /// Creates a new (uninstalled) hook.
    pub fn new() -> Self {
        Self {
            thread: Mutex::new(None),
        }
    }
}

impl Default for WindowsKeyboardHook {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardHook for WindowsKeyboardHook {
    fn install(&self) -> Result<mpsc::Receiver<RawKeyEvent>, HookError> {
        let mut slot = self.thread.lock();
        if slot.is_some() {
            return Err(HookError::InstallationFailed(
                "keyboard hook is already installed".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel::<RawKeyEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<u32, String>>(1);

        let handle = thread::Builder::new()
            .name("hotkey-hook-loop".to_string())
            .spawn(move || run_hook_message_loop(tx, ready_tx))
            .map_err(|e| HookError::InstallationFailed(e.to_string()))?;

        // The loop thread reports whether SetWindowsHookExW succeeded before
        // it starts pumping messages.
        let thread_id = match ready_rx.recv() {
            Ok(Ok(id)) => id,
            Ok(Err(reason)) => {
                let _ = handle.join();
                return Err(HookError::InstallationFailed(reason));
            }
            Err(_) => {
                let _ = handle.join();
                return Err(HookError::InstallationFailed(
                    "hook loop thread exited before reporting".to_string(),
                ));
            }
        };

        info!(thread_id, "low-level keyboard hook installed");
        *slot = Some(HookThread { thread_id, handle });
        Ok(rx)
    }

    fn uninstall(&self) -> Result<(), HookError> {
        let mut slot = self.thread.lock();
        let Some(thread_id) = slot.as_ref().map(|t| t.thread_id) else {
            return Ok(());
        };

        // The thread stays in the slot until WM_QUIT is posted, so a failed
        // post can be retried and nobody joins a loop that will not exit.
        // SAFETY: Posting WM_QUIT to a thread we spawned; the id came from
        // GetCurrentThreadId on that thread and it owns a message queue.
        unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }.map_err(|e| {
            warn!(thread_id, "failed to post WM_QUIT to hook loop thread: {e}");
            HookError::UninstallFailed(e.to_string())
        })?;

        if let Some(hook_thread) = slot.take() {
            if hook_thread.handle.join().is_err() {
                warn!("hook loop thread panicked during shutdown");
            }
        }
        info!("low-level keyboard hook removed");
        Ok(())
    }
}

impl Drop for WindowsKeyboardHook {
    fn drop(&mut self) {
        if let Err(e) = self.uninstall() {
            warn!("keyboard hook left installed on drop: {e}");
        }
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(
    sender: Sender<RawKeyEvent>,
    ready: mpsc::SyncSender<Result<u32, String>>,
) {
    EVENT_SENDER.with(|slot| *slot.borrow_mut() = Some(sender));

    // SAFETY: SetWindowsHookExW requires the calling thread to run a message
    // loop, which this thread does below.  A null module handle is accepted
    // for WH_KEYBOARD_LL because the procedure lives in this process.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) }
    {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    let mut msg = MSG::default();
    // SAFETY: Peeking creates this thread's message queue, so WM_QUIT posted
    // by `uninstall` cannot be lost before the loop below starts.
    let thread_id = unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
        GetCurrentThreadId()
    };
    if ready.send(Ok(thread_id)).is_err() {
        // SAFETY: `hook` was returned by SetWindowsHookExW above.
        unsafe { UnhookWindowsHookEx(hook).ok() };
        return;
    }

    // Win32 message loop – blocks until WM_QUIT is posted
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        UnhookWindowsHookEx(hook).ok();
    }

    // Dropping the sender disconnects the dispatch thread's receiver.
    EVENT_SENDER.with(|slot| slot.borrow_mut().take());
    debug!("hook loop thread exiting");
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// This function is called by Windows from the hook message loop thread.
/// It must return quickly to avoid hook removal by the OS, so it only sends
/// the transition and always forwards the event to the next hook.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        if let Some(transition) = transition_for(w_param.0 as u32) {
            // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
            let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
            let event = RawKeyEvent {
                transition,
                vk_code: kbs.vkCode,
            };
            EVENT_SENDER.with(|slot| {
                if let Some(sender) = slot.borrow().as_ref() {
                    // Ignore send errors (receiver gone during shutdown).
                    let _ = sender.send(event);
                }
            });
        }
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
