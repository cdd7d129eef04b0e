//! Signal handling for graceful shutdown.
//!
//! Long scans expose a cooperative abort point between files: workers hold a
//! shared `AtomicBool` flag and stop as soon as it flips. [`install_handler`]
//! wires that flag to Ctrl+C. The process-level hook is installed once; later
//! calls reuse the same flag, so the handler can be requested repeatedly
//! (e.g. from tests) without error.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once, OnceLock};

static SHUTDOWN_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();
static INSTALL_HOOK: Once = Once::new();

/// Shutdown handle shared between the driver and worker loops.
///
/// Wraps an `AtomicBool` that is set when Ctrl+C is received (or when
/// [`ShutdownHandler::request_shutdown`] is called directly).
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a standalone handler with a fresh flag, not connected to any
    /// signal. Useful in tests and embedding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown programmatically.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get the underlying flag to pass to worker loops.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the Ctrl+C hook and return a handler over the process-wide flag.
///
/// The hook sets the flag and prints a short notice to stderr; the scan loop
/// finishes the current file and exits with code 130.
pub fn install_handler() -> ShutdownHandler {
    let flag = Arc::clone(SHUTDOWN_FLAG.get_or_init(|| Arc::new(AtomicBool::new(false))));

    INSTALL_HOOK.call_once(|| {
        let hook_flag = Arc::clone(&flag);
        if let Err(e) = ctrlc::set_handler(move || {
            hook_flag.store(true, Ordering::SeqCst);
            let _ = writeln!(std::io::stderr(), "Interrupted. Cleaning up...");
        }) {
            log::warn!("Failed to install Ctrl+C handler: {}", e);
        }
    });

    ShutdownHandler { flag }
}
