//! Ctrl+C handling for cooperative cancellation.
//!
//! A scan is cancelled by raising a shared `AtomicBool`. The walker checks
//! it before yielding each entry and the fingerprint workers check it
//! before starting each file; the finder then reports
//! [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted)
//! instead of partial groups.
//!
//! ```rust,no_run
//! use blockdupe::config::ScanConfig;
//! use blockdupe::duplicates::DuplicateFinder;
//! use blockdupe::signal::install_handler;
//!
//! let handler = install_handler();
//! let finder = DuplicateFinder::new(ScanConfig::new(vec![".".into()]))
//!     .with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption: 128 + SIGINT.
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared cancellation flag.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation of every scan holding this flag.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get the flag to hand to a [`DuplicateFinder`](crate::duplicates::DuplicateFinder).
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag so the handler can guard another scan.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler and return its flag holder.
///
/// The OS hook is registered once per process. Later calls return the
/// same handler with its flag cleared. If the hook cannot be registered
/// (another library owns it), the returned handler still works for
/// [`ShutdownHandler::request_shutdown`].
pub fn install_handler() -> ShutdownHandler {
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        let flag = handler.get_flag();

        let hooked = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\nInterrupted. Stopping scan...");
            let _ = stderr.flush();
            log::info!("Shutdown signal received");
        });
        if let Err(e) = hooked {
            log::debug!("Ctrl+C handler not installed: {}", e);
        }
        handler
    });

    handler.reset();
    handler.clone()
}
