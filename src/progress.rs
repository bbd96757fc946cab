//! Progress reporting using indicatif.
//!
//! The scan pipeline reports through the [`ProgressCallback`] trait and
//! never touches a terminal itself. [`Progress`] is the terminal
//! implementation used by the binary: a spinner while walking and a bar
//! while fingerprinting, both drawn on stderr so stdout stays clean for
//! the report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name reported while the walker runs.
pub const PHASE_WALKING: &str = "walking";

/// Phase name reported while files are fingerprinted.
pub const PHASE_FINGERPRINTING: &str = "fingerprinting";

/// Progress callback for the scan phases.
///
/// Implementations must be thread-safe: fingerprinting reports from every
/// worker thread.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALKING`] or [`PHASE_FINGERPRINTING`])
    /// * `total` - Number of items to process, or 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item as it is picked up.
    ///
    /// # Arguments
    ///
    /// * `current` - Item number (1-based). Not monotonic across threads.
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a file has been fingerprinted, with its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Terminal progress reporter.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    fingerprinting: Mutex<Option<ProgressBar>>,
    bytes: AtomicU64,
    quiet: bool,
}

fn lock(slot: &Mutex<Option<ProgressBar>>) -> MutexGuard<'_, Option<ProgressBar>> {
    // A panicking progress update leaves nothing inconsistent behind
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockdupe::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
        };
        Self {
            multi,
            walking: Mutex::new(None),
            fingerprinting: Mutex::new(None),
            bytes: AtomicU64::new(0),
            quiet,
        }
    }

    /// Bytes fingerprinted so far.
    #[must_use]
    pub fn bytes_processed(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn fingerprinting_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking");
                pb.enable_steady_tick(Duration::from_millis(100));
                *lock(&self.walking) = Some(pb);
            }
            PHASE_FINGERPRINTING => {
                self.bytes.store(0, Ordering::Relaxed);
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::fingerprinting_style());
                pb.set_message("Fingerprinting");
                *lock(&self.fingerprinting) = Some(pb);
            }
            other => log::debug!("Ignoring unknown progress phase: {}", other),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *lock(&self.fingerprinting) {
            // Workers report out of order; count instead of positioning
            pb.inc(1);
            pb.set_message(truncate_path(path, 30));
        } else if let Some(ref pb) = *lock(&self.walking) {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_item_completed(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                if let Some(pb) = lock(&self.walking).take() {
                    pb.finish_with_message("Walking complete");
                }
            }
            PHASE_FINGERPRINTING => {
                if let Some(pb) = lock(&self.fingerprinting).take() {
                    pb.finish_with_message(format!(
                        "Fingerprinted {}",
                        ByteSize::b(self.bytes_processed())
                    ));
                }
            }
            _ => {}
        }
    }
}

/// Shorten a path to its file name, keeping at most `max_len` characters.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let count = file_name.chars().count();
    if count + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(count.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
