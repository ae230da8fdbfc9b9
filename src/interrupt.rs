use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::Interrupted;

/// Shared Ctrl-C flag, polled between download chunks and between pages.
///
/// Also tracks the run's scratch paths (downloaded jar, extraction dir).
/// Their guards normally remove them on drop; a forced exit skips drops, so
/// the second Ctrl-C removes whatever is still registered first.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    scratch: Arc<Mutex<Vec<PathBuf>>>,
}

impl Interrupt {
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_triggered() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Remember a temp file or directory to delete on a forced exit.
    pub fn register_scratch(&self, path: &Path) {
        self.registry().push(path.to_path_buf());
    }

    /// Best-effort removal of every registered path. Paths already removed
    /// by their guards are skipped.
    pub fn remove_scratch(&self) {
        for path in self.registry().drain(..) {
            let removed = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else if path.exists() {
                std::fs::remove_file(&path)
            } else {
                continue;
            };
            match removed {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) => warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }

    fn registry(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        // a panic while holding the lock leaves a valid Vec
        self.scratch.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn a task that trips the flag on the first Ctrl-C and, on the
    /// second, removes scratch paths and exits.
    pub fn listen_for_ctrl_c(&self) {
        let interrupt = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            warn!(
                "Interrupt received, finishing current step and cleaning up \
                 (Ctrl-C again to exit now)"
            );
            interrupt.trigger();
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.remove_scratch();
                std::process::exit(130);
            }
        });
    }
}
