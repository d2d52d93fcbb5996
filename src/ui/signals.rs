use crate::error::{Result, TimingError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ctrl-C state for a run. The first interrupt lets the current log finish
/// and stops before the next one; a second interrupt exits at once.
pub struct GracefulShutdown {
    interrupts: Arc<AtomicUsize>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let interrupts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&interrupts);

        ctrlc::set_handler(move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                eprintln!("\ninterrupted: stopping after this log, interrupt again to quit now");
            } else {
                std::process::exit(130);
            }
        })
        .map_err(|e| TimingError::Config {
            message: format!("Cannot install Ctrl-C handler: {}", e),
        })?;

        Ok(Self { interrupts })
    }

    /// No handler behind it; only `request_shutdown` trips it.
    #[cfg(test)]
    pub(crate) fn unregistered() -> Self {
        Self {
            interrupts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.interrupts.load(Ordering::SeqCst) == 0
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(TimingError::Cancelled)
        }
    }

    pub fn request_shutdown(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shutdown_cancels() {
        let shutdown = GracefulShutdown::unregistered();
        assert!(shutdown.is_running());
        assert!(shutdown.check_shutdown().is_ok());

        shutdown.request_shutdown();
        assert!(!shutdown.is_running());
        assert!(matches!(shutdown.check_shutdown(), Err(TimingError::Cancelled)));

        shutdown.request_shutdown();
        assert!(matches!(shutdown.check_shutdown(), Err(TimingError::Cancelled)));
    }
}
