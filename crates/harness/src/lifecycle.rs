//! Run lifecycle hook.
//!
//! Start and stop bracket a whole run. Stopping reports any request that never
//! received a response and then finalizes the log file, exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::logging::{CorrelationLogger, FinalizeSummary, LogFinalizer};

/// Start/stop hook for a run, composed with the shared logger service.
pub struct RunLifecycle {
    logger: Arc<CorrelationLogger>,
    finalizer: LogFinalizer,
    stopped: AtomicBool,
}

impl RunLifecycle {
    /// Creates the hook for the log owned by `logger`.
    pub fn new(logger: Arc<CorrelationLogger>) -> Self {
        let finalizer = LogFinalizer::new(logger.store().path());
        Self {
            logger,
            finalizer,
            stopped: AtomicBool::new(false),
        }
    }

    /// The logger service this hook finalizes.
    pub fn logger(&self) -> &Arc<CorrelationLogger> {
        &self.logger
    }

    /// Announces the run.
    pub fn start(&self) {
        let store = self.logger.store();
        info!(
            run_id = %store.run_id(),
            log = %store.path().display(),
            "Run started"
        );
    }

    /// Reports orphaned requests and finalizes the log.
    ///
    /// Call once all tests have finished. Later calls do nothing and return `None`.
    pub fn stop(&self) -> Option<FinalizeSummary> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            warn!("Run already stopped; skipping finalization");
            return None;
        }

        let orphans = self.logger.report_orphans();
        if orphans > 0 {
            warn!(orphans, "Requests finished without a logged response");
        }

        self.finalizer.finalize()
    }
}
