//! Default diagnostics sink.

use crate::traits::ErrorLogger;

/// Forwards diagnostics to `tracing` at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingErrorLogger;

impl ErrorLogger for TracingErrorLogger {
    fn log(&self, message: &str) {
        tracing::error!(target: "splitkit", "{message}");
    }
}
