//! Concrete collaborator implementations.
//!
//! - [`FileVisitorStorage`] / [`MemoryVisitorStorage`] for the visitor ID
//! - [`TracingAnalytics`] / [`NoopAnalytics`] for assignment tracking
//! - [`TracingErrorLogger`] for diagnostics

mod analytics;
mod error_logger;
mod storage;

pub use analytics::{NoopAnalytics, TracingAnalytics};
pub use error_logger::TracingErrorLogger;
pub use storage::{FileVisitorStorage, MemoryVisitorStorage};
