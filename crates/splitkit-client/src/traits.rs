//! Dependency injection traits for the session's collaborators.
//!
//! The session owns the visitor state and calls out through these traits for
//! everything host-specific: where the visitor ID is kept, which analytics
//! vendor records assignments, and where diagnostics go. Concrete
//! implementations live in [`crate::providers`].

use async_trait::async_trait;
use splitkit_core::{Assignment, VisitorId};

use crate::errors::{AnalyticsError, StorageError};

/// Persistence for the visitor ID between sessions.
pub trait VisitorStorage: Send + Sync {
    /// Previously stored visitor ID, if any.
    fn visitor_id(&self) -> Option<VisitorId>;

    /// Store the visitor ID.
    fn set_visitor_id(&self, visitor_id: &VisitorId) -> Result<(), StorageError>;
}

/// Analytics sink for assignment and identity events.
#[async_trait]
pub trait Analytics: Send + Sync {
    /// Record an assignment.
    ///
    /// Resolves to `Ok(true)` when the vendor durably recorded it and
    /// `Ok(false)` when it did not. `Err` means the call itself failed.
    async fn track_assignment(
        &self,
        visitor_id: &VisitorId,
        assignment: &Assignment,
    ) -> Result<bool, AnalyticsError>;

    /// Associate subsequent events with a logged-in visitor.
    fn identify(&self, visitor_id: &VisitorId);

    /// Alias a newly signed-up visitor.
    fn alias(&self, visitor_id: &VisitorId);
}

/// Sink for human-readable diagnostics.
///
/// Receives formatted strings only, never visitor state.
pub trait ErrorLogger: Send + Sync {
    /// Report one diagnostic message.
    fn log(&self, message: &str);
}

impl<F> ErrorLogger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message);
    }
}
