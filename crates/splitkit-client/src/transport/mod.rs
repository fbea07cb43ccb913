//! Remote service transport.
//!
//! [`Transport`] is the seam between the session and the network. The
//! session treats every call as an opaque async operation that may fail;
//! [`HttpTransport`] is the `reqwest` implementation of the v1 protocol.

mod http;
mod types;

use async_trait::async_trait;
use splitkit_core::VisitorId;

use crate::errors::Result;

pub use http::HttpTransport;
pub use types::{
    AnalyticsOutcome, AssignmentEvent, AssignmentOverride, Credentials, IdentifierRequest,
    VisitorResponse,
};

/// Calls the client makes against the remote assignment service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a visitor and their assignments.
    async fn get_visitor(&self, visitor_id: &VisitorId) -> Result<VisitorResponse>;

    /// Link an identifier to a visitor; returns the authoritative visitor.
    async fn post_identifier(&self, request: &IdentifierRequest) -> Result<VisitorResponse>;

    /// Record that an assignment happened.
    async fn post_assignment_event(&self, event: &AssignmentEvent) -> Result<()>;

    /// Force a visitor's assignment (operator path, basic auth).
    async fn post_assignment_override(
        &self,
        assignment: &AssignmentOverride,
        credentials: &Credentials,
    ) -> Result<()>;
}
