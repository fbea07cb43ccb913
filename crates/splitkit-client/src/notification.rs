//! Assignment notification protocol.
//!
//! A newly generated assignment is reported on two independent paths that
//! start together:
//!
//! 1. an `assignment_event` request carrying visitor, split and context;
//! 2. the analytics provider, followed once it resolves by a second
//!    `assignment_event` request that adds `mixpanel_result`.
//!
//! The remote service's durability model expects both requests, so they are
//! not collapsed into one. Every failure is formatted into the error
//! logger; nothing propagates to the caller and nothing is retried.

use std::sync::Arc;

use splitkit_core::{Assignment, VisitorId};
use tracing::{debug, instrument};

use crate::errors::ClientError;
use crate::traits::{Analytics, ErrorLogger};
use crate::transport::{
    AnalyticsOutcome, AssignmentEvent, AssignmentOverride, Credentials, Transport,
};

/// Context tag recorded on operator overrides.
pub const OVERRIDE_CONTEXT: &str = "override";

/// Sends assignment notifications through the session's collaborators.
#[derive(Clone)]
pub(crate) struct Notifier {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) analytics: Arc<dyn Analytics>,
    pub(crate) error_logger: Arc<dyn ErrorLogger>,
}

impl Notifier {
    /// Run the full protocol for one assignment.
    #[instrument(skip_all, fields(visitor_id = %visitor_id, split = assignment.split_name()))]
    pub(crate) async fn send(&self, visitor_id: VisitorId, assignment: Assignment) {
        let persist = self.persist(&visitor_id, &assignment, None);
        let track = async {
            match self
                .analytics
                .track_assignment(&visitor_id, &assignment)
                .await
            {
                Ok(success) => {
                    self.persist(&visitor_id, &assignment, Some(success.into()))
                        .await;
                }
                Err(e) => {
                    self.error_logger
                        .log(&format!("splitkit trackAssignment error: {e}"));
                }
            }
        };
        let ((), ()) = tokio::join!(persist, track);
    }

    async fn persist(
        &self,
        visitor_id: &VisitorId,
        assignment: &Assignment,
        mixpanel_result: Option<AnalyticsOutcome>,
    ) {
        let event = AssignmentEvent {
            visitor_id: visitor_id.clone(),
            split_name: assignment.split_name().to_string(),
            context: assignment.context().map(str::to_string),
            mixpanel_result,
        };
        match self.transport.post_assignment_event(&event).await {
            Ok(()) => debug!(result = ?mixpanel_result, "assignment notified"),
            Err(e) => self.report("persistAssignment", &e),
        }
    }

    /// Persist an operator override. Overrides skip analytics and are always
    /// marked successful.
    #[instrument(skip_all, fields(visitor_id = %visitor_id, split = split_name))]
    pub(crate) async fn persist_override(
        &self,
        visitor_id: VisitorId,
        split_name: &str,
        variant: &str,
        credentials: &Credentials,
    ) {
        let assignment = AssignmentOverride {
            visitor_id,
            split_name: split_name.to_string(),
            variant: variant.to_string(),
            context: OVERRIDE_CONTEXT.to_string(),
            mixpanel_result: AnalyticsOutcome::Success,
        };
        if let Err(e) = self
            .transport
            .post_assignment_override(&assignment, credentials)
            .await
        {
            self.report("persistAssignment", &e);
        }
    }

    fn report(&self, operation: &str, error: &ClientError) {
        self.error_logger
            .log(&format!("splitkit {operation} error: {error}"));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
