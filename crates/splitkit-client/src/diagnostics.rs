//! Operator diagnostics: a snapshot of session state and forced overrides.

use std::collections::BTreeMap;

use serde::Serialize;
use splitkit_core::{VisitorId, Weighting};

use crate::session::Session;
use crate::transport::Credentials;

/// Read-only snapshot of a session, in the shape operator tools expect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadInfo {
    /// Current visitor ID.
    pub visitor_id: VisitorId,
    /// `{split: {variant: weight}}`; empty when the registry is unloaded.
    pub split_registry: BTreeMap<String, Weighting>,
    /// `{split: variant}` for every computed assignment.
    pub assignment_registry: BTreeMap<String, String>,
}

/// Diagnostic operations on a session.
pub struct Diagnostics<'a> {
    session: &'a Session,
}

impl Session {
    /// Diagnostic operations for this session.
    pub fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics { session: self }
    }
}

impl Diagnostics<'_> {
    /// Snapshot visitor ID, split registry and assignments.
    pub fn load_info(&self) -> LoadInfo {
        let (visitor_id, assignment_registry) = self
            .session
            .with_visitor(|v| (v.id().clone(), v.assignments().variants()));
        LoadInfo {
            visitor_id,
            split_registry: self.session.split_registry().as_v1_hash(),
            assignment_registry,
        }
    }

    /// Force the current visitor's assignment on the service.
    ///
    /// Authenticates with basic auth and records the `override` context.
    /// Failures go to the error logger. The local assignment is left as is;
    /// the override takes effect when the visitor is next loaded.
    pub async fn persist_assignment(&self, split_name: &str, variant: &str, username: &str, password: &str) {
        let credentials = Credentials::new(username, password);
        self.session
            .notifier()
            .persist_override(self.session.visitor_id(), split_name, variant, &credentials)
            .await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
