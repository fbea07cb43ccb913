//! v1 wire payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use splitkit_core::{Assignment, VisitorId};

/// Visitor as returned by the service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VisitorResponse {
    /// Authoritative visitor ID.
    pub id: VisitorId,
    /// Assignments the service knows about.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// `POST /api/v1/identifier` response.
#[derive(Debug, Deserialize)]
pub(crate) struct IdentifierResponse {
    pub visitor: VisitorResponse,
}

/// `POST /api/v1/identifier` form body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentifierRequest {
    /// Kind of identifier, e.g. `myapp_user_id`.
    pub identifier_type: String,
    /// Identifier value.
    pub value: String,
    /// Visitor the identifier is being linked from.
    pub visitor_id: VisitorId,
}

/// Outcome reported by the analytics provider, sent as `mixpanel_result`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsOutcome {
    /// Analytics recorded the assignment.
    Success,
    /// Analytics failed to record the assignment.
    Failure,
}

impl From<bool> for AnalyticsOutcome {
    fn from(success: bool) -> Self {
        if success { Self::Success } else { Self::Failure }
    }
}

/// `POST /api/v1/assignment_event` form body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssignmentEvent {
    /// Visitor the assignment belongs to.
    pub visitor_id: VisitorId,
    /// Split assigned.
    pub split_name: String,
    /// Context the assignment was made in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Analytics outcome; present only on the follow-up request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixpanel_result: Option<AnalyticsOutcome>,
}

/// `POST /api/v1/assignment_override` form body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssignmentOverride {
    /// Visitor being overridden.
    pub visitor_id: VisitorId,
    /// Split overridden.
    pub split_name: String,
    /// Forced variant.
    pub variant: String,
    /// Context tag for the override.
    pub context: String,
    /// Always [`AnalyticsOutcome::Success`]; overrides skip analytics.
    pub mixpanel_result: AnalyticsOutcome,
}

/// Basic-auth credentials for operator overrides.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Operator username.
    pub username: String,
    /// Operator password.
    pub password: String,
}

impl Credentials {
    /// Build credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_response_unwraps_visitor() {
        let json = serde_json::json!({
            "visitor": {
                "id": "server-id",
                "assignments": [{"split_name": "jabba", "variant": "puppet", "context": "login", "unsynced": false}]
            }
        });
        let resp: IdentifierResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.visitor.id.as_str(), "server-id");
        assert_eq!(resp.visitor.assignments.len(), 1);
    }

    #[test]
    fn visitor_response_without_assignments() {
        let resp: VisitorResponse = serde_json::from_value(serde_json::json!({"id": "x"})).unwrap();
        assert!(resp.assignments.is_empty());
    }

    #[test]
    fn assignment_event_omits_absent_result() {
        let event = AssignmentEvent {
            visitor_id: VisitorId::from("v"),
            split_name: "jabba".to_string(),
            context: Some("home".to_string()),
            mixpanel_result: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("mixpanel_result").is_none());

        let event = AssignmentEvent {
            mixpanel_result: Some(AnalyticsOutcome::Failure),
            ..event
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["mixpanel_result"], "failure");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("admin", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }
}
