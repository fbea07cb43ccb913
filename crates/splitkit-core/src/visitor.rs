//! Visitor state: identity plus assignment registry.

use crate::assignment::{Assignment, AssignmentRegistry};
use crate::ids::VisitorId;

/// A visitor and everything the client knows about their assignments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visitor {
    id: VisitorId,
    assignments: AssignmentRegistry,
    offline: bool,
}

impl Visitor {
    /// Visitor with a known ID and initial assignments.
    pub fn new(id: VisitorId, assignments: impl IntoIterator<Item = Assignment>) -> Self {
        Self {
            id,
            assignments: AssignmentRegistry::from_assignments(assignments),
            offline: false,
        }
    }

    /// Fresh anonymous visitor with a generated ID and no assignments.
    pub fn anonymous() -> Self {
        Self::new(VisitorId::generate(), Vec::new())
    }

    /// Visitor whose state could not be fetched. Keeps the ID, starts with no
    /// assignments, and suppresses assignment notifications.
    pub fn offline(id: VisitorId) -> Self {
        Self {
            id,
            assignments: AssignmentRegistry::default(),
            offline: true,
        }
    }

    /// Visitor ID.
    pub fn id(&self) -> &VisitorId {
        &self.id
    }

    /// Current assignments.
    pub fn assignments(&self) -> &AssignmentRegistry {
        &self.assignments
    }

    /// Whether the initial load failed and notifications are suppressed.
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Record (insert or replace) an assignment.
    pub fn record(&mut self, assignment: Assignment) {
        let _ = self.assignments.insert(assignment);
    }

    /// Adopt a server-confirmed identity.
    ///
    /// The ID is replaced. Server assignments win for splits present on both
    /// sides; local assignments the server did not echo are preserved. The
    /// server is reachable again, so an offline visitor comes back online.
    pub fn link(&mut self, id: VisitorId, server_assignments: impl IntoIterator<Item = Assignment>) {
        self.assignments = self.assignments.merged_with(server_assignments);
        self.id = id;
        self.offline = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(split: &str, variant: &str) -> Assignment {
        Assignment::new(split, Some(variant.to_string()), None, false)
    }

    #[test]
    fn offline_visitor_keeps_id_and_drops_assignments() {
        let visitor = Visitor::offline(VisitorId::from("X"));
        assert_eq!(visitor.id().as_str(), "X");
        assert!(visitor.assignments().is_empty());
        assert!(visitor.is_offline());
    }

    #[test]
    fn anonymous_visitor_is_online_and_empty() {
        let visitor = Visitor::anonymous();
        assert!(!visitor.is_offline());
        assert!(visitor.assignments().is_empty());
    }

    #[test]
    fn link_replaces_id_and_merges() {
        let mut visitor = Visitor::new(
            VisitorId::from("local"),
            [assignment("jabba", "cgi"), assignment("element", "earth")],
        );
        visitor.link(
            VisitorId::from("server"),
            [assignment("jabba", "puppet"), assignment("wine", "red")],
        );

        assert_eq!(visitor.id().as_str(), "server");
        let variants = visitor.assignments().variants();
        assert_eq!(variants.len(), 3);
        assert_eq!(variants["jabba"], "puppet");
        assert_eq!(variants["element"], "earth");
        assert_eq!(variants["wine"], "red");
    }

    #[test]
    fn link_brings_offline_visitor_online() {
        let mut visitor = Visitor::offline(VisitorId::from("X"));
        visitor.link(VisitorId::from("server"), Vec::new());
        assert!(!visitor.is_offline());
    }

    #[test]
    fn record_replaces_entry() {
        let mut visitor = Visitor::new(VisitorId::from("v"), [assignment("jabba", "cgi")]);
        visitor.record(assignment("jabba", "puppet"));
        assert_eq!(visitor.assignments().variant("jabba"), Some("puppet"));
        assert_eq!(visitor.assignments().len(), 1);
    }
}
