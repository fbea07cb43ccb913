//! Assignment records and the per-visitor assignment registry.
//!
//! An [`Assignment`] is an immutable value. Changing a visitor's assignment
//! means inserting a new record into the [`AssignmentRegistry`], never
//! mutating one in place, so a clone captured by an in-flight notification
//! keeps the values it was created with.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A visitor's assignment to one split.
///
/// Serializes to the v1 wire shape: `split_name`, `variant`, `context`,
/// `unsynced`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    split_name: String,
    /// `None` means "not computed yet"; it is recomputed on next access.
    variant: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    unsynced: bool,
}

impl Assignment {
    /// Create an assignment.
    pub fn new(
        split_name: impl Into<String>,
        variant: Option<String>,
        context: Option<String>,
        unsynced: bool,
    ) -> Self {
        Self {
            split_name: split_name.into(),
            variant,
            context,
            unsynced,
        }
    }

    /// Split this assignment belongs to.
    pub fn split_name(&self) -> &str {
        &self.split_name
    }

    /// Resolved variant, if computed.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Context the assignment was made in.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Whether the remote service has not yet confirmed this assignment.
    pub fn is_unsynced(&self) -> bool {
        self.unsynced
    }

    /// Copy of this assignment with the unsynced flag cleared.
    #[must_use]
    pub fn synced(&self) -> Self {
        Self {
            unsynced: false,
            ..self.clone()
        }
    }

    /// Copy of this assignment re-pointed at `variant` in `context`, unsynced.
    #[must_use]
    pub fn reassigned(&self, variant: impl Into<String>, context: Option<String>) -> Self {
        Self {
            split_name: self.split_name.clone(),
            variant: Some(variant.into()),
            context,
            unsynced: true,
        }
    }
}

/// Mapping from split name to the visitor's current [`Assignment`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentRegistry {
    assignments: HashMap<String, Assignment>,
}

impl AssignmentRegistry {
    /// Build a registry from a list. Later duplicates replace earlier ones.
    pub fn from_assignments(assignments: impl IntoIterator<Item = Assignment>) -> Self {
        Self {
            assignments: assignments
                .into_iter()
                .map(|a| (a.split_name.clone(), a))
                .collect(),
        }
    }

    /// Assignment for a split, if any.
    pub fn get(&self, split_name: &str) -> Option<&Assignment> {
        self.assignments.get(split_name)
    }

    /// Variant for a split, only if the assignment exists and is computed.
    pub fn variant(&self, split_name: &str) -> Option<&str> {
        self.get(split_name).and_then(Assignment::variant)
    }

    /// Insert or replace the entry for the assignment's split.
    pub fn insert(&mut self, assignment: Assignment) -> Option<Assignment> {
        self.assignments
            .insert(assignment.split_name.clone(), assignment)
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether there are no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// All assignments, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    /// Assignments the remote service has not confirmed.
    pub fn unsynced(&self) -> Vec<Assignment> {
        self.assignments
            .values()
            .filter(|a| a.unsynced)
            .cloned()
            .collect()
    }

    /// `{split: variant}` for every computed assignment.
    pub fn variants(&self) -> BTreeMap<String, String> {
        self.assignments
            .values()
            .filter_map(|a| Some((a.split_name.clone(), a.variant.clone()?)))
            .collect()
    }

    /// Merge authoritative assignments into this registry.
    ///
    /// Entries in `authoritative` replace local ones for the same split;
    /// local entries for splits it does not mention are kept.
    #[must_use]
    pub fn merged_with(&self, authoritative: impl IntoIterator<Item = Assignment>) -> Self {
        let mut merged = self.clone();
        for assignment in authoritative {
            let _ = merged.insert(assignment);
        }
        merged
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(split: &str, variant: &str) -> Assignment {
        Assignment::new(split, Some(variant.to_string()), Some("home".to_string()), false)
    }

    #[test]
    fn deserializes_v1_wire_shape() {
        let json = serde_json::json!({
            "split_name": "jabba",
            "variant": "puppet",
            "context": "home",
            "unsynced": true
        });
        let a: Assignment = serde_json::from_value(json).unwrap();
        assert_eq!(a.split_name(), "jabba");
        assert_eq!(a.variant(), Some("puppet"));
        assert_eq!(a.context(), Some("home"));
        assert!(a.is_unsynced());
    }

    #[test]
    fn missing_context_and_unsynced_default() {
        let json = serde_json::json!({"split_name": "wine", "variant": null});
        let a: Assignment = serde_json::from_value(json).unwrap();
        assert_eq!(a.variant(), None);
        assert_eq!(a.context(), None);
        assert!(!a.is_unsynced());
    }

    #[test]
    fn synced_leaves_original_untouched() {
        let original = Assignment::new("jabba", Some("cgi".to_string()), None, true);
        let synced = original.synced();
        assert!(original.is_unsynced());
        assert!(!synced.is_unsynced());
        assert_eq!(synced.variant(), Some("cgi"));
    }

    #[test]
    fn variant_skips_uncomputed_entries() {
        let registry = AssignmentRegistry::from_assignments([
            assignment("jabba", "cgi"),
            Assignment::new("wine", None, None, false),
        ]);
        assert_eq!(registry.variant("jabba"), Some("cgi"));
        assert_eq!(registry.variant("wine"), None);
        assert!(registry.get("wine").is_some());
        assert_eq!(registry.variants().len(), 1);
    }

    #[test]
    fn merge_prefers_authoritative_and_keeps_local_only() {
        let local = AssignmentRegistry::from_assignments([
            assignment("jabba", "cgi"),
            assignment("element", "earth"),
        ]);
        let merged = local.merged_with([assignment("jabba", "puppet"), assignment("wine", "red")]);

        let variants = merged.variants();
        assert_eq!(variants.len(), 3);
        assert_eq!(variants["jabba"], "puppet");
        assert_eq!(variants["element"], "earth");
        assert_eq!(variants["wine"], "red");
        assert_eq!(local.variant("jabba"), Some("cgi"));
    }

    #[test]
    fn unsynced_lists_only_unconfirmed() {
        let registry = AssignmentRegistry::from_assignments([
            assignment("jabba", "cgi"),
            Assignment::new("wine", Some("red".to_string()), None, true),
        ]);
        let unsynced = registry.unsynced();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0].split_name(), "wine");
    }
}
