//! Variant dispatch: `vary` / `ab` options, handler maps and validation.
//!
//! A handler map pairs variant names with closures. Exactly one closure runs
//! per dispatch: the one for the resolved variant, or the default variant's
//! closure when the resolved variant has none (the dispatch is then
//! "defaulted"). The default variant must itself be a key of the map.
//!
//! Mismatches between the handler map and the split's weighting are
//! advisory: they are reported, never raised.

use std::collections::BTreeMap;

use splitkit_core::SplitRegistry;

use crate::errors::{ClientError, Result};

/// Options for [`Session::vary`](crate::Session::vary).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaryOptions {
    /// Where in the product the split is evaluated.
    pub context: String,
    /// Variant used when bucketing is unavailable.
    pub default_variant: String,
}

impl VaryOptions {
    /// Build options.
    pub fn new(context: impl Into<String>, default_variant: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            default_variant: default_variant.into(),
        }
    }

    pub(crate) fn validate(&self, split_name: &str) -> Result<()> {
        if self.context.is_empty() {
            return Err(ClientError::invalid_vary(split_name, "must provide context"));
        }
        if self.default_variant.is_empty() {
            return Err(ClientError::invalid_vary(
                split_name,
                "must provide a default variant",
            ));
        }
        Ok(())
    }
}

/// Options for [`Session::ab`](crate::Session::ab).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbOptions {
    /// Where in the product the split is evaluated.
    pub context: String,
    /// Variant that counts as `true`; `"true"` when unset.
    pub true_variant: Option<String>,
}

impl AbOptions {
    /// Options for a boolean split whose true variant is literally `"true"`.
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            true_variant: None,
        }
    }

    /// Use `variant` as the true variant.
    #[must_use]
    pub fn with_true_variant(mut self, variant: impl Into<String>) -> Self {
        self.true_variant = Some(variant.into());
        self
    }
}

/// Variant name to handler closure.
pub struct Handlers<'a, T> {
    handlers: BTreeMap<String, Box<dyn FnOnce() -> T + 'a>>,
}

impl<'a, T> Handlers<'a, T> {
    /// Empty map.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register the handler for `variant`, replacing any earlier one.
    #[must_use]
    pub fn on(mut self, variant: impl Into<String>, handler: impl FnOnce() -> T + 'a) -> Self {
        let _ = self.handlers.insert(variant.into(), Box::new(handler));
        self
    }

    /// Whether `variant` has a handler.
    pub fn contains(&self, variant: &str) -> bool {
        self.handlers.contains_key(variant)
    }

    /// Configured variant names, sorted.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are configured.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `variant`, or the default's when it has none.
    ///
    /// Returns the handler's value and whether the default ran.
    pub(crate) fn run(mut self, variant: &str, default_variant: &str) -> Option<(T, bool)> {
        if let Some(handler) = self.handlers.remove(variant) {
            return Some((handler(), false));
        }
        let handler = self.handlers.remove(default_variant)?;
        Some((handler(), true))
    }
}

impl<T> Default for Handlers<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a handler dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaryOutcome<T> {
    /// Variant recorded for the visitor.
    pub variant: String,
    /// Value returned by the handler that ran.
    pub value: T,
    /// Whether the resolved variant had no handler and the default ran.
    pub defaulted: bool,
}

/// Fail fast when the default variant has no handler.
pub(crate) fn validate_handlers<T>(
    split_name: &str,
    default_variant: &str,
    handlers: &Handlers<'_, T>,
) -> Result<()> {
    if handlers.contains(default_variant) {
        Ok(())
    } else {
        Err(ClientError::invalid_vary(
            split_name,
            format!("default variant {default_variant} must be one of the configured variants"),
        ))
    }
}

/// Advisory messages comparing a handler map to the split's weighting.
///
/// Empty when the registry is unloaded or the split is unknown. Variants
/// with zero weight are never reported as missing.
pub(crate) fn handler_mismatches<'v>(
    split_name: &str,
    configured: impl IntoIterator<Item = &'v str>,
    registry: &SplitRegistry,
) -> Vec<String> {
    let Some(split) = registry.get(split_name) else {
        return Vec::new();
    };
    let configured: Vec<&str> = configured.into_iter().collect();

    let unknown: Vec<&str> = configured
        .iter()
        .copied()
        .filter(|v| !split.has_variant(v))
        .collect();
    let missing: Vec<&str> = split
        .weighting()
        .iter()
        .filter(|(variant, weight)| **weight > 0 && !configured.contains(&variant.as_str()))
        .map(|(variant, _)| variant.as_str())
        .collect();

    let mut messages = Vec::new();
    if !unknown.is_empty() {
        messages.push(format!(
            "vary for \"{split_name}\" configures unknown variants {}",
            unknown.join(", ")
        ));
    }
    if !missing.is_empty() {
        messages.push(format!(
            "vary for \"{split_name}\" does not configure variants {}",
            missing.join(", ")
        ));
    }
    messages
}

/// The `{true, false}` variant pair derived for a boolean split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AbVariants {
    pub true_variant: String,
    pub false_variant: String,
    /// The split defines more than two variants.
    pub too_many: bool,
}

/// Derive the variant pair for `ab`.
///
/// The false variant is the alphabetically first split variant other than
/// the true variant, or `"false"` when the split is not known.
pub(crate) fn ab_variants(
    split_name: &str,
    true_variant: Option<&str>,
    registry: &SplitRegistry,
) -> AbVariants {
    let true_variant = true_variant.unwrap_or("true").to_string();
    let split = registry.get(split_name);
    let false_variant = split
        .and_then(|s| s.variants().find(|v| *v != true_variant))
        .unwrap_or("false")
        .to_string();
    AbVariants {
        true_variant,
        false_variant,
        too_many: split.is_some_and(|s| s.weighting().len() > 2),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use splitkit_core::{Split, Weighting};

    fn registry(split: &str, pairs: &[(&str, u32)]) -> SplitRegistry {
        let weighting: Weighting = pairs.iter().map(|(v, w)| ((*v).to_string(), *w)).collect();
        SplitRegistry::loaded([Split::new(split, weighting, false)])
    }

    #[test]
    fn options_require_context_and_default() {
        assert!(VaryOptions::new("home", "cgi").validate("jabba").is_ok());
        assert_matches!(
            VaryOptions::new("", "cgi").validate("jabba"),
            Err(ClientError::InvalidVary { .. })
        );
        assert_matches!(
            VaryOptions::new("home", "").validate("jabba"),
            Err(ClientError::InvalidVary { .. })
        );
    }

    #[test]
    fn default_must_have_handler() {
        let handlers = Handlers::new().on("puppet", || 1);
        let err = validate_handlers("jabba", "cgi", &handlers).unwrap_err();
        assert!(err.to_string().contains("default variant cgi"));
        assert!(validate_handlers("jabba", "puppet", &handlers).is_ok());
    }

    #[test]
    fn run_prefers_matching_handler() {
        let handlers = Handlers::new().on("puppet", || "p").on("cgi", || "c");
        assert_eq!(handlers.run("puppet", "cgi"), Some(("p", false)));
    }

    #[test]
    fn run_falls_back_to_default() {
        let handlers = Handlers::new().on("puppet", || "p").on("cgi", || "c");
        assert_eq!(handlers.run("claymation", "cgi"), Some(("c", true)));
    }

    #[test]
    fn handlers_may_borrow() {
        let mut hits = 0;
        {
            let handlers = Handlers::new().on("puppet", || hits += 1);
            let _ = handlers.run("puppet", "puppet");
        }
        assert_eq!(hits, 1);
    }

    #[test]
    fn mismatches_report_unknown_and_missing() {
        let reg = registry("jabba", &[("cgi", 50), ("puppet", 50)]);
        let messages = handler_mismatches("jabba", ["puppet", "claymation"], &reg);
        assert_eq!(
            messages,
            vec![
                "vary for \"jabba\" configures unknown variants claymation".to_string(),
                "vary for \"jabba\" does not configure variants cgi".to_string(),
            ]
        );
    }

    #[test]
    fn zero_weight_variant_is_not_missing() {
        let reg = registry("jabba", &[("cgi", 0), ("puppet", 100)]);
        assert!(handler_mismatches("jabba", ["puppet"], &reg).is_empty());
    }

    #[test]
    fn mismatches_suppressed_when_unloaded() {
        assert!(handler_mismatches("jabba", ["anything"], &SplitRegistry::Unloaded).is_empty());
    }

    #[test]
    fn ab_defaults_to_true_and_first_other_variant() {
        let reg = registry("dark_mode", &[("true", 50), ("false", 50)]);
        let pair = ab_variants("dark_mode", None, &reg);
        assert_eq!(pair.true_variant, "true");
        assert_eq!(pair.false_variant, "false");
        assert!(!pair.too_many);
    }

    #[test]
    fn ab_with_custom_true_variant() {
        let reg = registry("jabba", &[("cgi", 50), ("puppet", 50)]);
        let pair = ab_variants("jabba", Some("puppet"), &reg);
        assert_eq!(pair.true_variant, "puppet");
        assert_eq!(pair.false_variant, "cgi");
    }

    #[test]
    fn ab_unknown_split_uses_literal_false() {
        let pair = ab_variants("jabba", Some("puppet"), &SplitRegistry::Unloaded);
        assert_eq!(pair.false_variant, "false");
        assert!(!pair.too_many);
    }

    #[test]
    fn ab_flags_more_than_two_variants() {
        let reg = registry("element", &[("earth", 25), ("fire", 25), ("water", 50)]);
        let pair = ab_variants("element", Some("fire"), &reg);
        assert_eq!(pair.false_variant, "earth");
        assert!(pair.too_many);
    }
}
