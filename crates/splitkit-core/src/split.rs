//! Split definitions and the split registry.
//!
//! A [`Split`] is a named experiment (or feature gate) with weighted variants.
//! The [`SplitRegistry`] is either loaded, possibly with zero splits, or
//! unloaded. The two states mean different things: an unloaded registry
//! means nothing is known yet, so callers fall back to defaults and skip
//! variant validation, while a loaded registry that lacks a split is a
//! configuration error.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Variant name to weight. Ordered by variant name, which is the order the
/// calculator walks.
pub type Weighting = BTreeMap<String, u32>;

/// A named split with its variant weighting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    name: String,
    is_feature_gate: bool,
    weighting: Weighting,
}

impl Split {
    /// Create a split from its name, weighting and feature-gate flag.
    pub fn new(name: impl Into<String>, weighting: Weighting, is_feature_gate: bool) -> Self {
        Self {
            name: name.into(),
            is_feature_gate,
            weighting,
        }
    }

    /// Split name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this split is a feature gate rather than a tracked experiment.
    pub fn is_feature_gate(&self) -> bool {
        self.is_feature_gate
    }

    /// Variant weighting.
    pub fn weighting(&self) -> &Weighting {
        &self.weighting
    }

    /// Variant names in lexicographic order.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.weighting.keys().map(String::as_str)
    }

    /// Weight of a variant, `None` if the split does not define it.
    pub fn weight(&self, variant: &str) -> Option<u32> {
        self.weighting.get(variant).copied()
    }

    /// Whether the split defines `variant` at all (zero weight included).
    pub fn has_variant(&self, variant: &str) -> bool {
        self.weighting.contains_key(variant)
    }
}

/// Serialized form of a split, as found in bundled configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitConfig {
    /// Variant weights.
    pub weights: Weighting,
    /// Feature-gate flag.
    #[serde(default, alias = "feature_gate")]
    pub feature_gate: bool,
}

/// Lookup from split name to [`Split`], or explicit absence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SplitRegistry {
    /// The registry has not been fetched or bundled.
    #[default]
    Unloaded,
    /// The registry is known, possibly empty.
    Loaded(HashMap<String, Split>),
}

impl SplitRegistry {
    /// Build a loaded registry from splits.
    pub fn loaded(splits: impl IntoIterator<Item = Split>) -> Self {
        Self::Loaded(
            splits
                .into_iter()
                .map(|split| (split.name.clone(), split))
                .collect(),
        )
    }

    /// Build a loaded registry from its serialized `{name: {weights, featureGate}}` form.
    ///
    /// A split with no variants is rejected; a zero-weight variant is fine.
    pub fn from_config(config: &BTreeMap<String, SplitConfig>) -> Result<Self> {
        let mut splits = Vec::with_capacity(config.len());
        for (name, split) in config {
            if split.weights.is_empty() {
                return Err(CoreError::InvalidSplit {
                    split_name: name.clone(),
                    message: "split defines no variants".to_string(),
                });
            }
            splits.push(Split::new(name, split.weights.clone(), split.feature_gate));
        }
        Ok(Self::loaded(splits))
    }

    /// Whether the registry has been loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Look up a split. Always `None` when unloaded.
    pub fn get(&self, split_name: &str) -> Option<&Split> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(splits) => splits.get(split_name),
        }
    }

    /// Number of known splits (zero when unloaded).
    pub fn len(&self) -> usize {
        match self {
            Self::Unloaded => 0,
            Self::Loaded(splits) => splits.len(),
        }
    }

    /// Whether the registry holds no splits.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten to `{name: weighting}`, the v1 diagnostic shape.
    pub fn as_v1_hash(&self) -> BTreeMap<String, Weighting> {
        match self {
            Self::Unloaded => BTreeMap::new(),
            Self::Loaded(splits) => splits
                .values()
                .map(|split| (split.name.clone(), split.weighting.clone()))
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
