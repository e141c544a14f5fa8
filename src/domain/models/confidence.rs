//! Calibrated confidence with named sub-dimensions.
//!
//! A pass's confidence is decomposed into named sub-dimensions (for
//! example `action_certainty`, `entity_certainty`,
//! `destination_certainty`, `urgency_certainty`). The aggregate is the
//! geometric mean of the dimensions, so a single very weak dimension
//! suppresses the whole score instead of averaging away.
//!
//! Values of this type are only produced by
//! [`ConfidenceModel`](crate::services::ConfidenceModel), which
//! validates and clamps the raw scores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An aggregate confidence score in `[0, 1]` plus its decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    aggregate: f64,
    dimensions: BTreeMap<String, f64>,
}

impl Confidence {
    /// Assemble a confidence from pre-validated parts.
    ///
    /// Callers outside the confidence model must not construct this
    /// directly; the invariants (aggregate in `[0, 1]`, dimensions
    /// clamped) are established during aggregation.
    pub(crate) fn from_parts(aggregate: f64, dimensions: BTreeMap<String, f64>) -> Self {
        Self {
            aggregate,
            dimensions,
        }
    }

    /// The aggregate score in `[0, 1]`.
    pub fn aggregate(&self) -> f64 {
        self.aggregate
    }

    /// Look up a single sub-dimension score by name.
    pub fn dimension(&self, name: &str) -> Option<f64> {
        self.dimensions.get(name).copied()
    }

    /// All sub-dimension scores, ordered by name.
    pub fn dimensions(&self) -> &BTreeMap<String, f64> {
        &self.dimensions
    }
}
