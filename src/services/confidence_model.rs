//! Confidence scoring.
//!
//! Maps a pass's raw per-dimension scores to the aggregate
//! [`Confidence`] consumed by convergence, escalation, and
//! arbitration. Pure: never calls out to a reasoning tier.

use std::collections::BTreeMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::confidence::Confidence;

/// Pure scoring over raw sub-dimension values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceModel;

impl ConfidenceModel {
    /// Validate raw scores and compute the geometric-mean aggregate.
    ///
    /// NaN or negative inputs are rejected as validation errors,
    /// never coerced. Scores above 1.0 are clamped down to 1.0. An
    /// empty score map is rejected: a pass that reports no dimensions
    /// has no measurable confidence.
    ///
    /// The geometric mean makes any single weak dimension dominate
    /// the aggregate; a zero dimension zeroes it outright.
    pub fn aggregate(scores: &BTreeMap<String, f64>) -> DomainResult<Confidence> {
        if scores.is_empty() {
            return Err(DomainError::EmptyConfidenceDimensions);
        }

        let mut clamped = BTreeMap::new();
        for (name, &value) in scores {
            if value.is_nan() || value < 0.0 {
                return Err(DomainError::InvalidDimensionScore {
                    dimension: name.clone(),
                    value,
                });
            }
            clamped.insert(name.clone(), value.min(1.0));
        }

        let aggregate = if clamped.values().any(|&v| v == 0.0) {
            0.0
        } else {
            // Geometric mean in log space to avoid underflow on many
            // small dimensions.
            let log_sum: f64 = clamped.values().map(|v| v.ln()).sum();
            let mean = (log_sum / clamped.len() as f64).exp();
            mean.clamp(0.0, 1.0)
        };

        Ok(Confidence::from_parts(aggregate, clamped))
    }
}
