//! Domain errors for the adjutant decision core.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::ports::reasoning::InvokerError;

/// Domain-level errors surfaced to callers of the core.
///
/// Validation failures reject the offending partial result with a
/// typed error; data is never silently coerced.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid confidence score for dimension '{dimension}': {value} (must be finite and non-negative)")]
    InvalidDimensionScore { dimension: String, value: f64 },

    #[error("Confidence requires at least one sub-dimension score")]
    EmptyConfidenceDimensions,

    #[error("Non-recommended action option '{category}' is missing a rejection reason")]
    MissingRejectionReason { category: String },

    #[error("{0} action options are marked recommended; at most one is allowed")]
    MultipleRecommendedActions(usize),

    #[error("Analysis of event {event_id} failed before any pass completed")]
    FirstPassFailed {
        event_id: Uuid,
        #[source]
        source: InvokerError,
    },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
