//! Reasoning invoker port.
//!
//! Abstracts the mechanism that actually runs a reasoning tier over a
//! prompt. The core never talks to a model directly; it hands a
//! [`PromptContext`] to an implementation of this trait and receives
//! structured per-dimension scores plus candidate actions and
//! enrichments back.
//!
//! Implementations are shared services. They must be `Send + Sync`
//! for concurrent use across analyses, and rate limiting is their
//! responsibility, not the core's.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::models::action::EventInterpretation;
use crate::domain::models::event::PerceivedEvent;
use crate::domain::models::pass::{PassType, ReasoningTier, TokenUsage};

use super::retrieval::ContextItem;

/// Everything a reasoning tier sees for one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContext {
    /// The event under analysis
    pub event: PerceivedEvent,
    /// 1-based pass number
    pub pass_number: u32,
    /// Role of this pass
    pub pass_type: PassType,
    /// The previous pass's structured judgment, if any
    pub previous: Option<EventInterpretation>,
    /// Doubts the previous pass asked this one to resolve
    pub open_questions: Vec<String>,
    /// Retrieved context items (empty for the blind pass)
    pub context_items: Vec<ContextItem>,
}

/// Structured output of one reasoning call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPassOutput {
    /// Per-dimension confidence scores; validated and aggregated by
    /// the confidence model
    pub scores: BTreeMap<String, f64>,
    /// Candidate actions and proposed enrichments
    pub interpretation: EventInterpretation,
    /// Doubts raised but not answered, for the next pass
    pub open_questions: Vec<String>,
    /// Named entities found in the event, used to query retrieval
    /// before the next pass
    pub entities: Vec<String>,
    /// Token cost of the call
    pub usage: TokenUsage,
}

/// Error types for reasoning invocations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvokerError {
    #[error("Reasoning call timed out after {0}s")]
    Timeout(u64),

    #[error("Malformed reasoning output: {0}")]
    MalformedOutput(String),

    #[error("Reasoning tier unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Reasoning call failed: {0}")]
    Failed(String),
}

/// Port trait for reasoning-tier invocation.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for concurrent use across
/// tokio tasks.
#[async_trait]
pub trait ReasoningInvoker: Send + Sync {
    /// Unique identifier for this invoker implementation.
    fn invoker_id(&self) -> &str;

    /// Run one reasoning pass on the given tier.
    ///
    /// # Errors
    /// - `InvokerError::Timeout` - the call exceeded its budget
    /// - `InvokerError::MalformedOutput` - output could not be parsed
    /// - `InvokerError::Unavailable` / `RateLimited` / `Failed` -
    ///   transport or execution trouble
    async fn invoke(
        &self,
        tier: ReasoningTier,
        context: &PromptContext,
    ) -> Result<RawPassOutput, InvokerError>;
}
