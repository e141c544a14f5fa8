//! Pass and analysis-result domain models.
//!
//! One pass is a single round-trip through a reasoning tier. An
//! analysis owns an ordered [`PassHistory`] and terminates by
//! producing exactly one [`MultiPassResult`], which is never mutated
//! afterward; re-analysis builds a brand-new result.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::EventInterpretation;
use super::confidence::Confidence;

/// A cost/capability level of reasoning available to a pass.
///
/// Ordered by capability and cost: escalation only ever moves upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningTier {
    /// Cheap, fast, weakest judgment. Every analysis starts here.
    FastCheap,
    /// Mid-range reasoning for passes that stalled on the cheap tier.
    Balanced,
    /// Most capable and most expensive. Mandatory for high-stakes events.
    Expert,
}

impl ReasoningTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FastCheap => "fast_cheap",
            Self::Balanced => "balanced",
            Self::Expert => "expert",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fast_cheap" | "fast-cheap" => Some(Self::FastCheap),
            "balanced" => Some(Self::Balanced),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }

    /// The next tier up, or `None` when already at `Expert`.
    pub fn next_up(&self) -> Option<Self> {
        match self {
            Self::FastCheap => Some(Self::Balanced),
            Self::Balanced => Some(Self::Expert),
            Self::Expert => None,
        }
    }
}

/// The role a pass plays in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassType {
    /// First pass: no retrieved context, unbiased baseline judgment
    Blind,
    /// Context-augmented refinement at the current tier
    Refine,
    /// Escalated reasoning on the balanced tier
    Deep,
    /// Final arbitration at the highest tier
    Expert,
}

impl PassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blind => "blind",
            Self::Refine => "refine",
            Self::Deep => "deep",
            Self::Expert => "expert",
        }
    }

    /// Whether this pass type receives retrieved context.
    ///
    /// Only the blind baseline runs without it.
    pub fn is_context_augmented(&self) -> bool {
        !matches!(self, Self::Blind)
    }
}

/// Why an analysis stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Aggregate confidence reached the point where more passes are
    /// not worth their cost
    ConfidenceSufficient,
    /// Two consecutive passes produced byte-identical structured output
    NoChangeBetweenPasses,
    /// The pass budget ran out
    MaxPassesReached,
    /// The reasoning invoker failed twice on the same pass; the last
    /// completed pass's output stands
    InvokerFailure,
    /// The caller cancelled the analysis at a pass boundary
    Cancelled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfidenceSufficient => "confidence_sufficient",
            Self::NoChangeBetweenPasses => "no_change_between_passes",
            Self::MaxPassesReached => "max_passes_reached",
            Self::InvokerFailure => "invoker_failure",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Token consumption reported by the reasoning invoker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn add(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// The immutable record of one completed pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassResult {
    /// 1-based pass number within the analysis
    pub pass_number: u32,
    /// Role this pass played
    pub pass_type: PassType,
    /// Tier the pass ran on
    pub tier: ReasoningTier,
    /// Aggregate confidence going into the pass (0.0 on pass 1)
    pub confidence_before: f64,
    /// Confidence produced by the pass
    pub confidence: Confidence,
    /// Wall-clock time spent in the pass, including retrieval
    pub elapsed: Duration,
    /// Token cost reported by the invoker
    pub usage: TokenUsage,
    /// Doubts this pass raised for the next pass to resolve
    pub open_questions: Vec<String>,
    /// Whether the escalation controller escalated after this pass
    pub triggered_escalation: bool,
    /// Whether context retrieval was invoked for this pass
    pub context_searched: bool,
    /// How many context items retrieval returned
    pub context_items_returned: usize,
    /// The structured judgment the pass produced
    pub interpretation: EventInterpretation,
}

impl PassResult {
    /// How much the aggregate moved relative to the previous pass.
    pub fn confidence_delta(&self) -> f64 {
        self.confidence.aggregate() - self.confidence_before
    }
}

/// Ordered pass records owned by a single in-flight analysis.
///
/// Never shared across analyses; each analysis appends to its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassHistory {
    passes: Vec<PassResult>,
}

impl PassHistory {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn push(&mut self, pass: PassResult) {
        self.passes.push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn last(&self) -> Option<&PassResult> {
        self.passes.last()
    }

    /// The pass before the most recent one, if any.
    pub fn previous(&self) -> Option<&PassResult> {
        self.passes.len().checked_sub(2).and_then(|i| self.passes.get(i))
    }

    pub fn passes(&self) -> &[PassResult] {
        &self.passes
    }

    /// Tiers in order of first use, without duplicates.
    pub fn tiers_used(&self) -> Vec<ReasoningTier> {
        let mut tiers = Vec::new();
        for pass in &self.passes {
            if !tiers.contains(&pass.tier) {
                tiers.push(pass.tier);
            }
        }
        tiers
    }

    pub fn used_tier(&self, tier: ReasoningTier) -> bool {
        self.passes.iter().any(|p| p.tier == tier)
    }

    pub fn total_usage(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for pass in &self.passes {
            total.add(pass.usage);
        }
        total
    }

    /// Flag the most recent pass as the one that triggered escalation.
    pub(crate) fn mark_last_triggered_escalation(&mut self) {
        if let Some(last) = self.passes.last_mut() {
            last.triggered_escalation = true;
        }
    }
}

/// Terminal artifact of one analysis.
///
/// Owned exclusively by the caller of the orchestration; read-only
/// after production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPassResult {
    /// The event this analysis examined
    pub event_id: Uuid,
    /// Full ordered pass trail
    pub history: PassHistory,
    /// Number of completed passes
    pub passes_count: u32,
    /// Tier of the final completed pass
    pub final_tier: ReasoningTier,
    /// Tiers in order of first use
    pub tiers_used: Vec<ReasoningTier>,
    /// Whether any pass escalated the tier
    pub escalated: bool,
    /// Which termination condition fired
    pub stop_reason: StopReason,
    /// Whether the event met the high-stakes predicate at any pass
    pub high_stakes: bool,
    /// Summed token cost across passes
    pub total_usage: TokenUsage,
    /// Wall-clock duration of the whole analysis
    pub total_duration: Duration,
    /// The final structured judgment handed to arbitration
    pub interpretation: EventInterpretation,
    /// Degradation notices (retries exhausted, retrieval trouble)
    pub warnings: Vec<String>,
}

impl MultiPassResult {
    /// Whether the expert tier reviewed this event at least once.
    pub fn used_expert_tier(&self) -> bool {
        self.tiers_used.contains(&ReasoningTier::Expert)
    }
}
