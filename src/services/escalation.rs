//! Tier escalation policy.
//!
//! Decides, after each completed pass, whether the next pass stays on
//! the current tier, climbs one rung, or whether the analysis is done.
//! This is a deterministic decision table, not a continuous function.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::models::config::AnalysisConfig;
use crate::domain::models::event::PerceivedEvent;
use crate::domain::models::pass::{PassType, ReasoningTier};

/// Outcome of the decision table for one pass boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationDecision {
    /// Confidence is sufficient; stop the loop
    Converge,
    /// Run another pass at the same tier
    Continue {
        tier: ReasoningTier,
        pass_type: PassType,
    },
    /// Move up to a more capable tier
    Escalate {
        tier: ReasoningTier,
        pass_type: PassType,
    },
}

/// Escalation controller: decision table plus the high-stakes
/// predicate.
#[derive(Debug, Clone)]
pub struct EscalationController {
    config: AnalysisConfig,
}

impl EscalationController {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Decide what follows the pass that just completed.
    ///
    /// Rules, first match wins:
    /// 1. High stakes without an expert pass yet: escalate straight
    ///    to expert. Stakes beat every confidence rule, including
    ///    convergence, so a stakes-flagged event never finishes early
    ///    without expert review.
    /// 2. Aggregate at or above the convergence threshold: converge.
    /// 3. Fewer than the minimum refinement rounds so far: keep
    ///    refining at the current tier.
    /// 4. Aggregate at or above the escalation floor: converge, the
    ///    judgment is good enough to arbitrate.
    /// 5. Otherwise climb one rung (fast-cheap -> balanced as a deep
    ///    pass, balanced -> expert), or keep grinding at expert when
    ///    already there.
    pub fn next_pass(
        &self,
        pass_number: u32,
        aggregate: f64,
        stakes_pending_expert: bool,
        current_tier: ReasoningTier,
    ) -> EscalationDecision {
        if stakes_pending_expert {
            return EscalationDecision::Escalate {
                tier: ReasoningTier::Expert,
                pass_type: PassType::Expert,
            };
        }

        if aggregate >= self.config.convergence_confidence {
            return EscalationDecision::Converge;
        }

        if pass_number < self.config.min_refine_passes {
            return EscalationDecision::Continue {
                tier: current_tier,
                pass_type: PassType::Refine,
            };
        }

        if aggregate >= self.config.escalation_floor {
            return EscalationDecision::Converge;
        }

        match current_tier {
            ReasoningTier::FastCheap => EscalationDecision::Escalate {
                tier: ReasoningTier::Balanced,
                pass_type: PassType::Deep,
            },
            ReasoningTier::Balanced => EscalationDecision::Escalate {
                tier: ReasoningTier::Expert,
                pass_type: PassType::Expert,
            },
            ReasoningTier::Expert => EscalationDecision::Continue {
                tier: ReasoningTier::Expert,
                pass_type: PassType::Expert,
            },
        }
    }

    /// Which high-stakes criteria the event meets right now.
    ///
    /// Evaluated every pass and OR-combined by the orchestrator, so
    /// the flag is sticky once any criterion has fired. Past-due
    /// deadlines count as within the window.
    pub fn high_stakes_reasons(
        &self,
        event: &PerceivedEvent,
        now: DateTime<Utc>,
    ) -> Vec<&'static str> {
        let mut reasons = Vec::new();

        if let (Some(amount), Some(threshold)) = (
            event.monetary_amount,
            self.config.high_stakes_amount_threshold,
        ) {
            if amount > threshold {
                reasons.push("monetary_amount");
            }
        }

        if let Some(deadline) = event.deadline {
            let window = Duration::hours(self.config.high_stakes_deadline_hours);
            if deadline.signed_duration_since(now) <= window {
                reasons.push("deadline");
            }
        }

        if self
            .config
            .vip_senders
            .iter()
            .any(|vip| vip.eq_ignore_ascii_case(&event.sender))
        {
            reasons.push("vip_sender");
        }

        if !reasons.is_empty() {
            debug!(event_id = %event.id, ?reasons, "high-stakes criteria met");
        }
        reasons
    }

    pub fn is_high_stakes(&self, event: &PerceivedEvent, now: DateTime<Utc>) -> bool {
        !self.high_stakes_reasons(event, now).is_empty()
    }
}
