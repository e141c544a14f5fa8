//! Action and enrichment arbitration.
//!
//! Takes the final [`MultiPassResult`] and decides what executes
//! automatically versus what is queued for human review, explaining
//! every rejected alternative. Pure and deterministic: arbitrating
//! the same unmodified result twice yields an identical plan.

use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::action::{
    ActionPlan, ExecutionDecision, ManualOverride, PlannedAction, ProposedEnrichment,
};
use crate::domain::models::config::AnalysisConfig;
use crate::domain::models::pass::{MultiPassResult, StopReason};

/// Where an enrichment landed after threshold and override checks.
enum EnrichmentDisposition {
    Apply,
    Hold,
    Reject,
}

/// Arbitrates the final analysis output into an execution plan.
#[derive(Debug, Clone)]
pub struct Arbitrator {
    config: AnalysisConfig,
}

impl Arbitrator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Decide what auto-executes, in what order, and what waits.
    ///
    /// Validation failures (more than one recommended option, a
    /// non-recommended option without a rejection reason) surface as
    /// typed errors and hold the whole result for manual reasoning
    /// supplementation; nothing is silently dropped or coerced.
    pub fn arbitrate(&self, result: &MultiPassResult) -> DomainResult<ActionPlan> {
        let interpretation = &result.interpretation;

        let recommended: Vec<_> = interpretation
            .action_options
            .iter()
            .filter(|o| o.is_recommended)
            .collect();
        if recommended.len() > 1 {
            return Err(DomainError::MultipleRecommendedActions(recommended.len()));
        }

        for option in &interpretation.action_options {
            if option.is_recommended {
                continue;
            }
            let has_reason = option
                .rejection_reason
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty());
            if !has_reason {
                return Err(DomainError::MissingRejectionReason {
                    category: option.category.as_str().to_string(),
                });
            }
        }

        let mut pre_action = Vec::new();
        let mut post_action = Vec::new();
        let mut held_for_review = Vec::new();
        let mut rejected_enrichments = Vec::new();

        for enrichment in interpretation.enrichments() {
            match self.enrichment_disposition(enrichment) {
                EnrichmentDisposition::Apply => {
                    // Required captures are sequenced before any
                    // terminal action; optional ones trail best-effort.
                    if enrichment.required {
                        pre_action.push(enrichment.clone());
                    } else {
                        post_action.push(enrichment.clone());
                    }
                }
                EnrichmentDisposition::Hold => held_for_review.push(enrichment.clone()),
                EnrichmentDisposition::Reject => rejected_enrichments.push(enrichment.clone()),
            }
        }

        let pending_required: Vec<String> = held_for_review
            .iter()
            .filter(|e| e.required)
            .map(|e| e.summary.clone())
            .collect();

        let action = recommended.first().map(|option| {
            let decision = self.action_decision(result, option, &pending_required);
            debug!(
                event_id = %result.event_id,
                category = option.category.as_str(),
                confidence = option.confidence,
                ?decision,
                "arbitrated recommended action"
            );
            PlannedAction {
                option: (*option).clone(),
                decision,
            }
        });

        let rejected_alternatives = interpretation
            .action_options
            .iter()
            .filter(|o| !o.is_recommended)
            .cloned()
            .collect();

        Ok(ActionPlan {
            event_id: result.event_id,
            action,
            pre_action,
            post_action,
            held_for_review,
            rejected_enrichments,
            rejected_alternatives,
        })
    }

    fn action_decision(
        &self,
        result: &MultiPassResult,
        option: &crate::domain::models::action::ActionOption,
        pending_required: &[String],
    ) -> ExecutionDecision {
        if result.stop_reason == StopReason::Cancelled {
            return ExecutionDecision::QueueForReview {
                reason: "analysis was cancelled before completing".to_string(),
            };
        }

        // Stakes-flagged items must have gone through the expert pass
        // before auto-executing, regardless of confidence.
        if result.high_stakes && !result.used_expert_tier() {
            return ExecutionDecision::QueueForReview {
                reason: "high-stakes event was not reviewed at the expert tier".to_string(),
            };
        }

        if option.confidence < self.config.auto_apply_threshold {
            return ExecutionDecision::QueueForReview {
                reason: format!(
                    "confidence {:.2} below auto-apply threshold {:.2}",
                    option.confidence, self.config.auto_apply_threshold
                ),
            };
        }

        // A terminal action would make the event's information
        // unrecoverable; required enrichments must land first.
        if option.category.is_terminal() && !pending_required.is_empty() {
            return ExecutionDecision::BlockedOnEnrichment {
                pending: pending_required.to_vec(),
            };
        }

        ExecutionDecision::AutoExecute
    }

    fn enrichment_disposition(&self, enrichment: &ProposedEnrichment) -> EnrichmentDisposition {
        // Manual overrides short-circuit threshold logic both ways.
        match enrichment.override_state {
            ManualOverride::ForceApply => return EnrichmentDisposition::Apply,
            ManualOverride::ForceReject => return EnrichmentDisposition::Reject,
            ManualOverride::Unset => {}
        }

        let threshold = if enrichment.required {
            self.config.required_enrichment_threshold
        } else {
            self.config.auto_apply_threshold
        };

        if enrichment.confidence >= threshold {
            EnrichmentDisposition::Apply
        } else {
            EnrichmentDisposition::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::domain::models::action::{
        ActionCategory, ActionOption, EventInterpretation, ManualOverride,
    };
    use crate::domain::models::pass::{PassHistory, ReasoningTier, TokenUsage};

    fn result_with(interpretation: EventInterpretation) -> MultiPassResult {
        MultiPassResult {
            event_id: Uuid::new_v4(),
            history: PassHistory::new(),
            passes_count: 3,
            final_tier: ReasoningTier::FastCheap,
            tiers_used: vec![ReasoningTier::FastCheap],
            escalated: false,
            stop_reason: StopReason::ConfidenceSufficient,
            high_stakes: false,
            total_usage: TokenUsage::default(),
            total_duration: Duration::from_millis(50),
            interpretation,
            warnings: vec![],
        }
    }

    fn arbitrator() -> Arbitrator {
        Arbitrator::new(AnalysisConfig::default())
    }

    #[test]
    fn test_confident_recommendation_auto_executes() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            0.9,
            "simple question, known answer",
        ));
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        assert!(plan.auto_executes());
    }

    #[test]
    fn test_low_confidence_queues_for_review() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            0.7,
            "unsure",
        ));
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        assert!(!plan.auto_executes());
        assert!(matches!(
            plan.action.unwrap().decision,
            ExecutionDecision::QueueForReview { .. }
        ));
    }

    #[test]
    fn test_missing_rejection_reason_is_validation_error() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            0.9,
            "answer",
        ));
        interp.action_options.push(ActionOption {
            category: ActionCategory::Archive,
            destination: None,
            confidence: 0.3,
            rationale: "could archive".to_string(),
            rejection_reason: Some("   ".to_string()),
            is_recommended: false,
        });
        let err = arbitrator().arbitrate(&result_with(interp)).unwrap_err();
        assert!(matches!(err, DomainError::MissingRejectionReason { .. }));
    }

    #[test]
    fn test_multiple_recommended_is_validation_error() {
        let mut interp = EventInterpretation::default();
        for _ in 0..2 {
            interp.action_options.push(ActionOption::recommended(
                ActionCategory::Reply,
                None,
                0.9,
                "answer",
            ));
        }
        let err = arbitrator().arbitrate(&result_with(interp)).unwrap_err();
        assert!(matches!(err, DomainError::MultipleRecommendedActions(2)));
    }

    #[test]
    fn test_force_apply_overrides_threshold() {
        let mut interp = EventInterpretation::default();
        interp.proposed_notes.push(
            ProposedEnrichment::note("weak but forced", 0.1)
                .with_override(ManualOverride::ForceApply),
        );
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        assert_eq!(plan.post_action.len(), 1);
        assert!(plan.held_for_review.is_empty());
    }

    #[test]
    fn test_force_reject_overrides_threshold() {
        let mut interp = EventInterpretation::default();
        interp.proposed_notes.push(
            ProposedEnrichment::note("confident but rejected", 0.99)
                .with_override(ManualOverride::ForceReject),
        );
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        assert_eq!(plan.rejected_enrichments.len(), 1);
        assert!(plan.post_action.is_empty());
    }

    #[test]
    fn test_required_enrichment_threshold_is_stricter_gate() {
        let mut interp = EventInterpretation::default();
        // 0.82 clears the required threshold (0.80) but not the
        // optional one (0.85).
        interp
            .proposed_notes
            .push(ProposedEnrichment::note("required capture", 0.82).required());
        interp
            .proposed_tasks
            .push(ProposedEnrichment::task("optional capture", 0.82));
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        assert_eq!(plan.pre_action.len(), 1);
        assert_eq!(plan.held_for_review.len(), 1);
    }

    #[test]
    fn test_terminal_action_blocked_on_unapplied_required_enrichment() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Archive,
            Some("receipts".to_string()),
            0.92,
            "routine receipt",
        ));
        interp
            .proposed_notes
            .push(ProposedEnrichment::note("warranty expiry date", 0.78).required());
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        match plan.action.unwrap().decision {
            ExecutionDecision::BlockedOnEnrichment { pending } => {
                assert_eq!(pending, vec!["warranty expiry date".to_string()]);
            }
            other => panic!("expected BlockedOnEnrichment, got {other:?}"),
        }
        assert_eq!(plan.held_for_review.len(), 1);
    }

    #[test]
    fn test_non_terminal_action_not_blocked_by_held_enrichment() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            0.92,
            "quick answer",
        ));
        interp
            .proposed_notes
            .push(ProposedEnrichment::note("low-confidence capture", 0.5).required());
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        assert!(plan.auto_executes());
    }

    #[test]
    fn test_high_stakes_without_expert_never_auto_executes() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            0.99,
            "looks certain",
        ));
        let mut result = result_with(interp);
        result.high_stakes = true;
        let plan = arbitrator().arbitrate(&result).unwrap();
        assert!(matches!(
            plan.action.unwrap().decision,
            ExecutionDecision::QueueForReview { .. }
        ));
    }

    #[test]
    fn test_high_stakes_with_expert_review_can_auto_execute() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            0.99,
            "expert confirmed",
        ));
        let mut result = result_with(interp);
        result.high_stakes = true;
        result.tiers_used = vec![ReasoningTier::FastCheap, ReasoningTier::Expert];
        let plan = arbitrator().arbitrate(&result).unwrap();
        assert!(plan.auto_executes());
    }

    #[test]
    fn test_cancelled_result_never_auto_executes() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            0.99,
            "certain",
        ));
        let mut result = result_with(interp);
        result.stop_reason = StopReason::Cancelled;
        let plan = arbitrator().arbitrate(&result).unwrap();
        assert!(!plan.auto_executes());
    }

    #[test]
    fn test_no_recommended_option_yields_plan_without_action() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::alternative(
            ActionCategory::Archive,
            None,
            0.4,
            "could file it",
            "not clearly routine",
        ));
        let plan = arbitrator().arbitrate(&result_with(interp)).unwrap();
        assert!(plan.action.is_none());
        assert_eq!(plan.rejected_alternatives.len(), 1);
    }

    #[test]
    fn test_arbitration_is_idempotent() {
        let mut interp = EventInterpretation::default();
        interp.action_options.push(ActionOption::recommended(
            ActionCategory::Archive,
            Some("receipts".to_string()),
            0.9,
            "routine",
        ));
        interp.action_options.push(ActionOption::alternative(
            ActionCategory::Reply,
            None,
            0.2,
            "could acknowledge",
            "no reply expected",
        ));
        interp
            .proposed_notes
            .push(ProposedEnrichment::note("order number", 0.9).required());
        let result = result_with(interp);
        let arbitrator = arbitrator();
        let first = arbitrator.arbitrate(&result).unwrap();
        let second = arbitrator.arbitrate(&result).unwrap();
        assert_eq!(first, second);
    }
}
