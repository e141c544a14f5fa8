//! Loop termination detection.
//!
//! Decides when further passes are not expected to change the
//! outcome, independent of the escalation policy. Aggregate
//! confidence may rise and fall across passes, so every condition is
//! re-checked at every pass boundary with no monotonicity assumption.

use crate::domain::models::config::AnalysisConfig;
use crate::domain::models::pass::{PassHistory, StopReason};

/// Convergence detector over the pass history.
#[derive(Debug, Clone)]
pub struct ConvergenceDetector {
    config: AnalysisConfig,
}

impl ConvergenceDetector {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Check the history after the latest pass, in priority order:
    /// confidence threshold, then no-change between consecutive
    /// passes, then the pass budget.
    ///
    /// While the event is high-stakes and the expert tier has not run
    /// yet, only the pass budget may end the analysis; confidence and
    /// stability are not allowed to finish it early.
    pub fn check(&self, history: &PassHistory, stakes_pending_expert: bool) -> Option<StopReason> {
        let last = history.last()?;

        if !stakes_pending_expert {
            if last.confidence.aggregate() >= self.config.convergence_confidence {
                return Some(StopReason::ConfidenceSufficient);
            }

            if let Some(previous) = history.previous() {
                if previous.interpretation.signature() == last.interpretation.signature() {
                    return Some(StopReason::NoChangeBetweenPasses);
                }
            }
        }

        if history.len() as u32 >= self.config.max_passes {
            return Some(StopReason::MaxPassesReached);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::models::action::{ActionCategory, ActionOption, EventInterpretation};
    use crate::domain::models::pass::{PassResult, PassType, ReasoningTier, TokenUsage};
    use crate::services::confidence_model::ConfidenceModel;

    fn pass(number: u32, aggregate: f64, destination: &str) -> PassResult {
        let scores = [("overall".to_string(), aggregate)].into_iter().collect();
        let mut interpretation = EventInterpretation::default();
        interpretation.action_options.push(ActionOption::recommended(
            ActionCategory::Archive,
            Some(destination.to_string()),
            aggregate,
            "test",
        ));
        PassResult {
            pass_number: number,
            pass_type: if number == 1 {
                PassType::Blind
            } else {
                PassType::Refine
            },
            tier: ReasoningTier::FastCheap,
            confidence_before: 0.0,
            confidence: ConfidenceModel::aggregate(&scores).unwrap(),
            elapsed: Duration::from_millis(5),
            usage: TokenUsage::default(),
            open_questions: vec![],
            triggered_escalation: false,
            context_searched: number > 1,
            context_items_returned: 0,
            interpretation,
        }
    }

    fn detector() -> ConvergenceDetector {
        ConvergenceDetector::new(AnalysisConfig::default())
    }

    #[test]
    fn test_empty_history_never_converged() {
        assert_eq!(detector().check(&PassHistory::new(), false), None);
    }

    #[test]
    fn test_confidence_threshold_fires_first() {
        let mut history = PassHistory::new();
        history.push(pass(1, 0.96, "inbox"));
        assert_eq!(
            detector().check(&history, false),
            Some(StopReason::ConfidenceSufficient)
        );
    }

    #[test]
    fn test_no_change_between_passes() {
        let mut history = PassHistory::new();
        history.push(pass(1, 0.4, "receipts"));
        history.push(pass(2, 0.6, "receipts"));
        assert_eq!(
            detector().check(&history, false),
            Some(StopReason::NoChangeBetweenPasses)
        );
    }

    #[test]
    fn test_changed_output_does_not_stop() {
        let mut history = PassHistory::new();
        history.push(pass(1, 0.4, "receipts"));
        history.push(pass(2, 0.6, "travel"));
        assert_eq!(detector().check(&history, false), None);
    }

    #[test]
    fn test_max_passes_reached() {
        let mut history = PassHistory::new();
        for i in 1..=5 {
            history.push(pass(i, 0.5, &format!("dest-{i}")));
        }
        assert_eq!(
            detector().check(&history, false),
            Some(StopReason::MaxPassesReached)
        );
    }

    #[test]
    fn test_stakes_pending_suppresses_early_stop() {
        let mut history = PassHistory::new();
        history.push(pass(1, 0.97, "inbox"));
        history.push(pass(2, 0.97, "inbox"));
        // Both the confidence and no-change conditions hold, but the
        // event still owes an expert review.
        assert_eq!(detector().check(&history, true), None);
    }

    #[test]
    fn test_stakes_pending_still_respects_pass_budget() {
        let mut history = PassHistory::new();
        for i in 1..=5 {
            history.push(pass(i, 0.97, "inbox"));
        }
        assert_eq!(
            detector().check(&history, true),
            Some(StopReason::MaxPassesReached)
        );
    }
}
