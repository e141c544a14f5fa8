//! Property tests for confidence aggregation and arbitration
//! invariants.

use std::collections::BTreeMap;
use std::time::Duration;

use proptest::prelude::*;
use uuid::Uuid;

use adjutant::domain::models::{
    ActionCategory, ActionOption, AnalysisConfig, EventInterpretation, MultiPassResult,
    PassHistory, ProposedEnrichment, ReasoningTier, StopReason, TokenUsage,
};
use adjutant::{Arbitrator, ConfidenceModel, DomainError};

fn scores_from(values: &[f64]) -> BTreeMap<String, f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("dim_{i}"), *v))
        .collect()
}

fn result_with(interpretation: EventInterpretation) -> MultiPassResult {
    MultiPassResult {
        event_id: Uuid::nil(),
        history: PassHistory::new(),
        passes_count: 3,
        final_tier: ReasoningTier::FastCheap,
        tiers_used: vec![ReasoningTier::FastCheap],
        escalated: false,
        stop_reason: StopReason::ConfidenceSufficient,
        high_stakes: false,
        total_usage: TokenUsage::default(),
        total_duration: Duration::from_millis(10),
        interpretation,
        warnings: vec![],
    }
}

proptest! {
    /// Property: the aggregate always lands in [0, 1], even when raw
    /// scores overshoot and get clamped.
    #[test]
    fn prop_aggregate_within_unit_interval(
        values in prop::collection::vec(0.0f64..=1.5, 1..8)
    ) {
        let confidence = ConfidenceModel::aggregate(&scores_from(&values)).unwrap();
        prop_assert!((0.0..=1.0).contains(&confidence.aggregate()));
    }

    /// Property: any single zero dimension zeroes the aggregate —
    /// the weakest-link policy.
    #[test]
    fn prop_zero_dimension_zeroes_aggregate(
        values in prop::collection::vec(0.01f64..=1.0, 1..6)
    ) {
        let mut scores = scores_from(&values);
        scores.insert("weakest".to_string(), 0.0);
        let confidence = ConfidenceModel::aggregate(&scores).unwrap();
        prop_assert_eq!(confidence.aggregate(), 0.0);
    }

    /// Property: the geometric mean sits between the weakest and
    /// strongest dimension.
    #[test]
    fn prop_aggregate_bounded_by_extremes(
        values in prop::collection::vec(0.01f64..=1.0, 1..8)
    ) {
        let confidence = ConfidenceModel::aggregate(&scores_from(&values)).unwrap();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(0.0f64, f64::max);
        prop_assert!(confidence.aggregate() >= min - 1e-9);
        prop_assert!(confidence.aggregate() <= max + 1e-9);
    }

    /// Property: negative scores are a validation error, never
    /// coerced.
    #[test]
    fn prop_negative_scores_rejected(value in -10.0f64..-1e-6) {
        let err = ConfidenceModel::aggregate(&scores_from(&[value])).unwrap_err();
        let is_expected = matches!(err, DomainError::InvalidDimensionScore { .. });
        prop_assert!(is_expected);
    }

    /// Property: arbitrating the same unmodified result twice yields
    /// an identical plan.
    #[test]
    fn prop_arbitration_idempotent(
        action_confidence in 0.0f64..=1.0,
        enrichment_confidence in 0.0f64..=1.0,
        required in any::<bool>(),
        high_stakes in any::<bool>(),
    ) {
        let mut interpretation = EventInterpretation::default();
        interpretation.action_options.push(ActionOption::recommended(
            ActionCategory::Reply,
            None,
            action_confidence,
            "prop",
        ));
        let mut enrichment = ProposedEnrichment::note("capture", enrichment_confidence);
        if required {
            enrichment = enrichment.required();
        }
        interpretation.proposed_notes.push(enrichment);

        let mut result = result_with(interpretation);
        result.high_stakes = high_stakes;

        let arbitrator = Arbitrator::new(AnalysisConfig::default());
        let first = arbitrator.arbitrate(&result).unwrap();
        let second = arbitrator.arbitrate(&result).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: every non-recommended option must carry a non-empty
    /// rejection reason, or arbitration refuses the whole result.
    #[test]
    fn prop_missing_rejection_reason_always_rejected(count in 1usize..4) {
        let mut interpretation = EventInterpretation::default();
        for i in 0..count {
            interpretation.action_options.push(ActionOption {
                category: ActionCategory::Defer,
                destination: None,
                confidence: 0.4,
                rationale: format!("alternative {i}"),
                rejection_reason: None,
                is_recommended: false,
            });
        }
        let err = Arbitrator::new(AnalysisConfig::default())
            .arbitrate(&result_with(interpretation))
            .unwrap_err();
        let is_expected = matches!(err, DomainError::MissingRejectionReason { .. });
        prop_assert!(is_expected);
    }

    /// Property: with reasons present, arbitration succeeds and
    /// surfaces every alternative.
    #[test]
    fn prop_explained_alternatives_survive_arbitration(count in 1usize..4) {
        let mut interpretation = EventInterpretation::default();
        for i in 0..count {
            interpretation.action_options.push(ActionOption::alternative(
                ActionCategory::Defer,
                None,
                0.4,
                format!("alternative {i}"),
                format!("reason {i}"),
            ));
        }
        let plan = Arbitrator::new(AnalysisConfig::default())
            .arbitrate(&result_with(interpretation))
            .unwrap();
        prop_assert_eq!(plan.rejected_alternatives.len(), count);
    }
}
