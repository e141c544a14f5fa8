//! Pass orchestration.
//!
//! Drives one event's analysis from the blind baseline pass through
//! context-augmented refinement and tier escalation until the
//! convergence detector or the escalation controller stops the loop.
//!
//! Each analysis is a single logical sequential pipeline: pass N's
//! input depends on pass N-1's output. Concurrency across events
//! lives in [`AnalysisPool`](super::analysis_pool::AnalysisPool);
//! this type owns no cross-analysis state.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::action::EventInterpretation;
use crate::domain::models::config::AnalysisConfig;
use crate::domain::models::confidence::Confidence;
use crate::domain::models::event::PerceivedEvent;
use crate::domain::models::pass::{
    MultiPassResult, PassHistory, PassResult, PassType, ReasoningTier, StopReason,
};
use crate::domain::ports::reasoning::{
    InvokerError, PromptContext, RawPassOutput, ReasoningInvoker,
};
use crate::domain::ports::retrieval::{ContextItem, ContextRetrieval};

use super::confidence_model::ConfidenceModel;
use super::convergence::ConvergenceDetector;
use super::escalation::{EscalationController, EscalationDecision};

/// Orchestrates the multi-pass analysis of perceived events.
pub struct PassOrchestrator {
    invoker: Arc<dyn ReasoningInvoker>,
    retrieval: Arc<dyn ContextRetrieval>,
    config: AnalysisConfig,
    escalation: EscalationController,
    convergence: ConvergenceDetector,
}

impl PassOrchestrator {
    pub fn new(
        invoker: Arc<dyn ReasoningInvoker>,
        retrieval: Arc<dyn ContextRetrieval>,
        config: AnalysisConfig,
    ) -> Self {
        let escalation = EscalationController::new(config.clone());
        let convergence = ConvergenceDetector::new(config.clone());
        Self {
            invoker,
            retrieval,
            config,
            escalation,
            convergence,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one event to completion.
    pub async fn analyze(&self, event: &PerceivedEvent) -> DomainResult<MultiPassResult> {
        self.analyze_cancellable(event, CancellationToken::new())
            .await
    }

    /// Analyze one event, honoring cancellation at pass boundaries.
    ///
    /// A cancelled analysis keeps its pass trail for observability
    /// but reports `StopReason::Cancelled` with an empty final
    /// interpretation, so a partial judgment can never be mistaken
    /// for a finished one.
    pub async fn analyze_cancellable(
        &self,
        event: &PerceivedEvent,
        cancel: CancellationToken,
    ) -> DomainResult<MultiPassResult> {
        let started = Instant::now();
        let mut history = PassHistory::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut high_stakes = false;
        let mut escalated = false;
        let mut last_entities: Vec<String> = Vec::new();

        let mut pass_number: u32 = 1;
        let mut tier = ReasoningTier::FastCheap;
        let mut pass_type = PassType::Blind;

        let stop_reason = loop {
            if cancel.is_cancelled() {
                info!(event_id = %event.id, pass = pass_number, "analysis cancelled at pass boundary");
                break StopReason::Cancelled;
            }

            let pass_started = Instant::now();

            let (context_items, context_searched) = if pass_type.is_context_augmented() {
                let entities = self.entity_query(event, &last_entities);
                let bundle = self.retrieval.query(&entities, event.source).await.ranked();
                debug!(
                    event_id = %event.id,
                    pass = pass_number,
                    entities = entities.len(),
                    items = bundle.len(),
                    "context retrieval complete"
                );
                (bundle.items, true)
            } else {
                (Vec::new(), false)
            };

            let prompt = self.build_prompt(event, pass_number, pass_type, &history, context_items);

            let (raw, confidence) = match self.invoke_with_retry(tier, &prompt).await {
                Ok(output) => output,
                Err(err) => {
                    if history.is_empty() {
                        return Err(DomainError::FirstPassFailed {
                            event_id: event.id,
                            source: err,
                        });
                    }
                    // Graceful degradation: the last completed pass's
                    // output stands as final.
                    warn!(
                        event_id = %event.id,
                        pass = pass_number,
                        tier = tier.as_str(),
                        error = %err,
                        "pass failed after retry, degrading to last completed pass"
                    );
                    warnings.push(format!(
                        "pass {pass_number} on tier {} failed after one retry ({err}); \
                         final output is from pass {}",
                        tier.as_str(),
                        history.len()
                    ));
                    break StopReason::InvokerFailure;
                }
            };

            let stakes_now = self.escalation.high_stakes_reasons(event, Utc::now());
            if !stakes_now.is_empty() && !high_stakes {
                high_stakes = true;
                info!(event_id = %event.id, reasons = ?stakes_now, "event flagged high-stakes");
            }

            let confidence_before = history
                .last()
                .map(|p| p.confidence.aggregate())
                .unwrap_or(0.0);
            let aggregate = confidence.aggregate();
            let elapsed = pass_started.elapsed();

            // One structured record per pass; enough to reconstruct
            // the decision trail post hoc.
            info!(
                event_id = %event.id,
                pass = pass_number,
                pass_type = pass_type.as_str(),
                tier = tier.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                confidence = aggregate,
                delta = aggregate - confidence_before,
                context_searched,
                context_items = prompt.context_items.len(),
                open_questions = raw.open_questions.len(),
                "pass complete"
            );

            last_entities = raw.entities.clone();
            history.push(PassResult {
                pass_number,
                pass_type,
                tier,
                confidence_before,
                confidence,
                elapsed,
                usage: raw.usage,
                open_questions: raw.open_questions,
                triggered_escalation: false,
                context_searched,
                context_items_returned: prompt.context_items.len(),
                interpretation: raw.interpretation,
            });

            let stakes_pending = high_stakes && !history.used_tier(ReasoningTier::Expert);

            if let Some(reason) = self.convergence.check(&history, stakes_pending) {
                break reason;
            }

            match self
                .escalation
                .next_pass(pass_number, aggregate, stakes_pending, tier)
            {
                EscalationDecision::Converge => break StopReason::ConfidenceSufficient,
                EscalationDecision::Continue {
                    tier: next_tier,
                    pass_type: next_type,
                } => {
                    tier = next_tier;
                    pass_type = next_type;
                }
                EscalationDecision::Escalate {
                    tier: next_tier,
                    pass_type: next_type,
                } => {
                    info!(
                        event_id = %event.id,
                        pass = pass_number,
                        from = tier.as_str(),
                        to = next_tier.as_str(),
                        "escalating reasoning tier"
                    );
                    escalated = true;
                    history.mark_last_triggered_escalation();
                    tier = next_tier;
                    pass_type = next_type;
                }
            }

            pass_number += 1;
        };

        let interpretation = if stop_reason == StopReason::Cancelled {
            EventInterpretation::default()
        } else {
            history
                .last()
                .map(|p| p.interpretation.clone())
                .unwrap_or_default()
        };

        let final_tier = history
            .last()
            .map(|p| p.tier)
            .unwrap_or(ReasoningTier::FastCheap);

        info!(
            event_id = %event.id,
            passes = history.len(),
            stop_reason = stop_reason.as_str(),
            final_tier = final_tier.as_str(),
            escalated,
            high_stakes,
            "analysis complete"
        );

        Ok(MultiPassResult {
            event_id: event.id,
            passes_count: history.len() as u32,
            final_tier,
            tiers_used: history.tiers_used(),
            escalated,
            stop_reason,
            high_stakes,
            total_usage: history.total_usage(),
            total_duration: started.elapsed(),
            interpretation,
            warnings,
            history,
        })
    }

    /// Entities to search for before a context-augmented pass: what
    /// the previous pass named, or the event's own people when it
    /// named nothing.
    fn entity_query(&self, event: &PerceivedEvent, last_entities: &[String]) -> Vec<String> {
        if last_entities.is_empty() {
            let mut entities = vec![event.sender.clone()];
            entities.extend(event.participants.iter().cloned());
            entities
        } else {
            last_entities.to_vec()
        }
    }

    fn build_prompt(
        &self,
        event: &PerceivedEvent,
        pass_number: u32,
        pass_type: PassType,
        history: &PassHistory,
        context_items: Vec<ContextItem>,
    ) -> PromptContext {
        PromptContext {
            event: event.clone(),
            pass_number,
            pass_type,
            previous: history.last().map(|p| p.interpretation.clone()),
            open_questions: history
                .last()
                .map(|p| p.open_questions.clone())
                .unwrap_or_default(),
            context_items,
        }
    }

    /// One invocation attempt with the tier's timeout, plus score
    /// validation: malformed scores count as malformed output.
    async fn run_pass_once(
        &self,
        tier: ReasoningTier,
        prompt: &PromptContext,
    ) -> Result<(RawPassOutput, Confidence), InvokerError> {
        let budget = self.config.tier_timeouts.for_tier(tier);
        let raw = match timeout(budget, self.invoker.invoke(tier, prompt)).await {
            Ok(result) => result?,
            Err(_) => return Err(InvokerError::Timeout(budget.as_secs())),
        };
        let confidence = ConfidenceModel::aggregate(&raw.scores)
            .map_err(|err| InvokerError::MalformedOutput(err.to_string()))?;
        Ok((raw, confidence))
    }

    /// Failed passes are retried exactly once against the same tier.
    async fn invoke_with_retry(
        &self,
        tier: ReasoningTier,
        prompt: &PromptContext,
    ) -> Result<(RawPassOutput, Confidence), InvokerError> {
        match self.run_pass_once(tier, prompt).await {
            Ok(output) => Ok(output),
            Err(first) => {
                warn!(
                    tier = tier.as_str(),
                    pass = prompt.pass_number,
                    error = %first,
                    "pass invocation failed, retrying once at the same tier"
                );
                self.run_pass_once(tier, prompt).await
            }
        }
    }
}
