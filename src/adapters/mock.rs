//! Mock collaborators for testing.
//!
//! `MockInvoker` plays back a script of pass outcomes in order;
//! `StaticRetrieval` serves a fixed bundle and records what was asked
//! of it. Both are used by the integration tests and are handy for
//! wiring the core into a harness without real collaborators.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::models::action::EventInterpretation;
use crate::domain::models::event::EventSource;
use crate::domain::models::pass::{ReasoningTier, TokenUsage};
use crate::domain::ports::reasoning::{
    InvokerError, PromptContext, RawPassOutput, ReasoningInvoker,
};
use crate::domain::ports::retrieval::{ContextBundle, ContextRetrieval};

/// One scripted pass outcome.
#[derive(Debug, Clone)]
pub struct ScriptedPass {
    /// Per-dimension scores the pass reports
    pub scores: BTreeMap<String, f64>,
    /// Structured judgment the pass produces
    pub interpretation: EventInterpretation,
    /// Open questions for the next pass
    pub open_questions: Vec<String>,
    /// Entities the pass extracts
    pub entities: Vec<String>,
    /// Error to return instead of output
    pub error: Option<InvokerError>,
    /// Artificial latency before responding
    pub delay: Option<Duration>,
}

impl ScriptedPass {
    /// A successful pass reporting the same score on the four
    /// standard dimensions (geometric mean equals the score).
    pub fn with_confidence(score: f64) -> Self {
        let scores = [
            "action_certainty",
            "entity_certainty",
            "destination_certainty",
            "urgency_certainty",
        ]
        .iter()
        .map(|d| ((*d).to_string(), score))
        .collect();
        Self {
            scores,
            interpretation: EventInterpretation::default(),
            open_questions: Vec::new(),
            entities: Vec::new(),
            error: None,
            delay: None,
        }
    }

    /// A pass that fails with the given error.
    pub fn failing(error: InvokerError) -> Self {
        Self {
            scores: BTreeMap::new(),
            interpretation: EventInterpretation::default(),
            open_questions: Vec::new(),
            entities: Vec::new(),
            error: Some(error),
            delay: None,
        }
    }

    pub fn with_interpretation(mut self, interpretation: EventInterpretation) -> Self {
        self.interpretation = interpretation;
        self
    }

    pub fn with_open_questions(mut self, questions: Vec<String>) -> Self {
        self.open_questions = questions;
        self
    }

    pub fn with_entities(mut self, entities: Vec<String>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_scores(mut self, scores: BTreeMap<String, f64>) -> Self {
        self.scores = scores;
        self
    }
}

/// Record of one call the mock invoker received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tier: ReasoningTier,
    pub pass_number: u32,
    pub context_items: usize,
}

/// Scripted reasoning invoker.
///
/// Pops one [`ScriptedPass`] per call; an exhausted script fails the
/// call, which surfaces as an invoker failure in the orchestrator.
pub struct MockInvoker {
    script: Mutex<VecDeque<ScriptedPass>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockInvoker {
    pub fn new(script: Vec<ScriptedPass>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ReasoningInvoker for MockInvoker {
    fn invoker_id(&self) -> &str {
        "mock"
    }

    async fn invoke(
        &self,
        tier: ReasoningTier,
        context: &PromptContext,
    ) -> Result<RawPassOutput, InvokerError> {
        self.calls.lock().await.push(RecordedCall {
            tier,
            pass_number: context.pass_number,
            context_items: context.context_items.len(),
        });

        let next = self.script.lock().await.pop_front();
        let Some(scripted) = next else {
            return Err(InvokerError::Failed("mock script exhausted".to_string()));
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = scripted.error {
            return Err(error);
        }

        Ok(RawPassOutput {
            scores: scripted.scores,
            interpretation: scripted.interpretation,
            open_questions: scripted.open_questions,
            entities: scripted.entities,
            usage: TokenUsage::new(120, 40),
        })
    }
}

/// Retrieval stub serving a fixed bundle.
pub struct StaticRetrieval {
    bundle: ContextBundle,
    queries: Arc<Mutex<Vec<Vec<String>>>>,
}

impl StaticRetrieval {
    pub fn new(bundle: ContextBundle) -> Self {
        Self {
            bundle,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty() -> Self {
        Self::new(ContextBundle::empty())
    }

    /// Entity lists of every query received so far.
    pub async fn queries(&self) -> Vec<Vec<String>> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl ContextRetrieval for StaticRetrieval {
    async fn query(&self, entities: &[String], _source: EventSource) -> ContextBundle {
        self.queries.lock().await.push(entities.to_vec());
        self.bundle.clone()
    }
}
