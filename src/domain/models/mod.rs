//! Domain models for the decision core.

pub mod action;
pub mod confidence;
pub mod config;
pub mod event;
pub mod pass;

pub use action::{
    ActionCategory, ActionOption, ActionPlan, EnrichmentKind, EventInterpretation,
    ExecutionDecision, ManualOverride, PlannedAction, ProposedEnrichment,
};
pub use confidence::Confidence;
pub use config::{AnalysisConfig, ConcurrencyConfig, Config, LoggingConfig, TierTimeouts};
pub use event::{EventSource, PerceivedEvent};
pub use pass::{
    MultiPassResult, PassHistory, PassResult, PassType, ReasoningTier, StopReason, TokenUsage,
};
