//! Adjutant - Multi-Pass Event Triage Core
//!
//! Adjutant decides, with calibrated confidence, what to do with
//! normalized perceived events (emails, chat messages, calendar
//! items) — without requiring human review for most items, while
//! guaranteeing that uncertain or high-stakes items are escalated
//! rather than silently mis-handled.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture
//! principles:
//!
//! - **Domain Layer** (`domain`): models, errors, and the ports for
//!   the reasoning invoker and context retrieval collaborators
//! - **Service Layer** (`services`): the decision core itself — pass
//!   orchestration, escalation, convergence, confidence scoring, and
//!   arbitration
//! - **Adapters** (`adapters`): port implementations (test doubles)
//! - **Infrastructure Layer** (`infrastructure`): configuration
//!   loading and logging setup
//!
//! The core performs no retrieval, executes no side-effecting
//! actions, and persists nothing; those concerns belong to the
//! collaborators behind the ports.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use adjutant::domain::models::{AnalysisConfig, EventSource, PerceivedEvent};
//! use adjutant::services::{Arbitrator, PassOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = PassOrchestrator::new(invoker, retrieval, AnalysisConfig::default());
//!     let event = PerceivedEvent::new(EventSource::Mail, "a@b.c", "Invoice", "...");
//!     let result = orchestrator.analyze(&event).await?;
//!     let plan = Arbitrator::new(orchestrator.config().clone()).arbitrate(&result)?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    ActionCategory, ActionOption, ActionPlan, AnalysisConfig, Config, Confidence,
    EventInterpretation, EventSource, ExecutionDecision, ManualOverride, MultiPassResult,
    PassHistory, PassResult, PassType, PerceivedEvent, ProposedEnrichment, ReasoningTier,
    StopReason, TokenUsage,
};
pub use domain::ports::{
    ContextBundle, ContextItem, ContextItemKind, ContextRetrieval, InvokerError, NullRetrieval,
    PromptContext, RawPassOutput, ReasoningInvoker,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    AnalysisPool, Arbitrator, ConfidenceModel, ConvergenceDetector, EscalationController,
    PassOrchestrator,
};
