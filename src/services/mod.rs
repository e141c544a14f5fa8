//! Service layer: the decision core's components.

pub mod analysis_pool;
pub mod arbitrator;
pub mod confidence_model;
pub mod convergence;
pub mod escalation;
pub mod orchestrator;

pub use analysis_pool::AnalysisPool;
pub use arbitrator::Arbitrator;
pub use confidence_model::ConfidenceModel;
pub use convergence::ConvergenceDetector;
pub use escalation::{EscalationController, EscalationDecision};
pub use orchestrator::PassOrchestrator;
