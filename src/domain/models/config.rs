//! Configuration models for the decision core.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pass::ReasoningTier;

/// Main configuration structure for adjutant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Analysis loop tuning
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Concurrency limits
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tuning knobs for the pass loop, escalation, and arbitration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisConfig {
    /// Hard cap on passes per analysis
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,

    /// Passes completed before confidence alone can end or escalate
    /// the analysis
    #[serde(default = "default_min_refine_passes")]
    pub min_refine_passes: u32,

    /// Recommended actions at or above this confidence auto-execute
    #[serde(default = "default_auto_apply_threshold")]
    pub auto_apply_threshold: f64,

    /// Required enrichments auto-apply at or above this confidence
    #[serde(default = "default_required_enrichment_threshold")]
    pub required_enrichment_threshold: f64,

    /// Aggregate confidence that ends the loop immediately
    #[serde(default = "default_convergence_confidence")]
    pub convergence_confidence: f64,

    /// Below this after the minimum refinement rounds, escalate a tier
    #[serde(default = "default_escalation_floor")]
    pub escalation_floor: f64,

    /// Monetary amounts above this flag the event high-stakes
    /// (unset: amounts never flag)
    #[serde(default)]
    pub high_stakes_amount_threshold: Option<f64>,

    /// Deadlines within this many hours flag the event high-stakes
    #[serde(default = "default_high_stakes_deadline_hours")]
    pub high_stakes_deadline_hours: i64,

    /// Senders whose events are always high-stakes (case-insensitive)
    #[serde(default)]
    pub vip_senders: BTreeSet<String>,

    /// Per-tier invocation timeouts
    #[serde(default)]
    pub tier_timeouts: TierTimeouts,
}

const fn default_max_passes() -> u32 {
    5
}

const fn default_min_refine_passes() -> u32 {
    3
}

const fn default_auto_apply_threshold() -> f64 {
    0.85
}

const fn default_required_enrichment_threshold() -> f64 {
    0.80
}

const fn default_convergence_confidence() -> f64 {
    0.95
}

const fn default_escalation_floor() -> f64 {
    0.80
}

const fn default_high_stakes_deadline_hours() -> i64 {
    48
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            min_refine_passes: default_min_refine_passes(),
            auto_apply_threshold: default_auto_apply_threshold(),
            required_enrichment_threshold: default_required_enrichment_threshold(),
            convergence_confidence: default_convergence_confidence(),
            escalation_floor: default_escalation_floor(),
            high_stakes_amount_threshold: None,
            high_stakes_deadline_hours: default_high_stakes_deadline_hours(),
            vip_senders: BTreeSet::new(),
            tier_timeouts: TierTimeouts::default(),
        }
    }
}

/// Invocation timeout per reasoning tier, in seconds.
///
/// The expert tier is allowed longer; a timeout is treated the same
/// as any other invoker failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TierTimeouts {
    #[serde(default = "default_fast_cheap_timeout_secs")]
    pub fast_cheap_secs: u64,

    #[serde(default = "default_balanced_timeout_secs")]
    pub balanced_secs: u64,

    #[serde(default = "default_expert_timeout_secs")]
    pub expert_secs: u64,
}

const fn default_fast_cheap_timeout_secs() -> u64 {
    30
}

const fn default_balanced_timeout_secs() -> u64 {
    60
}

const fn default_expert_timeout_secs() -> u64 {
    180
}

impl Default for TierTimeouts {
    fn default() -> Self {
        Self {
            fast_cheap_secs: default_fast_cheap_timeout_secs(),
            balanced_secs: default_balanced_timeout_secs(),
            expert_secs: default_expert_timeout_secs(),
        }
    }
}

impl TierTimeouts {
    pub fn secs_for(&self, tier: ReasoningTier) -> u64 {
        match tier {
            ReasoningTier::FastCheap => self.fast_cheap_secs,
            ReasoningTier::Balanced => self.balanced_secs,
            ReasoningTier::Expert => self.expert_secs,
        }
    }

    pub fn for_tier(&self, tier: ReasoningTier) -> Duration {
        Duration::from_secs(self.secs_for(tier))
    }
}

/// Concurrency limits for running many analyses at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConcurrencyConfig {
    /// Maximum analyses in flight, sized to the invoker's rate limits
    #[serde(default = "default_max_concurrent_analyses")]
    pub max_concurrent_analyses: usize,
}

const fn default_max_concurrent_analyses() -> usize {
    8
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_analyses: default_max_concurrent_analyses(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
