//! Action candidates, proposed enrichments, and the arbitration plan.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of action a candidate proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    /// Draft or send a reply
    Reply,
    /// Forward to someone else
    Forward,
    /// Create or adjust a calendar entry
    Schedule,
    /// Hand off to another person
    Delegate,
    /// Snooze for later attention
    Defer,
    /// Move out of the inbox
    Archive,
    /// Discard entirely
    Delete,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reply => "reply",
            Self::Forward => "forward",
            Self::Schedule => "schedule",
            Self::Delegate => "delegate",
            Self::Defer => "defer",
            Self::Archive => "archive",
            Self::Delete => "delete",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reply" => Some(Self::Reply),
            "forward" => Some(Self::Forward),
            "schedule" => Some(Self::Schedule),
            "delegate" => Some(Self::Delegate),
            "defer" => Some(Self::Defer),
            "archive" => Some(Self::Archive),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Terminal actions remove the event from further attention.
    ///
    /// Required enrichments must be captured before one executes,
    /// since the information is unrecoverable afterward.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archive | Self::Delete)
    }
}

/// One candidate action produced by a pass.
///
/// At most one option per interpretation may be recommended; the rest
/// exist for transparency and must each explain their rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOption {
    pub category: ActionCategory,
    /// Folder, person, calendar, or other target of the action
    pub destination: Option<String>,
    /// The pass's confidence in this specific option
    pub confidence: f64,
    /// Why this option is on the table
    pub rationale: String,
    /// Why this option was not chosen (non-recommended options only)
    pub rejection_reason: Option<String>,
    pub is_recommended: bool,
}

impl ActionOption {
    /// Build the recommended option.
    pub fn recommended(
        category: ActionCategory,
        destination: Option<String>,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            category,
            destination,
            confidence,
            rationale: rationale.into(),
            rejection_reason: None,
            is_recommended: true,
        }
    }

    /// Build a rejected alternative with its reason.
    pub fn alternative(
        category: ActionCategory,
        destination: Option<String>,
        confidence: f64,
        rationale: impl Into<String>,
        rejection_reason: impl Into<String>,
    ) -> Self {
        Self {
            category,
            destination,
            confidence,
            rationale: rationale.into(),
            rejection_reason: Some(rejection_reason.into()),
            is_recommended: false,
        }
    }
}

/// What a proposed enrichment captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    Note,
    Task,
}

impl EnrichmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
        }
    }
}

/// Human override on an enrichment decision.
///
/// Always takes precedence over threshold logic, in either direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualOverride {
    #[default]
    Unset,
    ForceApply,
    ForceReject,
}

/// A note or task a pass wants captured from the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedEnrichment {
    pub kind: EnrichmentKind,
    pub summary: String,
    pub confidence: f64,
    /// Information that would be unrecoverably lost if not captured
    pub required: bool,
    #[serde(default)]
    pub override_state: ManualOverride,
}

impl ProposedEnrichment {
    pub fn note(summary: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind: EnrichmentKind::Note,
            summary: summary.into(),
            confidence,
            required: false,
            override_state: ManualOverride::Unset,
        }
    }

    pub fn task(summary: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind: EnrichmentKind::Task,
            summary: summary.into(),
            confidence,
            required: false,
            override_state: ManualOverride::Unset,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_override(mut self, override_state: ManualOverride) -> Self {
        self.override_state = override_state;
        self
    }
}

/// The structured judgment a pass produces: candidate actions plus
/// proposed knowledge captures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInterpretation {
    pub action_options: Vec<ActionOption>,
    pub proposed_notes: Vec<ProposedEnrichment>,
    pub proposed_tasks: Vec<ProposedEnrichment>,
}

impl EventInterpretation {
    /// The single recommended option, if the pass produced one.
    pub fn recommended_option(&self) -> Option<&ActionOption> {
        self.action_options.iter().find(|o| o.is_recommended)
    }

    /// All proposed enrichments, notes first.
    pub fn enrichments(&self) -> impl Iterator<Item = &ProposedEnrichment> {
        self.proposed_notes.iter().chain(self.proposed_tasks.iter())
    }

    /// Stable byte signature of the action structure, used for
    /// no-change detection between consecutive passes.
    ///
    /// Only category and destination participate: confidence and
    /// wording may wobble between passes without changing what the
    /// analysis would actually do.
    pub fn signature(&self) -> String {
        self.action_options
            .iter()
            .map(|o| {
                format!(
                    "{}{}>{}",
                    if o.is_recommended { "*" } else { "" },
                    o.category.as_str(),
                    o.destination.as_deref().unwrap_or("-")
                )
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Verdict on the recommended action after arbitration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum ExecutionDecision {
    /// Safe to execute without human review
    AutoExecute,
    /// Queued for human approval
    QueueForReview { reason: String },
    /// A required enrichment has not been applied yet; the terminal
    /// action must wait for it
    BlockedOnEnrichment { pending: Vec<String> },
}

/// The recommended action paired with its execution verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub option: ActionOption,
    pub decision: ExecutionDecision,
}

/// Arbitration output: what executes automatically, in what order,
/// and what waits for a human.
///
/// Arbitration is deterministic; re-arbitrating an unmodified
/// [`MultiPassResult`](super::pass::MultiPassResult) yields an
/// identical plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub event_id: Uuid,
    /// The recommended action with its verdict, absent when no option
    /// was recommended
    pub action: Option<PlannedAction>,
    /// Required enrichments to apply before any terminal action
    pub pre_action: Vec<ProposedEnrichment>,
    /// Optional enrichments applied best-effort after the action
    pub post_action: Vec<ProposedEnrichment>,
    /// Enrichments below their threshold, awaiting human review
    pub held_for_review: Vec<ProposedEnrichment>,
    /// Enrichments a human force-rejected
    pub rejected_enrichments: Vec<ProposedEnrichment>,
    /// Non-recommended options, each carrying its rejection reason
    pub rejected_alternatives: Vec<ActionOption>,
}

impl ActionPlan {
    /// Whether the plan's action executes without human review.
    pub fn auto_executes(&self) -> bool {
        matches!(
            self.action,
            Some(PlannedAction {
                decision: ExecutionDecision::AutoExecute,
                ..
            })
        )
    }
}
