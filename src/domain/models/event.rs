//! Perceived event domain model.
//!
//! A perceived event is the normalized form of something the user's
//! world produced: an email, a chat message, a calendar item. Events
//! are produced by an external normalizer and are immutable once
//! constructed; the analysis pipeline only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a perceived event originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Email message
    Mail,
    /// Chat / instant message
    Chat,
    /// Calendar item (invite, reminder, change)
    Calendar,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mail => "mail",
            Self::Chat => "chat",
            Self::Calendar => "calendar",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mail" | "email" => Some(Self::Mail),
            "chat" => Some(Self::Chat),
            "calendar" => Some(Self::Calendar),
            _ => None,
        }
    }
}

/// A normalized input event awaiting triage.
///
/// Monetary and deadline hints are extracted by the upstream
/// normalizer when the raw content carries them in a structured form;
/// they feed the high-stakes predicate during analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceivedEvent {
    /// Unique event identifier
    pub id: Uuid,
    /// Source channel
    pub source: EventSource,
    /// Primary sender / originator
    pub sender: String,
    /// Other participants (recipients, attendees, channel members)
    pub participants: Vec<String>,
    /// Subject line or title
    pub subject: String,
    /// Body text
    pub body: String,
    /// When the event was received by the normalizer
    pub received_at: DateTime<Utc>,
    /// Structured monetary amount hint, if the content carried one
    pub monetary_amount: Option<f64>,
    /// Structured deadline hint, if the content carried one
    pub deadline: Option<DateTime<Utc>>,
}

impl PerceivedEvent {
    /// Create a new event with a fresh id, received now.
    pub fn new(
        source: EventSource,
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            sender: sender.into(),
            participants: Vec::new(),
            subject: subject.into(),
            body: body.into(),
            received_at: Utc::now(),
            monetary_amount: None,
            deadline: None,
        }
    }

    pub fn with_participants(mut self, participants: Vec<String>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_monetary_amount(mut self, amount: f64) -> Self {
        self.monetary_amount = Some(amount);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }
}
