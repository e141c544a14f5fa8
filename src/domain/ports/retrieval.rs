//! Context retrieval port.
//!
//! The knowledge store (semantic note/calendar/task search) lives
//! outside the core. Before each context-augmented pass the
//! orchestrator queries it with the entities the previous pass named.
//!
//! Retrieval is infallible by contract: an adapter that hits trouble
//! logs it and returns an empty bundle rather than erroring the
//! analysis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::models::event::EventSource;

/// What kind of knowledge a context item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextItemKind {
    Note,
    CalendarItem,
    Task,
    Correspondence,
}

impl ContextItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::CalendarItem => "calendar_item",
            Self::Task => "task",
            Self::Correspondence => "correspondence",
        }
    }
}

/// One retrieved knowledge item with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub kind: ContextItemKind,
    pub content: String,
    /// Relevance in [0, 1] as scored by the retrieval store
    pub relevance: f64,
}

impl ContextItem {
    pub fn new(kind: ContextItemKind, content: impl Into<String>, relevance: f64) -> Self {
        Self {
            kind,
            content: content.into(),
            relevance,
        }
    }
}

/// A batch of retrieved context, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub items: Vec<ContextItem>,
}

impl ContextBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(items: Vec<ContextItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items sorted most-relevant first.
    pub fn ranked(mut self) -> Self {
        self.items.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self
    }
}

/// Port trait for the external knowledge store.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for concurrent use across
/// tokio tasks.
#[async_trait]
pub trait ContextRetrieval: Send + Sync {
    /// Search notes, calendar items, tasks, and prior correspondence
    /// for the given entities. May return an empty bundle; must never
    /// error the caller.
    async fn query(&self, entities: &[String], source: EventSource) -> ContextBundle;
}
