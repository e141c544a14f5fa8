//! Null context retrieval implementation.
//!
//! Used when no knowledge store is wired up but the type system
//! requires a `ContextRetrieval` implementation. Every pass then runs
//! on the event text alone.

use async_trait::async_trait;

use crate::domain::models::event::EventSource;

use super::retrieval::{ContextBundle, ContextRetrieval};

/// A no-op retrieval collaborator that always returns an empty bundle.
#[derive(Debug, Clone, Default)]
pub struct NullRetrieval;

impl NullRetrieval {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContextRetrieval for NullRetrieval {
    async fn query(&self, _entities: &[String], _source: EventSource) -> ContextBundle {
        ContextBundle::empty()
    }
}
