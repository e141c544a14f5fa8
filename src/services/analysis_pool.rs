//! Bounded concurrent analysis of many events.
//!
//! Each event's analysis is strictly sequential internally; across
//! events there is no ordering guarantee and none is needed. The pool
//! caps how many analyses run at once, sized to the reasoning
//! invoker's rate limits.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::event::PerceivedEvent;
use crate::domain::models::pass::MultiPassResult;

use super::orchestrator::PassOrchestrator;

/// Worker pool running analyses concurrently under a permit cap.
pub struct AnalysisPool {
    orchestrator: Arc<PassOrchestrator>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl AnalysisPool {
    pub fn new(orchestrator: Arc<PassOrchestrator>, max_concurrent: usize) -> Self {
        Self {
            orchestrator,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Analyze a batch of events concurrently.
    ///
    /// Results come back in input order regardless of completion
    /// order. One analysis failing (or being cancelled) never affects
    /// the others.
    pub async fn analyze_all(
        &self,
        events: Vec<PerceivedEvent>,
        cancel: CancellationToken,
    ) -> Vec<DomainResult<MultiPassResult>> {
        let handles: Vec<_> = events
            .into_iter()
            .map(|event| {
                let orchestrator = Arc::clone(&self.orchestrator);
                let permits = Arc::clone(&self.permits);
                let cancel = cancel.child_token();
                tokio::spawn(async move {
                    // None only if the semaphore were closed, which
                    // the pool never does.
                    let _permit = permits.acquire_owned().await.ok();
                    debug!(event_id = %event.id, "analysis slot acquired");
                    orchestrator.analyze_cancellable(&event, cancel).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(DomainError::ExecutionFailed(format!(
                    "analysis task aborted: {join_err}"
                ))),
            });
        }
        results
    }
}
