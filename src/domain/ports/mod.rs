//! Port traits for external collaborators.
//!
//! The core consumes these interfaces; it never implements the real
//! ones. Production adapters live outside this crate, test doubles in
//! [`crate::adapters`].

pub mod null_retrieval;
pub mod reasoning;
pub mod retrieval;

pub use null_retrieval::NullRetrieval;
pub use reasoning::{InvokerError, PromptContext, RawPassOutput, ReasoningInvoker};
pub use retrieval::{ContextBundle, ContextItem, ContextItemKind, ContextRetrieval};
