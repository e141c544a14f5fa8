//! Adapters: concrete implementations of the domain ports.

pub mod mock;

pub use mock::{MockInvoker, RecordedCall, ScriptedPass, StaticRetrieval};
