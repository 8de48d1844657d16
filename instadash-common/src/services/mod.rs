//! Outbound integrations
//!
//! Each client makes a single call per operation and keeps no state between
//! invocations.

pub mod punctuation;
pub mod workflow;

pub use punctuation::{Punctuation, Punctuator, PUNCTUATION_PROMPT};
pub use workflow::{WorkflowClient, WorkflowStatus};
