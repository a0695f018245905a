//! Command result output.
//!
//! - `OutputWriter`: writes results to stdout as text or JSON
//! - `RuleOutput`, `ErrorOutput`: serializable views of rules and load errors

mod writer;

pub use writer::{ErrorOutput, OutputWriter, RuleOutput};
