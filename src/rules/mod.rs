//! Rule system for context-aware rule injection.
//!
//! Rules are markdown documents whose frontmatter decides when they are
//! surfaced to the assistant:
//!
//! | Kind            | Trigger                         |
//! |-----------------|---------------------------------|
//! | Always          | `alwaysApply: true`             |
//! | ContextSpecific | a working file matches `globs`  |
//! | AgentRequested  | explicit lookup by name         |

pub mod glob;
mod loader;
mod parser;
mod resolver;
mod store;
mod types;

pub use loader::{LoadOutcome, RuleLoader, load};
pub use parser::parse_rule;
pub use resolver::{RuleResolver, lookup, resolve};
pub use store::RuleStore;
pub use types::{
    CatalogEntry, Diagnostic, MatchRequest, ResolutionResult, RuleDocument, RuleKind, RuleSet,
};
