pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod rules;
pub mod utils;

pub use config::RulesConfig;
pub use error::{Result, RuleError, RulesError};
pub use rules::{
    MatchRequest, ResolutionResult, RuleDocument, RuleKind, RuleLoader, RuleSet, RuleStore,
    lookup, resolve,
};
