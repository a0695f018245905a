//! Shared, swappable rule set snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::loader::{LoadOutcome, RuleLoader};
use super::resolver::resolve;
use super::types::{MatchRequest, ResolutionResult, RuleSet};
use crate::error::{Result, RulesError};

/// Holds the current [`RuleSet`] snapshot for concurrent readers.
///
/// Readers take an `Arc` snapshot and resolve against it without holding the
/// lock. `reload` builds a complete new rule set first and only then swaps the
/// pointer, so a reader never observes a partially loaded set. Snapshots taken
/// before a reload stay valid and unchanged.
pub struct RuleStore {
    loader: RuleLoader,
    current: RwLock<Arc<RuleSet>>,
}

impl RuleStore {
    /// Load the initial snapshot. Per-file errors are returned alongside.
    pub async fn open(loader: RuleLoader) -> Result<(Self, Vec<RulesError>)> {
        let LoadOutcome { rule_set, errors } = loader.load().await?;
        let store = Self {
            loader,
            current: RwLock::new(Arc::new(rule_set)),
        };
        Ok((store, errors))
    }

    pub fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&self.current.read())
    }

    /// Rebuild the rule set from disk and swap it in.
    ///
    /// If the rules directory has disappeared the current snapshot is kept and
    /// the error is returned.
    pub async fn reload(&self) -> Result<Vec<RulesError>> {
        let LoadOutcome { rule_set, errors } = self.loader.load().await?;
        let count = rule_set.len();
        *self.current.write() = Arc::new(rule_set);
        info!(count, errors = errors.len(), "Reloaded rules");
        Ok(errors)
    }

    pub fn resolve(&self, request: &MatchRequest) -> ResolutionResult {
        resolve(&self.snapshot(), request)
    }
}
