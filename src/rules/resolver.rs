//! Rule resolver for determining applicable rules based on working files.

use super::types::{CatalogEntry, MatchRequest, ResolutionResult, RuleDocument, RuleSet};
use crate::error::{Result, RulesError};

/// Resolve the rules applicable to `request`. See [`RuleResolver::resolve`].
pub fn resolve(rule_set: &RuleSet, request: &MatchRequest) -> ResolutionResult {
    RuleResolver::new(rule_set).resolve(request)
}

/// Fetch a rule by name. See [`RuleResolver::lookup`].
pub fn lookup<'a>(rule_set: &'a RuleSet, name: &str) -> Result<&'a RuleDocument> {
    RuleResolver::new(rule_set).lookup(name)
}

/// Resolves which rules apply to a given set of working files.
pub struct RuleResolver<'a> {
    rule_set: &'a RuleSet,
}

impl<'a> RuleResolver<'a> {
    pub fn new(rule_set: &'a RuleSet) -> Self {
        Self { rule_set }
    }

    /// Resolve all applicable rules for the request.
    ///
    /// Output order: always-applied rules, then context-specific rules whose
    /// patterns match any request path, each group in load order. Each
    /// document appears at most once. Agent-requestable rules are never
    /// included; they are listed in the result's catalog instead.
    pub fn resolve(&self, request: &MatchRequest) -> ResolutionResult {
        let mut resolved = ResolutionResult::new();

        // 1. Always-applied, unconditionally
        for rule in self.rule_set.always_applied() {
            resolved.add_unique(rule);
        }

        // 2. Context-specific, when any working file matches
        for rule in self.rule_set.context_specific() {
            if rule.applies_to(request.paths()) {
                resolved.add_unique(rule);
            }
        }

        // 3. Agent-requestable, advertised only
        resolved.with_catalog(self.catalog())
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.rule_set
            .agent_requestable()
            .map(CatalogEntry::from)
            .collect()
    }

    /// Fetch a rule by name.
    ///
    /// Accepts the relative file path (`frontend/react.mdc`), the full name
    /// (`frontend/react`) or a bare file stem (`react`). A name or stem shared
    /// by several files is ambiguous and only the path will find them.
    pub fn lookup(&self, name: &str) -> Result<&'a RuleDocument> {
        let name = name.trim().trim_start_matches("./");
        let documents = self.rule_set.documents();

        if let Some(doc) = documents.iter().find(|d| d.source() == name) {
            return Ok(doc);
        }

        let by_name = unique(documents.iter().filter(|d| d.name() == name));
        by_name
            .or_else(|| unique(documents.iter().filter(|d| d.stem() == name)))
            .ok_or_else(|| RulesError::RuleNotFound(name.to_string()))
    }
}

fn unique<'a>(mut matches: impl Iterator<Item = &'a RuleDocument>) -> Option<&'a RuleDocument> {
    match (matches.next(), matches.next()) {
        (Some(doc), None) => Some(doc),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;

    fn sample_set() -> RuleSet {
        RuleSet::new(
            "rules",
            vec![
                RuleDocument::new("project.mdc", "project").with_always_apply(true),
                RuleDocument::new("frontend/react.mdc", "react")
                    .with_description("React")
                    .with_globs(["src/**/*.tsx", "src/**/*.jsx"]),
                RuleDocument::new("docs.mdc", "docs")
                    .with_description("Docs")
                    .with_globs(["*.md", "docs/**/*.md"]),
                RuleDocument::new("database.mdc", "database").with_description("Schema notes"),
                RuleDocument::new("inert.mdc", "inert")
                    .with_description("Never attached")
                    .with_globs(Vec::<String>::new()),
                RuleDocument::new("core/style.mdc", "style a").with_always_apply(true),
                RuleDocument::new("web/style.mdc", "style b")
                    .with_description("web style")
                    .with_globs(["*.css"]),
            ],
        )
    }

    #[test]
    fn test_empty_request_yields_only_always() {
        let set = sample_set();
        let result = resolve(&set, &MatchRequest::empty());
        assert_eq!(result.names(), vec!["core/style", "project"]);
        assert!(result.rules().iter().all(|r| r.kind() == RuleKind::Always));
    }

    #[test]
    fn test_always_first_then_context_in_load_order() {
        let set = sample_set();
        let request = MatchRequest::new(["src/app/App.tsx", "README.md", "site.css"]);
        let result = resolve(&set, &request);
        assert_eq!(
            result.names(),
            vec!["core/style", "project", "docs", "frontend/react", "web/style"]
        );
    }

    #[test]
    fn test_multiple_matching_patterns_contribute_once() {
        let set = sample_set();
        let request = MatchRequest::new(["src/a.tsx", "src/b.jsx", "src/c/d.tsx"]);
        let result = resolve(&set, &request);
        assert_eq!(
            result.names().iter().filter(|n| **n == "frontend/react").count(),
            1
        );
    }

    #[test]
    fn test_agent_requestable_never_resolved() {
        let set = sample_set();
        let request = MatchRequest::new(["database.sql", "inert.mdc", "src/x.tsx"]);
        let result = resolve(&set, &request);
        assert!(!result.names().contains(&"database"));
        assert!(!result.names().contains(&"inert"));

        let catalog: Vec<_> = result.catalog().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(catalog, vec!["database", "inert"]);
        assert_eq!(result.catalog()[0].description, "Schema notes");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let set = sample_set();
        let request = MatchRequest::new(["docs/guides/x.md", "src/y.tsx"]);
        let first = resolve(&set, &request);
        let second = resolve(&set, &request);
        assert_eq!(first, second);
        assert_eq!(first.to_prompt(0), second.to_prompt(0));
    }

    #[test]
    fn test_lookup() {
        let set = sample_set();
        assert_eq!(lookup(&set, "database").unwrap().body(), "database");
        assert_eq!(lookup(&set, "frontend/react").unwrap().body(), "react");
        assert_eq!(lookup(&set, "frontend/react.mdc").unwrap().body(), "react");
        assert_eq!(lookup(&set, "react").unwrap().body(), "react");
        assert!(matches!(
            lookup(&set, "missing"),
            Err(RulesError::RuleNotFound(_))
        ));
    }

    #[test]
    fn test_lookup_ambiguous_stem_is_not_found() {
        let set = sample_set();
        assert!(matches!(
            lookup(&set, "style"),
            Err(RulesError::RuleNotFound(_))
        ));
        assert_eq!(lookup(&set, "web/style").unwrap().body(), "style b");
    }

    #[test]
    fn test_lookup_shared_name_needs_path() {
        let set = RuleSet::new(
            "rules",
            vec![
                RuleDocument::new("style.md", "md").with_always_apply(true),
                RuleDocument::new("style.mdc", "mdc").with_always_apply(true),
            ],
        );

        assert!(matches!(
            lookup(&set, "style"),
            Err(RulesError::RuleNotFound(_))
        ));
        assert_eq!(lookup(&set, "style.md").unwrap().body(), "md");
        assert_eq!(lookup(&set, "style.mdc").unwrap().body(), "mdc");

        let result = resolve(&set, &MatchRequest::empty());
        assert_eq!(result.bodies().collect::<Vec<_>>(), vec!["md", "mdc"]);
    }

    #[test]
    fn test_empty_rule_set() {
        let set = RuleSet::default();
        let result = resolve(&set, &MatchRequest::new(["src/main.rs"]));
        assert!(result.is_empty());
        assert!(result.catalog().is_empty());
    }
}
