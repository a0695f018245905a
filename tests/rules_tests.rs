mod fixtures;

use std::sync::Arc;

use cursor_rules::rules::{self, MatchRequest, RuleKind, RuleLoader, RuleStore, lookup, resolve};
use cursor_rules::{RuleError, RulesError};
use fixtures::rules_dir::{RulesFixtureBuilder, sample_project};

// ========== Loading ==========

#[tokio::test]
async fn test_load_sample_project_partitions() {
    let fixture = sample_project();
    let outcome = rules::load(fixture.rules_dir()).await.unwrap();

    assert!(outcome.is_clean());
    let set = &outcome.rule_set;
    assert_eq!(set.len(), 4);
    assert_eq!(set.always_applied().map(|d| d.name()).collect::<Vec<_>>(), vec!["project"]);
    assert_eq!(
        set.context_specific().map(|d| d.name()).collect::<Vec<_>>(),
        vec!["docs", "frontend/react"]
    );
    assert_eq!(
        set.agent_requestable().map(|d| d.name()).collect::<Vec<_>>(),
        vec!["supabase"]
    );
}

#[tokio::test]
async fn test_one_malformed_file_among_many() {
    let fixture = RulesFixtureBuilder::new()
        .always("a.mdc", "A")
        .context("b.mdc", "B", "*.b", "B")
        .raw("c.mdc", "---\ndescription: broken\nnot metadata at all\n---\nC")
        .context("d.mdc", "D", "*.d", "D")
        .agent("e.mdc", "E", "E")
        .build();

    let outcome = rules::load(fixture.rules_dir()).await.unwrap();
    assert_eq!(outcome.rule_set.len(), 4);
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(
        outcome.errors[0].rule_error(),
        Some(RuleError::MalformedMetadata(_))
    ));
}

#[tokio::test]
async fn test_missing_description_reported_with_path() {
    let fixture = RulesFixtureBuilder::new()
        .always("ok.mdc", "fine")
        .raw("nodesc.mdc", "---\nglobs: *.rs\n---\nbody")
        .build();

    let outcome = rules::load(fixture.rules_dir()).await.unwrap();
    assert_eq!(outcome.rule_set.len(), 1);
    match &outcome.errors[0] {
        RulesError::RuleLoad { path, source } => {
            assert!(path.ends_with("nodesc.mdc"));
            assert!(matches!(source, RuleError::MissingDescription));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_directory_not_found() {
    let fixture = sample_project();
    let result = rules::load(fixture.root().join("missing")).await;
    assert!(matches!(result, Err(RulesError::DirectoryNotFound(_))));
}

#[tokio::test]
async fn test_repeated_loads_are_identical() {
    let fixture = sample_project();
    let first = rules::load(fixture.rules_dir()).await.unwrap();
    let second = rules::load(fixture.rules_dir()).await.unwrap();
    assert_eq!(first.rule_set.documents(), second.rule_set.documents());
}

// ========== Resolution ==========

#[tokio::test]
async fn test_always_rules_for_empty_request() {
    let fixture = sample_project();
    let set = rules::load(fixture.rules_dir()).await.unwrap().rule_set;

    let result = resolve(&set, &MatchRequest::empty());
    assert_eq!(result.names(), vec!["project"]);
}

#[tokio::test]
async fn test_context_rules_follow_working_files() {
    let fixture = sample_project();
    let set = rules::load(fixture.rules_dir()).await.unwrap().rule_set;

    let request = MatchRequest::new(["src/components/ui/Button.tsx", "docs/guides/setup.md"]);
    let result = resolve(&set, &request);
    assert_eq!(result.names(), vec!["project", "docs", "frontend/react"]);

    let bodies: Vec<_> = result.bodies().collect();
    assert_eq!(bodies[0], "Use pnpm. Keep components small.");
}

#[tokio::test]
async fn test_single_star_stays_in_directory() {
    let fixture = RulesFixtureBuilder::new()
        .context("md.mdc", "markdown", "*.md", "md")
        .build();
    let set = rules::load(fixture.rules_dir()).await.unwrap().rule_set;

    assert_eq!(resolve(&set, &MatchRequest::new(["README.md"])).len(), 1);
    assert!(resolve(&set, &MatchRequest::new(["README.mdx"])).is_empty());
    assert!(resolve(&set, &MatchRequest::new(["docs/README.md"])).is_empty());
}

#[tokio::test]
async fn test_agent_rules_only_by_lookup() {
    let fixture = sample_project();
    let set = rules::load(fixture.rules_dir()).await.unwrap().rule_set;

    for paths in [vec![], vec!["supabase.mdc"], vec!["db/schema.sql", "README.md"]] {
        let result = resolve(&set, &MatchRequest::new(paths));
        assert!(result.rules().iter().all(|r| r.kind() != RuleKind::AgentRequested));
        assert_eq!(result.catalog()[0].name, "supabase");
    }

    let rule = lookup(&set, "supabase").unwrap();
    assert_eq!(rule.body(), "Enable RLS on every table.");
    assert!(matches!(
        lookup(&set, "firebase"),
        Err(RulesError::RuleNotFound(_))
    ));
}

#[tokio::test]
async fn test_resolution_deterministic_across_loads() {
    let fixture = sample_project();
    let request = MatchRequest::new(["README.md", "src/hooks/useAuth.ts"]);

    let a = resolve(&rules::load(fixture.rules_dir()).await.unwrap().rule_set, &request);
    let b = resolve(&rules::load(fixture.rules_dir()).await.unwrap().rule_set, &request);
    assert_eq!(a.to_prompt(0), b.to_prompt(0));
    assert_eq!(a, b);
}

// ========== Store ==========

#[tokio::test]
async fn test_store_reload_picks_up_new_rules() {
    let fixture = sample_project();
    let (store, errors) = RuleStore::open(RuleLoader::new(fixture.rules_dir()))
        .await
        .unwrap();
    assert!(errors.is_empty());
    let old = store.snapshot();

    std::fs::write(
        fixture.rules_dir().join("testing.mdc"),
        "---\nalwaysApply: true\n---\nWrite tests first.",
    )
    .unwrap();
    store.reload().await.unwrap();

    assert_eq!(old.len(), 4);
    assert_eq!(store.snapshot().len(), 5);
    assert_eq!(
        store.resolve(&MatchRequest::empty()).names(),
        vec!["project", "testing"]
    );
    assert!(!Arc::ptr_eq(&old, &store.snapshot()));
}
