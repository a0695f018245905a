//! Rule document types.
//!
//! A rule document is one markdown file whose frontmatter decides when its
//! body is surfaced. Documents fall into exactly one of three partitions,
//! derived from their metadata:
//!
//! | Kind            | alwaysApply | globs     | Included by `resolve`        |
//! |-----------------|-------------|-----------|------------------------------|
//! | Always          | true        | ignored   | always                       |
//! | ContextSpecific | false       | non-empty | when any working file matches |
//! | AgentRequested  | false       | empty     | never (lookup by name only)  |

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::glob::{GlobSet, normalize_path};
use crate::utils::truncate_with_marker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Always,
    ContextSpecific,
    AgentRequested,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::ContextSpecific => write!(f, "context"),
            Self::AgentRequested => write!(f, "agent"),
        }
    }
}

/// Legal but suspicious state of a loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `alwaysApply: true` together with glob patterns that will never be consulted.
    PatternsIgnored,
    /// A `globs` key with no usable pattern on a rule that is not always applied.
    EmptyGlobs,
    /// A pattern that does not compile and therefore never matches.
    InvalidGlob(String),
    EmptyBody,
    /// Another file in the set derives the same name; lookup needs the path.
    SharedName(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternsIgnored => write!(f, "globs are ignored because alwaysApply is true"),
            Self::EmptyGlobs => write!(f, "globs declared but empty; rule is never auto-attached"),
            Self::InvalidGlob(p) => write!(f, "invalid glob pattern `{}` never matches", p),
            Self::EmptyBody => write!(f, "rule body is empty"),
            Self::SharedName(name) => write!(
                f,
                "name `{}` is shared with another rule file; look it up by path",
                name
            ),
        }
    }
}

/// A parsed rule file. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDocument {
    path: PathBuf,
    source: String,
    name: String,
    description: Option<String>,
    globs: GlobSet,
    globs_declared: bool,
    always_apply: bool,
    body: String,
}

impl RuleDocument {
    /// `path` is relative to the rules root and is the document's identity.
    pub fn new(path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        let path = path.into();
        let source = normalize_path(&path.to_string_lossy());
        let name = rule_name(&source);
        Self {
            path,
            source,
            name,
            description: None,
            globs: GlobSet::default(),
            globs_declared: false,
            always_apply: false,
            body: body.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_globs<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globs = GlobSet::new(patterns);
        self.globs_declared = true;
        self
    }

    pub fn with_always_apply(mut self, always_apply: bool) -> Self {
        self.always_apply = always_apply;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative path with `/` separators.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Relative path without extension, e.g. `frontend/react`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without extension, e.g. `react`.
    pub fn stem(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn globs(&self) -> impl Iterator<Item = &str> {
        self.globs.sources()
    }

    pub fn always_apply(&self) -> bool {
        self.always_apply
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn kind(&self) -> RuleKind {
        if self.always_apply {
            RuleKind::Always
        } else if self.globs.is_empty() {
            RuleKind::AgentRequested
        } else {
            RuleKind::ContextSpecific
        }
    }

    /// Whether any of the given paths matches this document's patterns.
    /// Always-applied documents match unconditionally; patterns are ignored.
    pub fn applies_to<'p>(&self, paths: impl IntoIterator<Item = &'p str>) -> bool {
        match self.kind() {
            RuleKind::Always => true,
            RuleKind::AgentRequested => false,
            RuleKind::ContextSpecific => paths.into_iter().any(|p| self.globs.matches_any(p)),
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if self.always_apply && !self.globs.is_empty() {
            diagnostics.push(Diagnostic::PatternsIgnored);
        }
        if !self.always_apply && self.globs_declared && self.globs.is_empty() {
            diagnostics.push(Diagnostic::EmptyGlobs);
        }
        if !self.always_apply {
            diagnostics.extend(
                self.globs
                    .invalid_patterns()
                    .map(|p| Diagnostic::InvalidGlob(p.to_string())),
            );
        }
        if self.body.trim().is_empty() {
            diagnostics.push(Diagnostic::EmptyBody);
        }

        diagnostics
    }
}

fn rule_name(source: &str) -> String {
    let file_start = source.rfind('/').map_or(0, |i| i + 1);
    match source[file_start..].rfind('.') {
        Some(dot) if dot > 0 => source[..file_start + dot].to_string(),
        _ => source.to_string(),
    }
}

/// All rule documents loaded from one directory tree at one point in time.
///
/// Documents are kept in lexical order of their relative path, which is also
/// the order of every partition view.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    root: PathBuf,
    documents: Vec<RuleDocument>,
}

impl RuleSet {
    pub fn new(root: impl Into<PathBuf>, mut documents: Vec<RuleDocument>) -> Self {
        documents.sort_by(|a, b| a.source.cmp(&b.source));
        Self {
            root: root.into(),
            documents,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn documents(&self) -> &[RuleDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn by_kind(&self, kind: RuleKind) -> impl Iterator<Item = &RuleDocument> {
        self.documents.iter().filter(move |d| d.kind() == kind)
    }

    pub fn always_applied(&self) -> impl Iterator<Item = &RuleDocument> {
        self.by_kind(RuleKind::Always)
    }

    pub fn context_specific(&self) -> impl Iterator<Item = &RuleDocument> {
        self.by_kind(RuleKind::ContextSpecific)
    }

    pub fn agent_requestable(&self) -> impl Iterator<Item = &RuleDocument> {
        self.by_kind(RuleKind::AgentRequested)
    }

    /// Documents whose derived name is `name`. Usually one, but `style.md`
    /// and `style.mdc` are distinct documents with the same name.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RuleDocument> {
        self.documents.iter().filter(move |d| d.name == name)
    }

    /// Per-document diagnostics plus name clashes across the set, in load order.
    pub fn diagnostics(&self) -> Vec<(&RuleDocument, Diagnostic)> {
        let mut diagnostics = Vec::new();
        for doc in &self.documents {
            if self.named(&doc.name).nth(1).is_some() {
                diagnostics.push((doc, Diagnostic::SharedName(doc.name.clone())));
            }
            diagnostics.extend(doc.diagnostics().into_iter().map(|d| (doc, d)));
        }
        diagnostics
    }
}

/// The files currently open or being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRequest {
    paths: BTreeSet<String>,
}

impl MatchRequest {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths = paths
            .into_iter()
            .map(|p| normalize_path(&p.as_ref().to_string_lossy()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { paths }
    }

    /// Like `new`, but absolute paths under `base` are made relative to it.
    pub fn relative_to<I, P>(base: &Path, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::new(paths.into_iter().map(|p| {
            let p = p.as_ref();
            p.strip_prefix(base).unwrap_or(p).to_path_buf()
        }))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// An agent-requestable rule as advertised to the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
}

impl From<&RuleDocument> for CatalogEntry {
    fn from(doc: &RuleDocument) -> Self {
        Self {
            name: doc.name().to_string(),
            description: doc.description().unwrap_or_default().to_string(),
        }
    }
}

/// Rules applicable to one match request, in injection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionResult {
    rules: Vec<RuleDocument>,
    catalog: Vec<CatalogEntry>,
}

impl ResolutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document unless one with the same identity is already present.
    /// Returns false if it was a duplicate.
    pub fn add_unique(&mut self, rule: &RuleDocument) -> bool {
        if self.rules.iter().any(|r| r.path == rule.path) {
            false
        } else {
            self.rules.push(rule.clone());
            true
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<CatalogEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn rules(&self) -> &[RuleDocument] {
        &self.rules
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn bodies(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.body())
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Render the applicable rules as one markdown block.
    ///
    /// `max_chars` bounds the combined body size (0 = unlimited); the body
    /// that crosses the limit is truncated and later ones are dropped.
    pub fn to_prompt(&self, max_chars: usize) -> String {
        if self.rules.is_empty() {
            return String::new();
        }

        let mut prompt = String::with_capacity(self.rules.iter().map(|r| r.body.len()).sum());
        prompt.push_str("# Applicable Rules\n\n");

        let mut remaining = if max_chars == 0 { usize::MAX } else { max_chars };
        for rule in &self.rules {
            if remaining == 0 {
                break;
            }
            prompt.push_str(&format!("## {}\n", rule.name()));
            let len = rule.body.chars().count();
            if len > remaining {
                prompt.push_str(&truncate_with_marker(&rule.body, remaining));
                remaining = 0;
            } else {
                prompt.push_str(&rule.body);
                remaining -= len;
            }
            prompt.push_str("\n\n");
        }

        prompt
    }
}
