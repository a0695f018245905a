//! Glob matching for rule file patterns.
//!
//! Vocabulary:
//! - `*` matches any run of characters except `/`
//! - `**` matches any run including `/` (`**/` also matches zero directories)
//! - `?` matches one non-separator character
//! - `[...]` character classes
//! - `{ts,tsx}` brace alternatives, expanded before compiling
//! - `a,b` comma-separated lists are a logical OR
//!
//! Matching is case-sensitive. An empty pattern list never matches.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Check whether `path` matches `pattern`, where `pattern` may be a
/// comma-separated list of globs.
pub fn matches(pattern: &str, path: &str) -> bool {
    GlobSet::new(split_patterns(pattern)).matches_any(path)
}

/// Split a comma-separated pattern list, dropping blank entries and
/// surrounding quotes. Commas inside `[...]` classes or `{...}` groups do
/// not split.
pub fn split_patterns(list: &str) -> Vec<String> {
    let mut patterns = Vec::new();
    let mut current = String::new();
    let mut in_class = false;
    let mut braces = 0usize;

    for c in list.chars() {
        match c {
            '[' => {
                in_class = true;
                current.push(c);
            }
            ']' => {
                in_class = false;
                current.push(c);
            }
            '{' if !in_class => {
                braces += 1;
                current.push(c);
            }
            '}' if !in_class => {
                braces = braces.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_class && braces == 0 => {
                push_pattern(&mut patterns, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_pattern(&mut patterns, &current);

    patterns
}

fn push_pattern(patterns: &mut Vec<String>, raw: &str) {
    let pattern = unquote(raw.trim()).trim();
    if !pattern.is_empty() {
        patterns.push(pattern.to_string());
    }
}

pub(crate) fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Normalise a path for matching: `\` becomes `/` and leading `./` is removed.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

/// Expand the first top-level `{a,b}` group, recursively. Unbalanced braces
/// are left as literal text.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut alternatives = Vec::new();
    let mut start = open + 1;
    for (i, c) in pattern[open..].char_indices().map(|(i, c)| (open + i, c)) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    alternatives.push(&pattern[start..i]);
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => {
                alternatives.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };
    let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
    alternatives
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt, suffix)))
        .collect()
}

/// `None` when any brace expansion fails to compile.
fn compile(source: &str) -> Option<Vec<Pattern>> {
    expand_braces(source)
        .iter()
        .map(|p| Pattern::new(p).ok())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct CompiledPattern {
    source: String,
    pattern: Option<Vec<Pattern>>,
}

/// The compiled, ordered pattern list of one rule document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobSet {
    patterns: Vec<CompiledPattern>,
}

impl GlobSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let source = p.into();
                let pattern = compile(&source);
                CompiledPattern { source, pattern }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Patterns in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    /// Patterns that failed to compile. They never match.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .filter(|p| p.pattern.is_none())
            .map(|p| p.source.as_str())
    }

    pub fn matches_any(&self, path: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let path = normalize_path(path);
        self.patterns.iter().any(|p| {
            p.pattern
                .as_ref()
                .is_some_and(|alts| alts.iter().any(|a| a.matches_with(&path, MATCH_OPTIONS)))
        })
    }
}
