//! Rule document parsing.
//!
//! A rule file optionally begins with a metadata block:
//!
//! ```text
//! ---
//! description: React component conventions
//! globs: src/components/**/*.tsx, src/hooks/*.ts
//! alwaysApply: false
//! ---
//! Body text...
//! ```
//!
//! The block is read as YAML first. Rule files in the wild routinely carry
//! unquoted globs (`globs: **/*.ts`) which YAML rejects as alias syntax, so a
//! block that is not valid YAML is re-read as flat `key: value` lines.

use std::path::PathBuf;

use serde::Deserialize;

use super::glob::{split_patterns, unquote};
use super::types::RuleDocument;
use crate::error::RuleError;

const DELIMITER: &str = "---";

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    globs: Option<GlobsField>,
    #[serde(default, rename = "alwaysApply")]
    always_apply: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GlobsField {
    List(Vec<String>),
    Single(String),
}

impl GlobsField {
    fn into_patterns(self) -> Vec<String> {
        match self {
            Self::Single(list) => split_patterns(&list),
            Self::List(items) => items.iter().flat_map(|i| split_patterns(i)).collect(),
        }
    }
}

/// Parse a rule file. `path` is relative to the rules root.
pub fn parse_rule(path: impl Into<PathBuf>, text: &str) -> Result<RuleDocument, RuleError> {
    let (block, body) = split_frontmatter(text)?;

    let (frontmatter, globs_declared) = match block {
        Some(block) => (parse_frontmatter(block)?, declares_key(block, "globs")),
        None => (Frontmatter::default(), false),
    };

    let description = frontmatter
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    let always_apply = frontmatter.always_apply.unwrap_or(false);

    if !always_apply && description.is_none() {
        return Err(RuleError::MissingDescription);
    }

    let mut doc = RuleDocument::new(path, body.trim()).with_always_apply(always_apply);
    if let Some(description) = description {
        doc = doc.with_description(description);
    }
    if globs_declared {
        let patterns = frontmatter
            .globs
            .map(GlobsField::into_patterns)
            .unwrap_or_default();
        doc = doc.with_globs(patterns);
    }

    Ok(doc)
}

/// Split text into the metadata block (if any) and the body.
fn split_frontmatter(text: &str) -> Result<(Option<&str>, &str), RuleError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let (first_line, rest) = match text.find('\n') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    };
    if first_line.trim_end() != DELIMITER {
        return Ok((None, text));
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Ok((Some(&rest[..offset]), &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(RuleError::MalformedMetadata(
        "metadata block is not terminated by `---`".into(),
    ))
}

fn parse_frontmatter(block: &str) -> Result<Frontmatter, RuleError> {
    match serde_yaml_bw::from_str::<Frontmatter>(block) {
        Ok(frontmatter) => Ok(frontmatter),
        Err(_) => parse_flat(block),
    }
}

fn parse_flat(block: &str) -> Result<Frontmatter, RuleError> {
    let mut frontmatter = Frontmatter::default();

    for (idx, raw) in block.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(RuleError::MalformedMetadata(format!(
                "line {}: expected `key: value`, got `{}`",
                idx + 1,
                line
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(RuleError::MalformedMetadata(format!(
                "line {}: empty key",
                idx + 1
            )));
        }
        let value = unquote(value.trim());

        match key {
            "description" => frontmatter.description = Some(value.to_string()),
            "globs" => {
                let list = value
                    .strip_prefix('[')
                    .and_then(|v| v.strip_suffix(']'))
                    .unwrap_or(value);
                frontmatter.globs = Some(GlobsField::Single(list.to_string()));
            }
            "alwaysApply" => frontmatter.always_apply = Some(parse_bool(value, idx + 1)?),
            _ => {}
        }
    }

    Ok(frontmatter)
}

fn parse_bool(value: &str, line: usize) -> Result<bool, RuleError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") || value.is_empty() {
        Ok(false)
    } else {
        Err(RuleError::MalformedMetadata(format!(
            "line {}: alwaysApply must be true or false, got `{}`",
            line, value
        )))
    }
}

fn declares_key(block: &str, key: &str) -> bool {
    block.lines().any(|line| {
        line.split_once(':')
            .is_some_and(|(k, _)| !line.starts_with(char::is_whitespace) && k.trim() == key)
    })
}
