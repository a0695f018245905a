use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to turn a single source file into a rule document.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("Missing description (required unless alwaysApply is true)")]
    MissingDescription,

    #[error("Unreadable rule file: {0}")]
    Unreadable(#[from] std::io::Error),
}

impl RuleError {
    /// Short stable identifier, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedMetadata(_) => "malformed_metadata",
            Self::MissingDescription => "missing_description",
            Self::Unreadable(_) => "unreadable",
        }
    }
}

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Rules directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to load rule {}: {source}", .path.display())]
    RuleLoad {
        path: PathBuf,
        #[source]
        source: RuleError,
    },

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RulesError {
    pub fn rule_load(path: impl Into<PathBuf>, source: RuleError) -> Self {
        Self::RuleLoad {
            path: path.into(),
            source,
        }
    }

    /// The file or directory that failed, if this is a `RuleLoad` error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::RuleLoad { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The per-file cause, if this is a `RuleLoad` error.
    pub fn rule_error(&self) -> Option<&RuleError> {
        match self {
            Self::RuleLoad { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_load_display_includes_path_and_cause() {
        let err = RulesError::rule_load("rules/api.mdc", RuleError::MissingDescription);
        let msg = err.to_string();
        assert!(msg.contains("rules/api.mdc"));
        assert!(msg.contains("Missing description"));
    }

    #[test]
    fn test_rule_error_accessor() {
        let err = RulesError::rule_load(
            "a.md",
            RuleError::MalformedMetadata("unterminated block".into()),
        );
        assert!(matches!(
            err.rule_error(),
            Some(RuleError::MalformedMetadata(_))
        ));
        assert!(RulesError::RuleNotFound("x".into()).rule_error().is_none());
        assert_eq!(err.path(), Some(Path::new("a.md")));
        assert!(RulesError::RuleNotFound("x".into()).path().is_none());
    }

    #[test]
    fn test_rule_error_kind() {
        assert_eq!(RuleError::MissingDescription.kind(), "missing_description");
        assert_eq!(
            RuleError::MalformedMetadata("x".into()).kind(),
            "malformed_metadata"
        );
    }
}
