use std::io::{self, Write};

use serde::Serialize;

use crate::cli::{Display, OutputFormat};
use crate::error::{Result, RulesError};
use crate::rules::{CatalogEntry, Diagnostic, ResolutionResult, RuleDocument, RuleKind, RuleSet};

/// Writes command results to stdout in the selected format.
///
/// - Text: human-readable output via [`Display`]
/// - Json: a single JSON object per command
pub struct OutputWriter {
    format: OutputFormat,
    display: Display,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            display: Display::new(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Emit a resolution. In text mode the rendered prompt is printed unless
    /// `names_only` is set.
    pub fn emit_resolution(
        &self,
        result: &ResolutionResult,
        errors: &[RulesError],
        names_only: bool,
        max_chars: usize,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if names_only {
                    self.display.print_resolution(result);
                } else {
                    print!("{}", result.to_prompt(max_chars));
                }
                Ok(())
            }
            OutputFormat::Json => {
                let output = ResolutionOutput {
                    rules: result.rules().iter().map(RuleOutput::full).collect(),
                    catalog: result.catalog().to_vec(),
                    errors: errors.iter().map(ErrorOutput::from).collect(),
                };
                self.write_json(&output)
            }
        }
    }

    pub fn emit_rule_set(&self, rule_set: &RuleSet, errors: &[RulesError]) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                self.display.print_rule_set(rule_set);
                Ok(())
            }
            OutputFormat::Json => {
                let output = RuleSetOutput {
                    root: rule_set.root().display().to_string(),
                    rules: rule_set.documents().iter().map(RuleOutput::summary).collect(),
                    errors: errors.iter().map(ErrorOutput::from).collect(),
                };
                self.write_json(&output)
            }
        }
    }

    pub fn emit_rule(&self, rule: &RuleDocument) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                self.display.print_rule_detail(rule);
                Ok(())
            }
            OutputFormat::Json => self.write_json(&RuleOutput::full(rule)),
        }
    }

    pub fn emit_check(&self, rule_set: &RuleSet, errors: &[RulesError]) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                self.display.print_check(rule_set, errors);
                Ok(())
            }
            OutputFormat::Json => {
                let diagnostics = rule_set
                    .diagnostics()
                    .iter()
                    .map(|(doc, diag)| DiagnosticOutput::new(doc, diag))
                    .collect();
                let output = CheckOutput {
                    loaded: rule_set.len(),
                    errors: errors.iter().map(ErrorOutput::from).collect(),
                    diagnostics,
                };
                self.write_json(&output)
            }
        }
    }

    pub fn emit_message(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!("{}", message);
                Ok(())
            }
            OutputFormat::Json => self.write_json(&MessageOutput {
                message: message.to_string(),
            }),
        }
    }

    fn write_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", json)?;
        stdout.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleOutput {
    pub name: String,
    pub path: String,
    pub kind: RuleKind,
    pub description: Option<String>,
    pub globs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RuleOutput {
    fn summary(doc: &RuleDocument) -> Self {
        Self {
            name: doc.name().to_string(),
            path: doc.source().to_string(),
            kind: doc.kind(),
            description: doc.description().map(str::to_string),
            globs: doc.globs().map(str::to_string).collect(),
            body: None,
        }
    }

    fn full(doc: &RuleDocument) -> Self {
        Self {
            body: Some(doc.body().to_string()),
            ..Self::summary(doc)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub path: Option<String>,
    pub kind: &'static str,
    pub message: String,
}

impl From<&RulesError> for ErrorOutput {
    fn from(err: &RulesError) -> Self {
        match err {
            RulesError::RuleLoad { path, source } => Self {
                path: Some(path.display().to_string()),
                kind: source.kind(),
                message: source.to_string(),
            },
            other => Self {
                path: None,
                kind: "error",
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct DiagnosticOutput {
    name: String,
    path: String,
    message: String,
}

impl DiagnosticOutput {
    fn new(doc: &RuleDocument, diagnostic: &Diagnostic) -> Self {
        Self {
            name: doc.name().to_string(),
            path: doc.source().to_string(),
            message: diagnostic.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ResolutionOutput {
    rules: Vec<RuleOutput>,
    catalog: Vec<CatalogEntry>,
    errors: Vec<ErrorOutput>,
}

#[derive(Debug, Clone, Serialize)]
struct RuleSetOutput {
    root: String,
    rules: Vec<RuleOutput>,
    errors: Vec<ErrorOutput>,
}

#[derive(Debug, Clone, Serialize)]
struct CheckOutput {
    loaded: usize,
    errors: Vec<ErrorOutput>,
    diagnostics: Vec<DiagnosticOutput>,
}

#[derive(Debug, Clone, Serialize)]
struct MessageOutput {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;

    #[test]
    fn test_rule_output_summary_omits_body() {
        let doc = RuleDocument::new("web/react.mdc", "body")
            .with_description("React")
            .with_globs(["*.tsx"]);
        let json = serde_json::to_value(RuleOutput::summary(&doc)).unwrap();
        assert_eq!(json["name"], "web/react");
        assert_eq!(json["kind"], "context_specific");
        assert_eq!(json["globs"][0], "*.tsx");
        assert!(json.get("body").is_none());

        let full = serde_json::to_value(RuleOutput::full(&doc)).unwrap();
        assert_eq!(full["body"], "body");
    }

    #[test]
    fn test_error_output_from_rule_load() {
        let err = RulesError::rule_load("rules/bad.mdc", RuleError::MissingDescription);
        let output = ErrorOutput::from(&err);
        assert_eq!(output.path.as_deref(), Some("rules/bad.mdc"));
        assert_eq!(output.kind, "missing_description");
    }

    #[test]
    fn test_serialization_failure_converts_to_json_error() {
        let err: RulesError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, RulesError::Json(_)));
        assert_eq!(ErrorOutput::from(&err).kind, "error");
    }

    #[test]
    fn test_emit_reports_success() {
        let writer = OutputWriter::new(OutputFormat::Json);
        assert!(writer.emit_message("done").is_ok());
        assert!(writer.emit_rule_set(&RuleSet::default(), &[]).is_ok());
    }
}
