use console::{Style, style};

use crate::error::RulesError;
use crate::rules::{ResolutionResult, RuleDocument, RuleKind, RuleSet};
use crate::utils::truncate_chars;

pub struct Display;

impl Display {
    pub fn new() -> Self {
        Self
    }

    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", style(text).bold().cyan());
        println!("{}", style("═".repeat(60)).dim());
        println!();
    }

    pub fn print_rule_set(&self, rule_set: &RuleSet) {
        if rule_set.is_empty() {
            println!("{}", style("No rules found.").dim());
            return;
        }

        println!(
            "Always: {}  Context: {}  Agent: {}",
            style(rule_set.always_applied().count()).green(),
            style(rule_set.context_specific().count()).yellow(),
            style(rule_set.agent_requestable().count()).cyan()
        );
        println!();

        println!(
            "{:<8} {:<28} {:<40}",
            style("Kind").bold(),
            style("Name").bold(),
            style("Globs / Description").bold()
        );
        println!("{}", style("─".repeat(78)).dim());

        for kind in [
            RuleKind::Always,
            RuleKind::ContextSpecific,
            RuleKind::AgentRequested,
        ] {
            for rule in rule_set.by_kind(kind) {
                println!(
                    "{:<8} {:<28} {:<40}",
                    self.kind_style(kind).apply_to(kind.to_string()),
                    truncate_chars(rule.name(), 28),
                    truncate_chars(&self.summary(rule), 40)
                );
            }
        }
    }

    pub fn print_resolution(&self, result: &ResolutionResult) {
        for rule in result.rules() {
            println!(
                "{} {}",
                self.kind_style(rule.kind()).apply_to(format!("[{}]", rule.kind())),
                rule.name()
            );
        }
        if !result.catalog().is_empty() {
            println!();
            println!("{}", style("Available on request:").dim());
            for entry in result.catalog() {
                println!("  {} {}", style(&entry.name).cyan(), style(&entry.description).dim());
            }
        }
    }

    pub fn print_rule_detail(&self, rule: &RuleDocument) {
        self.print_header(&format!("Rule: {}", rule.name()));

        println!("Path:        {}", rule.source());
        println!(
            "Kind:        {}",
            self.kind_style(rule.kind()).apply_to(rule.kind().to_string())
        );
        if let Some(description) = rule.description() {
            println!("Description: {}", style(description).white().bold());
        }
        let globs: Vec<_> = rule.globs().collect();
        if !globs.is_empty() {
            println!("Globs:       {}", globs.join(", "));
        }
        println!();
        println!("{}", rule.body());
    }

    pub fn print_check(&self, rule_set: &RuleSet, errors: &[RulesError]) {
        let diagnostics = rule_set.diagnostics();
        for (rule, diagnostic) in &diagnostics {
            self.print_warning(&format!("{}: {}", rule.source(), diagnostic));
        }
        let diagnostics = diagnostics.len();

        if errors.is_empty() {
            self.print_success(&format!(
                "{} rules loaded, {} warnings",
                rule_set.len(),
                diagnostics
            ));
        } else {
            println!(
                "{} rules loaded, {} errors, {} warnings",
                rule_set.len(),
                style(errors.len()).red().bold(),
                diagnostics
            );
        }
    }

    /// Per-file load errors go to stderr so stdout stays usable.
    pub fn print_load_errors(&self, errors: &[RulesError]) {
        for error in errors {
            self.print_error(&error.to_string());
        }
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", style("✓").green().bold(), message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", style("!").yellow().bold(), message);
    }

    fn summary(&self, rule: &RuleDocument) -> String {
        match rule.kind() {
            RuleKind::ContextSpecific => rule.globs().collect::<Vec<_>>().join(", "),
            _ => rule.description().unwrap_or_default().to_string(),
        }
    }

    fn kind_style(&self, kind: RuleKind) -> Style {
        match kind {
            RuleKind::Always => Style::new().green(),
            RuleKind::ContextSpecific => Style::new().yellow(),
            RuleKind::AgentRequested => Style::new().cyan(),
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
