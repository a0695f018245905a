//! Temporary project fixtures with a populated rules directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const RULES_DIR: &str = ".cursor/rules";

/// A project root containing `.cursor/rules/`.
pub struct RulesFixture {
    temp: TempDir,
}

impl RulesFixture {
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn rules_dir(&self) -> PathBuf {
        self.temp.path().join(RULES_DIR)
    }
}

#[derive(Default)]
pub struct RulesFixtureBuilder {
    files: Vec<(String, String)>,
}

impl RulesFixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn always(self, path: &str, body: &str) -> Self {
        self.raw(path, &format!("---\nalwaysApply: true\n---\n{}\n", body))
    }

    pub fn context(self, path: &str, description: &str, globs: &str, body: &str) -> Self {
        self.raw(
            path,
            &format!(
                "---\ndescription: {}\nglobs: {}\nalwaysApply: false\n---\n{}\n",
                description, globs, body
            ),
        )
    }

    pub fn agent(self, path: &str, description: &str, body: &str) -> Self {
        self.raw(
            path,
            &format!("---\ndescription: {}\nglobs:\nalwaysApply: false\n---\n{}\n", description, body),
        )
    }

    pub fn raw(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    pub fn build(self) -> RulesFixture {
        let temp = TempDir::new().unwrap();
        let rules_dir = temp.path().join(RULES_DIR);
        fs::create_dir_all(&rules_dir).unwrap();

        for (path, content) in self.files {
            let full = rules_dir.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }

        RulesFixture { temp }
    }
}

/// The rule layout used across integration tests.
pub fn sample_project() -> RulesFixture {
    RulesFixtureBuilder::new()
        .always("project.mdc", "Use pnpm. Keep components small.")
        .context(
            "frontend/react.mdc",
            "React component conventions",
            "src/components/**/*.tsx, src/hooks/*.ts",
            "Prefer function components.",
        )
        .context("docs.mdc", "Documentation style", "*.md, docs/**/*.md", "Write in present tense.")
        .agent("supabase.mdc", "Supabase schema and RLS notes", "Enable RLS on every table.")
        .build()
}
