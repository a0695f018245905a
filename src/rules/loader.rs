//! Loading rule documents from the filesystem.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use super::parser::parse_rule;
use super::types::{RuleDocument, RuleSet};
use crate::config::LoaderConfig;
use crate::error::{Result, RuleError, RulesError};

/// A rule set plus every per-file failure met while building it.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub rule_set: RuleSet,
    pub errors: Vec<RulesError>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Load all rules under `root` with the default configuration.
pub async fn load(root: impl Into<PathBuf>) -> Result<LoadOutcome> {
    RuleLoader::new(root).load().await
}

/// Scans a directory tree and builds a [`RuleSet`].
///
/// Loading is best-effort: a file that fails to read or parse is reported in
/// [`LoadOutcome::errors`] and the remaining files are still loaded.
///
/// ```text
/// .cursor/rules/
/// ├── project.mdc              # alwaysApply: true
/// ├── frontend/
/// │   ├── react.mdc            # globs: src/components/**/*.tsx
/// │   └── styling.mdc          # globs: *.css, *.scss
/// └── database.mdc             # description only: fetched on request
/// ```
#[derive(Debug, Clone)]
pub struct RuleLoader {
    root: PathBuf,
    config: LoaderConfig,
}

impl RuleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn load(&self) -> Result<LoadOutcome> {
        let is_dir = fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(RulesError::DirectoryNotFound(self.root.clone()));
        }

        let mut errors = Vec::new();
        let mut files = self.collect_files(&mut errors).await;
        files.sort_by_key(|rel| relative_key(rel));

        let mut documents = Vec::with_capacity(files.len());

        for rel in files {
            let path = self.root.join(&rel);
            match self.load_file(&path, &rel).await {
                Ok(doc) => {
                    for diagnostic in doc.diagnostics() {
                        debug!(path = %path.display(), "{}", diagnostic);
                    }
                    debug!(path = %path.display(), kind = %doc.kind(), "Loaded rule");
                    documents.push(doc);
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Failed to load rule");
                    errors.push(RulesError::rule_load(path, e));
                }
            }
        }

        // Directory failures are met during the walk; merge them into path order.
        errors.sort_by_cached_key(|e| {
            e.path()
                .map(|p| relative_key(p.strip_prefix(&self.root).unwrap_or(p)))
                .unwrap_or_default()
        });

        let rule_set = RuleSet::new(self.root.clone(), documents);
        info!(
            root = %self.root.display(),
            count = rule_set.len(),
            always = rule_set.always_applied().count(),
            context = rule_set.context_specific().count(),
            agent = rule_set.agent_requestable().count(),
            errors = errors.len(),
            "Loaded rules"
        );

        Ok(LoadOutcome { rule_set, errors })
    }

    async fn load_file(
        &self,
        path: &Path,
        rel: &Path,
    ) -> std::result::Result<RuleDocument, RuleError> {
        let content = fs::read_to_string(path).await?;
        parse_rule(rel, &content)
    }

    /// Collect candidate files as paths relative to the root.
    async fn collect_files(&self, errors: &mut Vec<RulesError>) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![(PathBuf::new(), 0usize)];

        while let Some((rel_dir, depth)) = pending.pop() {
            let dir = self.root.join(&rel_dir);
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "Failed to read directory");
                    errors.push(RulesError::rule_load(dir, RuleError::Unreadable(e)));
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        errors.push(RulesError::rule_load(&dir, RuleError::Unreadable(e)));
                        break;
                    }
                };

                let file_name = entry.file_name();
                let skipped =
                    self.config.skip_hidden && file_name.to_string_lossy().starts_with('.');
                let rel = rel_dir.join(&file_name);

                // Follows symlinks to files; symlinked directories are not descended.
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };
                if file_type.is_dir() {
                    if skipped {
                        continue;
                    }
                    if depth + 1 < self.config.max_depth {
                        pending.push((rel, depth + 1));
                    } else {
                        debug!(path = %entry.path().display(), "Max depth reached, skipping");
                    }
                    continue;
                }

                let is_file = file_type.is_file()
                    || (file_type.is_symlink()
                        && fs::metadata(entry.path())
                            .await
                            .is_ok_and(|m| m.is_file()));
                if is_file && !skipped && self.has_rule_extension(&rel) {
                    files.push(rel);
                }
            }
        }

        files
    }

    fn has_rule_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.extensions.iter().any(|e| e == ext))
    }
}

/// Platform-independent sort key: `/`-separated relative path.
fn relative_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
