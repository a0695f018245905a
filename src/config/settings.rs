use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{Result, RulesError};

/// Config file location relative to the project root.
pub const CONFIG_FILE: &str = ".cursor/rules.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub loader: LoaderConfig,
    pub resolver: ResolverConfig,
}

impl RulesConfig {
    /// Load `<root>/.cursor/rules.toml`, falling back to defaults when absent.
    pub async fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        let config = if fs::try_exists(&config_path).await? {
            debug!(path = %config_path.display(), "Loading config");
            let content = fs::read_to_string(&config_path).await?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RulesError::Config(e.to_string()))
    }

    /// Absolute rules directory for the given project root.
    pub fn rules_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.loader.rules_dir)
    }

    /// Validate configuration values, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.loader.rules_dir.as_os_str().is_empty() {
            errors.push("loader.rules_dir must not be empty".to_string());
        }
        if self.loader.extensions.is_empty() {
            errors.push("loader.extensions must not be empty".to_string());
        }
        for ext in &self.loader.extensions {
            if ext.is_empty() {
                errors.push("loader.extensions must not contain empty entries".to_string());
            } else if ext.starts_with('.') {
                errors.push(format!(
                    "loader.extensions entry `{}` must not start with '.'",
                    ext
                ));
            }
        }
        if self.loader.max_depth == 0 {
            errors.push("loader.max_depth must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RulesError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Rules directory, relative to the project root.
    pub rules_dir: PathBuf,
    /// File extensions treated as rule documents (without the dot).
    pub extensions: Vec<String>,
    /// Maximum directory depth scanned below the rules directory.
    pub max_depth: usize,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from(".cursor/rules"),
            extensions: vec!["mdc".into(), "md".into()],
            max_depth: 16,
            skip_hidden: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum combined rule body size when rendering a prompt (0 = unlimited).
    pub max_rule_content_chars: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_rule_content_chars: 50_000,
        }
    }
}
