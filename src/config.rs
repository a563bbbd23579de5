//! Engine configuration and its inheritance chain.
//!
//! Configuration is loaded from up to three JSON files with increasing
//! priority:
//!
//! 1. **User** - `{config_dir}/widget-stats/config.json`
//! 2. **Project** - `.widget-stats/config.json` in the working directory
//! 3. **Explicit** - a path passed with `--config`
//!
//! Later files override earlier ones key by key. Missing user and project
//! files are skipped; a missing explicit file is an error.
//!
//! # Example
//!
//! ```json
//! {
//!   "historyTopN": 10,
//!   "defaultTimeline": "week"
//! }
//! ```

use crate::error::{Result, WidgetError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name used under the platform config dir and the project root.
pub const CONFIG_DIR_NAME: &str = "widget-stats";

// ============================================================================
// Engine Config
// ============================================================================

/// Tunables for the aggregation engine.
///
/// # Example
///
/// ```
/// use widget_stats::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.history_top_n, 20);
/// assert_eq!(config.comparison_quantity, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Number of items kept by the flaky and most-failed rankings.
    pub history_top_n: usize,
    /// Number of newest records compared by the launches comparison chart.
    pub comparison_quantity: usize,
    /// Sort field that keeps ascending trend output in fetch order.
    pub sort_field: String,
    /// Period applied to trend widgets that have no `timeline` option.
    pub default_timeline: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_top_n: 20,
            comparison_quantity: 2,
            sort_field: crate::request::START_TIME_FIELD.to_string(),
            default_timeline: None,
        }
    }
}

impl EngineConfig {
    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::InvalidConfig`] for a zero ranking size, a zero
    /// comparison quantity, an empty sort field, or an unknown default timeline.
    pub fn validate(&self) -> Result<()> {
        if self.history_top_n == 0 {
            return Err(WidgetError::InvalidConfig {
                field: "historyTopN".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.comparison_quantity == 0 {
            return Err(WidgetError::InvalidConfig {
                field: "comparisonQuantity".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.sort_field.trim().is_empty() {
            return Err(WidgetError::InvalidConfig {
                field: "sortField".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(timeline) = &self.default_timeline {
            match timeline.parse::<crate::aggregation::GroupingPeriod>() {
                Ok(period) if period.is_temporal() => {}
                Ok(_) => {
                    return Err(WidgetError::InvalidConfig {
                        field: "defaultTimeline".to_string(),
                        reason: "must be day, week or month".to_string(),
                    });
                }
                Err(e) => {
                    return Err(WidgetError::InvalidConfig {
                        field: "defaultTimeline".to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Path of the project-level config file.
    #[must_use]
    pub fn project_path(project_dir: &Path) -> PathBuf {
        project_dir
            .join(format!(".{CONFIG_DIR_NAME}"))
            .join("config.json")
    }

    /// Path of the user-level config file, if the platform has a config dir.
    #[must_use]
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).join("config.json"))
    }
}

// ============================================================================
// Configuration Level
// ============================================================================

/// Level of a config file in the inheritance chain.
///
/// ```
/// use widget_stats::config::ConfigLevel;
///
/// assert!(ConfigLevel::User < ConfigLevel::Project);
/// assert!(ConfigLevel::Project < ConfigLevel::Explicit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLevel {
    /// User-wide configuration (lowest priority).
    User,
    /// Project configuration.
    Project,
    /// File passed on the command line (highest priority).
    Explicit,
}

impl std::fmt::Display for ConfigLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Project => write!(f, "project"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// A config file that was (or could have been) loaded.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub level: ConfigLevel,
    pub path: PathBuf,
    /// `false` when the file does not exist.
    pub loaded: bool,
}

/// Every config file checked during resolution, in priority order.
#[derive(Debug, Clone, Default)]
pub struct InheritanceChain {
    pub sources: Vec<ConfigSource>,
}

impl InheritanceChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a checked source.
    pub fn add_source(&mut self, level: ConfigLevel, path: PathBuf, loaded: bool) {
        self.sources.push(ConfigSource {
            level,
            path,
            loaded,
        });
    }

    /// Number of sources that were actually loaded.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.sources.iter().filter(|s| s.loaded).count()
    }

    /// Multi-line description for display.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec!["Configuration inheritance chain:".to_string()];
        for source in &self.sources {
            let status = if source.loaded { "+" } else { "-" };
            lines.push(format!(
                "  {} [{}] {}",
                status,
                source.level,
                source.path.display()
            ));
        }
        lines.join("\n")
    }
}

// ============================================================================
// Config Loader
// ============================================================================

/// Loads [`EngineConfig`] through the inheritance chain.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader using the platform user config path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_config_path: EngineConfig::user_path(),
            explicit_path: None,
        }
    }

    /// Override the user config path.
    #[must_use]
    pub fn with_user_config_path(mut self, path: PathBuf) -> Self {
        self.user_config_path = Some(path);
        self
    }

    /// Skip the user config level entirely.
    #[must_use]
    pub fn without_user_config(mut self) -> Self {
        self.user_config_path = None;
        self
    }

    /// Add an explicit config file on top of the chain.
    #[must_use]
    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    /// Load and validate the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be parsed, the explicit file
    /// is missing, or the merged values fail validation.
    pub fn load(&self, project_dir: &Path) -> anyhow::Result<EngineConfig> {
        let (config, chain) = self.load_with_chain(project_dir)?;
        debug!("{}", chain.describe());
        Ok(config)
    }

    /// Load the merged configuration and report which files were used.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_with_chain(
        &self,
        project_dir: &Path,
    ) -> anyhow::Result<(EngineConfig, InheritanceChain)> {
        let mut chain = InheritanceChain::new();
        let mut merged = serde_json::Value::Object(serde_json::Map::new());

        if let Some(user_path) = &self.user_config_path {
            let loaded = load_and_merge(&mut merged, user_path)?;
            chain.add_source(ConfigLevel::User, user_path.clone(), loaded);
        }

        let project_path = EngineConfig::project_path(project_dir);
        let loaded = load_and_merge(&mut merged, &project_path)?;
        chain.add_source(ConfigLevel::Project, project_path, loaded);

        if let Some(explicit) = &self.explicit_path {
            if !explicit.exists() {
                return Err(WidgetError::config_with_path(
                    format!("config file not found: {}", explicit.display()),
                    explicit.clone(),
                )
                .into());
            }
            let loaded = load_and_merge(&mut merged, explicit)?;
            chain.add_source(ConfigLevel::Explicit, explicit.clone(), loaded);
        }

        let config: EngineConfig =
            serde_json::from_value(merged).context("Failed to parse merged configuration")?;
        config.validate()?;
        Ok((config, chain))
    }
}

/// Merge one file into the accumulated value. Returns `false` if it is absent.
fn load_and_merge(accumulated: &mut serde_json::Value, path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| WidgetError::config_with_path(e.to_string(), path.to_path_buf()))?;
    deep_merge(accumulated, value);
    Ok(true)
}

fn deep_merge(parent: &mut serde_json::Value, child: serde_json::Value) {
    match (parent, child) {
        (serde_json::Value::Object(parent_map), serde_json::Value::Object(child_map)) => {
            for (key, child_value) in child_map {
                match parent_map.get_mut(&key) {
                    Some(parent_value) => deep_merge(parent_value, child_value),
                    None => {
                        parent_map.insert(key, child_value);
                    }
                }
            }
        }
        (parent, child) => *parent = child,
    }
}
