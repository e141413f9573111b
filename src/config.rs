use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wpcli::Settings;

use crate::paths;

// ============================================================================
// Config File Schema
// ============================================================================

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// WP-CLI executable name or path
    pub tool: Option<String>,
    /// Directory to scan, `~` and `$VARS` allowed
    pub root: Option<String>,
    /// Installations probed at once
    pub jobs: Option<usize>,
    /// File marking an installation root
    pub marker_file: Option<String>,
    /// Substring identifying the options table in check output
    pub options_marker: Option<String>,
    /// Line printed by a successful database check
    pub check_success_marker: Option<String>,
}

impl FileConfig {
    /// Load from the default location; a missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    /// Load from `path`; a missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Layer the file values over `settings`.
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(tool) = self.tool {
            settings.tool = tool;
        }
        if let Some(root) = self.root {
            settings.scan_root = Some(paths::expand(&root));
        }
        if let Some(jobs) = self.jobs {
            settings.jobs = jobs;
        }
        if let Some(marker) = self.marker_file {
            settings.marker_file = marker;
        }
        if let Some(marker) = self.options_marker {
            settings.options_marker = marker;
        }
        if let Some(marker) = self.check_success_marker {
            settings.check_success_marker = marker;
        }
        settings
    }
}

// ============================================================================
// Command-line Overrides
// ============================================================================

/// Settings given on the command line, which win over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub tool: Option<String>,
    pub root: Option<String>,
    pub jobs: Option<usize>,
}

/// Defaults, then `file`, then `overrides`.
pub fn resolve(file: FileConfig, overrides: Overrides) -> Settings {
    let mut settings = file.apply(Settings::default());
    if let Some(tool) = overrides.tool {
        settings.tool = tool;
    }
    if let Some(root) = overrides.root {
        settings.scan_root = Some(paths::expand(&root));
    }
    if let Some(jobs) = overrides.jobs {
        settings.jobs = jobs;
    }
    settings
}
