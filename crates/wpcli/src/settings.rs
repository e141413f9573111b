use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backend::wp::DEFAULT_TOOL;
use crate::error::{Error, Result};

/// Default marker file identifying an installation root.
pub const DEFAULT_MARKER_FILE: &str = "wp-config.php";

/// Default substring identifying the options table in `wp db check` output.
pub const DEFAULT_OPTIONS_MARKER: &str = "_options";

/// Default line printed by `wp db check` when every table passed.
pub const DEFAULT_CHECK_SUCCESS_MARKER: &str = "Success: Database checked";

/// Settings shared by every component, passed in explicitly at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// WP-CLI executable name or path
    pub tool: String,
    /// File whose presence marks an installation root
    pub marker_file: String,
    /// Substring identifying the options table in check output
    pub options_marker: String,
    /// Line identifying a successful database check
    pub check_success_marker: String,
    /// Where to look for installations and dumps (home directory if unset)
    pub scan_root: Option<PathBuf>,
    /// Installations probed at once
    pub jobs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            marker_file: DEFAULT_MARKER_FILE.to_string(),
            options_marker: DEFAULT_OPTIONS_MARKER.to_string(),
            check_success_marker: DEFAULT_CHECK_SUCCESS_MARKER.to_string(),
            scan_root: None,
            jobs: 1,
        }
    }
}

impl Settings {
    /// Set the scan root.
    pub fn with_scan_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scan_root = Some(root.into());
        self
    }

    /// Set the number of probe workers.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// The configured scan root, or the user's home directory.
    pub fn scan_root(&self) -> Result<PathBuf> {
        match &self.scan_root {
            Some(root) => Ok(root.clone()),
            None => dirs::home_dir().ok_or(Error::NoHomeDirectory),
        }
    }

    /// Worker count, never below one.
    pub fn jobs(&self) -> usize {
        self.jobs.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tool, "wp");
        assert_eq!(settings.marker_file, "wp-config.php");
        assert_eq!(settings.options_marker, "_options");
        assert_eq!(settings.check_success_marker, "Success: Database checked");
        assert_eq!(settings.jobs(), 1);
    }

    #[test]
    fn test_scan_root_override() {
        let settings = Settings::default().with_scan_root("/srv/www");
        assert_eq!(settings.scan_root().unwrap(), PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_jobs_never_zero() {
        assert_eq!(Settings::default().with_jobs(0).jobs(), 1);
        assert_eq!(Settings::default().with_jobs(4).jobs(), 4);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"tool":"/opt/wp-cli/wp"}"#).unwrap();
        assert_eq!(settings.tool, "/opt/wp-cli/wp");
        assert_eq!(settings.marker_file, DEFAULT_MARKER_FILE);
    }
}
