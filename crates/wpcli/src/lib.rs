//! # wpcli
//!
//! Pure Rust library for inspecting WordPress installations through WP-CLI.
//!
//! This crate provides functionality for:
//! - Discovering installations by walking a directory tree
//! - Probing each installation's database health and home URL
//! - Inspecting, exporting and importing databases
//! - Listing and editing wp-config.php directives
//!
//! Every long operation reports percentages on a [`progress`] channel.
//!
//! ## Example
//!
//! ```no_run
//! use wpcli::{progress, Client, Settings};
//!
//! let client = Client::new(Settings::default()).expect("WP-CLI not available");
//!
//! let installations = client.discover(progress::silent()).expect("Discovery failed");
//! for site in &installations {
//!     println!("{} {}", site.directory.display(), site.home_url);
//! }
//!
//! if let Some(site) = installations.first() {
//!     let info = client
//!         .database(site)
//!         .inspect(&progress::silent())
//!         .expect("Inspection failed");
//!     println!("{:?} {:?}", info.name, info.size);
//! }
//! ```
//!
//! ## Testing
//!
//! Construct a client around [`backend::MockRunner`] with
//! [`Client::with_runner`] to exercise the parsing layers without PHP.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod database;
pub mod error;
pub mod probe;
pub mod progress;
pub mod scanner;
pub mod settings;
pub mod types;

pub use config::ConfigEditor;
pub use database::DatabaseInspector;
pub use error::{Error, Result};
pub use probe::Probe;
pub use progress::{ProgressReceiver, ProgressReporter};
pub use settings::Settings;
pub use types::{
    ConfigDirective, ConfigListing, DatabaseInfo, DumpOutcome, EditOutcome, Installation,
    TableCheck,
};

use backend::{Runner, wp::WpCli};
use std::path::Path;

/// High-level client for WP-CLI operations.
///
/// The client owns a runner and the settings every component reads, and
/// hands out per-installation inspectors and editors.
pub struct Client {
    runner: Box<dyn Runner>,
    settings: Settings,
}

impl Client {
    /// Create a client running the WP-CLI binary named in `settings`.
    ///
    /// Returns an error if the binary cannot be found.
    pub fn new(settings: Settings) -> Result<Self> {
        let runner = WpCli::locate(&settings.tool)?;
        Ok(Self::with_runner(settings, Box::new(runner)))
    }

    /// Create a client with a custom runner (useful for testing).
    pub fn with_runner(settings: Settings, runner: Box<dyn Runner>) -> Self {
        Self { runner, settings }
    }

    /// Settings in effect.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Find installations under the scan root, unprobed.
    pub fn scan(&self) -> Result<Vec<Installation>> {
        let root = self.settings.scan_root()?;
        Ok(scanner::scan(&root, &self.settings.marker_file))
    }

    /// Probe `installations` in place.
    pub fn probe(&self, installations: &mut [Installation], progress: &ProgressReporter) -> Result<()> {
        Probe::new(self.runner.as_ref(), &self.settings).probe(installations, progress)
    }

    /// Scan and probe as one batch, closing `progress` when done.
    pub fn discover(&self, progress: ProgressReporter) -> Result<Vec<Installation>> {
        let mut installations = self.scan()?;
        self.probe(&mut installations, &progress)?;
        progress.finish();
        Ok(installations)
    }

    /// Open the installation at `directory` without scanning.
    pub fn open(&self, directory: &Path) -> Result<Installation> {
        scanner::open(directory, &self.settings.marker_file)
    }

    // =========================================================================
    // Per-installation operations
    // =========================================================================

    /// Database operations for `installation`.
    pub fn database<'a>(&'a self, installation: &'a Installation) -> DatabaseInspector<'a> {
        DatabaseInspector::new(self.runner.as_ref(), installation)
    }

    /// Configuration operations for `installation`.
    pub fn config<'a>(&'a self, installation: &'a Installation) -> ConfigEditor<'a> {
        ConfigEditor::new(self.runner.as_ref(), installation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::{CommandOutput, MockRunner};
    use std::fs;
    use tempfile::TempDir;

    fn mock_client(root: &Path) -> (Client, MockRunner) {
        let mock = MockRunner::new();
        mock.respond(
            &["db", "check"],
            CommandOutput::success("wp_db.wp_options OK\nSuccess: Database checked.\n"),
        );
        mock.respond(
            &["option", "get", "home", "--skip-plugins", "--skip-themes"],
            CommandOutput::success("https://site.test\n"),
        );
        let settings = Settings::default().with_scan_root(root);
        (Client::with_runner(settings, Box::new(mock.clone())), mock)
    }

    fn site(root: &Path, rel: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("wp-config.php"), "<?php\n").unwrap();
    }

    #[test]
    fn test_discover_scans_and_probes() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path(), "one");
        site(tmp.path(), "two");
        let (client, mock) = mock_client(tmp.path());

        let (reporter, receiver) = progress::channel(progress::DEFAULT_CAPACITY);
        let installations = client.discover(reporter).unwrap();

        assert_eq!(installations.len(), 2);
        assert!(installations.iter().all(Installation::is_healthy));
        assert!(installations.iter().all(|i| i.home_url == "https://site.test"));
        assert_eq!(mock.count(&["db", "check"]), 2);

        let values: Vec<f64> = receiver.collect();
        assert_eq!(values.last().copied(), Some(100.0));
    }

    #[test]
    fn test_discover_empty_root() {
        let tmp = TempDir::new().unwrap();
        let (client, mock) = mock_client(tmp.path());

        let installations = client.discover(progress::silent()).unwrap();
        assert!(installations.is_empty());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_open_and_operate() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path(), "blog");
        let (client, mock) = mock_client(tmp.path());

        let blog = client.open(&tmp.path().join("blog")).unwrap();
        assert!(client.open(tmp.path()).is_err());

        mock.respond(
            &["config", "set", "WP_DEBUG", "true"],
            CommandOutput::success("Success: Added the constant 'WP_DEBUG'.\n"),
        );
        assert!(client.config(&blog).set("WP_DEBUG", "true").is_applied());
        assert_eq!(mock.calls()[0].path, tmp.path().join("blog"));
    }
}
