//! Health probe for discovered installations.
//!
//! Runs `wp db check` per installation, reads the per-table lines to decide
//! whether the options table is usable, and fetches the home URL for the ones
//! that are.

use rayon::prelude::*;

use crate::backend::Runner;
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::settings::Settings;
use crate::types::Installation;

/// Steps reported per installation: the check itself and the follow-up.
pub const STEPS_PER_INSTALLATION: u64 = 2;

/// What a `wp db check` transcript says about an installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// A line mentions the options table together with `OK`
    pub options_ok: bool,
    /// The overall success line is present
    pub check_success: bool,
}

/// Classify `wp db check` output line by line.
pub fn summarize_check(output: &str, settings: &Settings) -> CheckSummary {
    let mut summary = CheckSummary::default();
    for line in output.lines() {
        if line.contains(&settings.options_marker) && line.contains("OK") {
            summary.options_ok = true;
        }
        if line.contains(&settings.check_success_marker) {
            summary.check_success = true;
        }
    }
    summary
}

/// Probes installations through a [`Runner`].
pub struct Probe<'a> {
    runner: &'a dyn Runner,
    settings: &'a Settings,
}

impl<'a> Probe<'a> {
    /// Create a probe.
    pub fn new(runner: &'a dyn Runner, settings: &'a Settings) -> Self {
        Self { runner, settings }
    }

    /// Probe every installation in place.
    ///
    /// Plans [`STEPS_PER_INSTALLATION`] steps per record on `progress`. With
    /// more than one job the records are spread over a worker pool; each
    /// record is handled by exactly one worker.
    pub fn probe(&self, installations: &mut [Installation], progress: &ProgressReporter) -> Result<()> {
        progress.plan(STEPS_PER_INSTALLATION * installations.len() as u64);

        let jobs = self.settings.jobs();
        if jobs <= 1 || installations.len() <= 1 {
            for installation in installations.iter_mut() {
                self.probe_one(installation, progress);
            }
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        pool.install(|| {
            installations
                .par_iter_mut()
                .for_each(|installation| self.probe_one(installation, progress));
        });

        Ok(())
    }

    /// Probe a single installation, advancing `progress` twice.
    pub fn probe_one(&self, installation: &mut Installation, progress: &ProgressReporter) {
        installation.valid_options = false;
        installation.db_check_success = false;
        installation.db_error.clear();
        progress.advance();

        let dir = installation.directory.clone();
        let check = self.runner.run(&dir, &["db", "check"]);

        if let Some(output) = check.stdout_text() {
            let summary = summarize_check(&output, self.settings);
            installation.valid_options = summary.options_ok;
            installation.db_check_success = summary.check_success;

            if summary.options_ok {
                if let Some(url) = self.home_url(&dir) {
                    installation.home_url = url;
                }
            }
        }

        if let Some(error) = check.stderr_text() {
            log::debug!("db check error for {}: {}", dir.display(), error.trim_end());
            installation.db_error = error;
        }

        progress.advance();
    }

    fn home_url(&self, dir: &std::path::Path) -> Option<String> {
        let output = self.runner.run(
            dir,
            &["option", "get", "home", "--skip-plugins", "--skip-themes"],
        );
        if let Some(error) = output.stderr_text() {
            log::debug!("option get home failed for {}: {}", dir.display(), error.trim_end());
        }
        output.stdout_text().map(|s| s.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CommandOutput, MockRunner};
    use crate::progress;

    const HEALTHY_CHECK: &str = "\
wp_db.wp_commentmeta                               OK
wp_db.wp_options                                   OK
wp_db.wp_posts                                     OK
Success: Database checked.
";

    fn home_args() -> [&'static str; 5] {
        ["option", "get", "home", "--skip-plugins", "--skip-themes"]
    }

    fn healthy_mock() -> MockRunner {
        let mock = MockRunner::new();
        mock.respond(&["db", "check"], CommandOutput::success(HEALTHY_CHECK));
        mock.respond(&home_args(), CommandOutput::success("https://blog.test\n"));
        mock
    }

    #[test]
    fn test_summarize_check() {
        let settings = Settings::default();

        let summary = summarize_check(HEALTHY_CHECK, &settings);
        assert!(summary.options_ok);
        assert!(summary.check_success);

        let broken = "wp_db.wp_options   error    : Table is marked as crashed\n";
        assert_eq!(summarize_check(broken, &settings), CheckSummary::default());
    }

    #[test]
    fn test_custom_markers() {
        let settings = Settings {
            options_marker: "_site_options".to_string(),
            check_success_marker: "All good".to_string(),
            ..Default::default()
        };
        let summary = summarize_check("net.wp_site_options OK\nAll good\n", &settings);
        assert!(summary.options_ok);
        assert!(summary.check_success);
    }

    #[test]
    fn test_probe_healthy_installation() {
        let mock = healthy_mock();
        let settings = Settings::default();
        let mut installations = vec![Installation::new("/srv/blog")];

        Probe::new(&mock, &settings)
            .probe(&mut installations, &progress::silent())
            .unwrap();

        let blog = &installations[0];
        assert!(blog.valid_options);
        assert!(blog.db_check_success);
        assert_eq!(blog.home_url, "https://blog.test");
        assert_eq!(blog.db_error, "");
        assert!(blog.is_healthy());
    }

    #[test]
    fn test_probe_records_error_output() {
        let mock = MockRunner::new();
        mock.respond(
            &["db", "check"],
            CommandOutput::failure("Error: Error establishing a database connection.\n"),
        );
        let settings = Settings::default();
        let mut installations = vec![Installation::new("/srv/broken")];

        Probe::new(&mock, &settings)
            .probe(&mut installations, &progress::silent())
            .unwrap();

        let broken = &installations[0];
        assert!(!broken.valid_options);
        assert!(!broken.db_check_success);
        assert_eq!(broken.home_url, "");
        assert_eq!(
            broken.db_error,
            "Error: Error establishing a database connection.\n"
        );
        // No home URL lookup without a valid options table
        assert_eq!(mock.count(&["option"]), 0);
    }

    #[test]
    fn test_probe_is_idempotent() {
        let mock = healthy_mock();
        let settings = Settings::default();
        let probe = Probe::new(&mock, &settings);
        let mut installations = vec![Installation::new("/srv/blog")];

        probe.probe(&mut installations, &progress::silent()).unwrap();
        let first = installations.clone();
        probe.probe(&mut installations, &progress::silent()).unwrap();

        assert_eq!(installations, first);
    }

    #[test]
    fn test_home_url_fetched_once_per_installation() {
        let mock = MockRunner::new();
        mock.respond(
            &["db", "check"],
            CommandOutput::success("wp_db.wp_options OK\nwp_db.wp_2_options OK\n"),
        );
        mock.respond(&home_args(), CommandOutput::success("https://multi.test\n"));
        let settings = Settings::default();
        let mut installations = vec![Installation::new("/srv/multi")];

        Probe::new(&mock, &settings)
            .probe(&mut installations, &progress::silent())
            .unwrap();

        assert_eq!(mock.count(&["option", "get", "home"]), 1);
        assert!(!installations[0].db_check_success);
    }

    #[test]
    fn test_probe_progress_reaches_100_and_closes() {
        let mock = healthy_mock();
        let settings = Settings::default();
        let mut installations = vec![
            Installation::new("/srv/a"),
            Installation::new("/srv/b"),
            Installation::new("/srv/c"),
        ];

        let (reporter, receiver) = progress::channel(16);
        Probe::new(&mock, &settings)
            .probe(&mut installations, &reporter)
            .unwrap();
        reporter.finish();

        let values: Vec<f64> = receiver.collect();
        assert_eq!(values.len(), 6);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!((values[0] - 100.0 / 6.0).abs() < 1e-9);
        assert!((values[5] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parallel_probe_matches_sequential() {
        let mock = healthy_mock();
        let settings = Settings::default().with_jobs(4);
        let mut installations: Vec<Installation> = (0..8)
            .map(|i| Installation::new(format!("/srv/site{i}")))
            .collect();

        let (reporter, receiver) = progress::channel(32);
        Probe::new(&mock, &settings)
            .probe(&mut installations, &reporter)
            .unwrap();
        reporter.finish();

        assert!(installations.iter().all(Installation::is_healthy));
        assert_eq!(mock.count(&["db", "check"]), 8);

        let values: Vec<f64> = receiver.collect();
        assert_eq!(values.len(), 16);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }
}
