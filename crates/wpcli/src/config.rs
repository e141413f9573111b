//! wp-config.php directives through `wp config`.

use crate::backend::{CommandOutput, Runner};
use crate::error::{Error, Result};
use crate::progress::{self, ProgressReporter};
use crate::types::{ConfigDirective, ConfigListing, EditOutcome, Installation};

const LIST_ARGS: [&str; 4] = ["config", "list", "--format=json", "--no-color"];

/// Parse `wp config list --format=json` output.
pub fn parse_directives(json: &str) -> Result<Vec<ConfigDirective>> {
    serde_json::from_str(json.trim()).map_err(|e| Error::parse("config list", e))
}

/// Reads and edits the configuration of one installation.
pub struct ConfigEditor<'a> {
    runner: &'a dyn Runner,
    installation: &'a Installation,
}

impl<'a> ConfigEditor<'a> {
    /// Create an editor.
    pub fn new(runner: &'a dyn Runner, installation: &'a Installation) -> Self {
        Self {
            runner,
            installation,
        }
    }

    /// List every directive. One progress step.
    pub fn list(&self, progress: &ProgressReporter) -> Result<ConfigListing> {
        progress.plan(1);
        let output = self.runner.run(&self.installation.directory, &LIST_ARGS);

        let mut listing = ConfigListing::default();
        if let Some(json) = output.stdout_text() {
            listing.directives = parse_directives(&json)?;
        }
        if let Some(error) = output.stderr_text() {
            log::debug!("config list error: {}", error.trim_end());
            listing.error = Some(error);
        }
        progress.advance();

        Ok(listing)
    }

    /// Look up a single directive by name.
    ///
    /// `Ok(None)` means the listing succeeded without it. A listing that
    /// failed outright (error output and no directives) is an
    /// [`Error::Command`].
    pub fn get(&self, name: &str) -> Result<Option<ConfigDirective>> {
        let listing = self.list(&progress::silent())?;
        if listing.directives.is_empty() {
            if let Some(error) = &listing.error {
                return Err(Error::Command {
                    command: "config list".to_string(),
                    message: first_line(error),
                });
            }
        }
        Ok(listing.find(name).cloned())
    }

    /// `wp config set <name> <value>`.
    pub fn set(&self, name: &str, value: &str) -> EditOutcome {
        self.edit(&["config", "set", name, value])
    }

    /// `wp config delete <name>`.
    pub fn delete(&self, name: &str) -> EditOutcome {
        self.edit(&["config", "delete", name])
    }

    /// Regenerate the authentication salts.
    pub fn shuffle_salts(&self) -> EditOutcome {
        self.edit(&["config", "shuffle-salts"])
    }

    fn edit(&self, args: &[&str]) -> EditOutcome {
        let output = self.runner.run(&self.installation.directory, args);
        log::debug!(
            "{} -> data: {:?}, error: {:?}",
            args.join(" "),
            output.stdout_text(),
            output.stderr_text()
        );
        classify_edit(&output)
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn classify_edit(output: &CommandOutput) -> EditOutcome {
    let stdout = output.stdout_text();
    if stdout.as_deref().is_some_and(|s| s.contains("Success")) {
        return EditOutcome::Applied;
    }
    EditOutcome::Rejected {
        output: output.stderr_text().or(stdout).unwrap_or_default(),
    }
}
