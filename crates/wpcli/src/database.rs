//! Database inspection, export and import for one installation.

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::backend::Runner;
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::scanner::{self, visible_entries};
use crate::types::{DatabaseInfo, DumpOutcome, Installation, TableCheck, scalar_to_string};

/// Reason reported when `wp db export` prints nothing.
pub const EXPORT_FAILED: &str = "Database Export Failed";

/// Reason reported when `wp db import` prints nothing.
pub const IMPORT_FAILED: &str = "Database Import Failed";

/// Steps reported by [`DatabaseInspector::inspect`].
pub const INSPECT_STEPS: u64 = 2;

const SIZE_ARGS: [&str; 5] = ["db", "size", "--human-readable", "--format=json", "--no-color"];

#[derive(Debug, Deserialize)]
struct SizeRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Size", deserialize_with = "scalar_to_string")]
    size: String,
}

/// Parse `wp db size --format=json` output into `(name, size)` of the first row.
pub fn parse_size(json: &str) -> Result<(String, String)> {
    let rows: Vec<SizeRow> =
        serde_json::from_str(json.trim()).map_err(|e| Error::parse("db size", e))?;
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| Error::parse("db size", "no rows in result"))?;
    if row.name.trim().is_empty() {
        return Err(Error::parse("db size", "empty database name"));
    }
    Ok((row.name, row.size))
}

/// Collect `table status` pairs from `wp db check` lines mentioning `db_name`.
///
/// Lines with fewer than two fields are skipped. An empty `db_name` matches
/// nothing.
pub fn parse_table_checks(output: &str, db_name: &str) -> Vec<TableCheck> {
    if db_name.is_empty() {
        return Vec::new();
    }
    output
        .lines()
        .filter(|line| line.contains(db_name))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(table), Some(status)) => Some(TableCheck {
                    table_name: table.to_string(),
                    check_status: status.to_string(),
                }),
                _ => {
                    log::debug!("Skipping unrecognized db check line: {line:?}");
                    None
                }
            }
        })
        .collect()
}

/// Dump file name: `<db>-<YYYYMMDD>-<6 digits>.sql`.
pub fn dump_file_name(db_name: &str, date: NaiveDate, suffix: u32) -> String {
    format!(
        "{}-{}-{:06}.sql",
        db_name,
        date.format("%Y%m%d"),
        suffix % 1_000_000
    )
}

fn random_suffix() -> Result<u32> {
    let mut bytes = [0u8; 4];
    getrandom::getrandom(&mut bytes).map_err(|e| Error::Random(e.to_string()))?;
    Ok(u32::from_le_bytes(bytes) % 1_000_000)
}

/// Database operations for one installation.
pub struct DatabaseInspector<'a> {
    runner: &'a dyn Runner,
    installation: &'a Installation,
}

impl<'a> DatabaseInspector<'a> {
    /// Create an inspector.
    pub fn new(runner: &'a dyn Runner, installation: &'a Installation) -> Self {
        Self {
            runner,
            installation,
        }
    }

    fn dir(&self) -> &Path {
        &self.installation.directory
    }

    /// Query name, size and per-table status.
    ///
    /// The table check only runs when the size query printed something; WP-CLI
    /// errors land in `size_error` / `check_error`. Malformed size JSON is a
    /// [`Error::Parse`].
    pub fn inspect(&self, progress: &ProgressReporter) -> Result<DatabaseInfo> {
        progress.plan(INSPECT_STEPS);
        let mut info = DatabaseInfo::default();

        let size = self.runner.run(self.dir(), &SIZE_ARGS);
        if let Some(error) = size.stderr_text() {
            log::debug!("db size error: {}", error.trim_end());
            info.size_error = Some(error);
        }
        let size_output = size.stdout_text();
        if let Some(json) = &size_output {
            let (name, human_size) = parse_size(json)?;
            log::debug!("Database {name}: {human_size}");
            info.name = Some(name);
            info.size = Some(human_size);
        }
        progress.advance();

        if let Some(name) = info.name.clone() {
            let check = self.runner.run(self.dir(), &["db", "check"]);
            if let Some(output) = check.stdout_text() {
                info.check_tables = parse_table_checks(&output, &name);
            }
            if let Some(error) = check.stderr_text() {
                log::debug!("db check error: {}", error.trim_end());
                info.check_error = Some(error);
            }
        }
        progress.advance();

        Ok(info)
    }

    /// Export the database into the installation directory.
    pub fn export(&self, info: &DatabaseInfo) -> Result<DumpOutcome> {
        let name = info
            .name
            .as_deref()
            .ok_or_else(|| Error::UnknownDatabase(self.dir().to_path_buf()))?;

        let file_name = dump_file_name(name, Local::now().date_naive(), random_suffix()?);
        let path = self.dir().join(file_name);
        let path_arg = path.to_string_lossy().to_string();

        let output = self.runner.run(self.dir(), &["db", "export", &path_arg]);
        Ok(self.dump_outcome(&output, path, EXPORT_FAILED))
    }

    /// Import a dump file into the database.
    pub fn import(&self, source: &Path) -> DumpOutcome {
        let source_arg = source.to_string_lossy().to_string();
        let output = self.runner.run(self.dir(), &["db", "import", &source_arg]);
        self.dump_outcome(&output, source.to_path_buf(), IMPORT_FAILED)
    }

    fn dump_outcome(
        &self,
        output: &crate::backend::CommandOutput,
        path: PathBuf,
        failure: &str,
    ) -> DumpOutcome {
        if let Some(error) = output.stderr_text() {
            log::debug!("{} for {}: {}", failure, path.display(), error.trim_end());
        }
        match output.stdout_text() {
            Some(message) => {
                log::debug!("Dump result: {}", message.trim_end());
                DumpOutcome::Completed {
                    message: message.trim_end().to_string(),
                    path,
                }
            }
            None => DumpOutcome::Failed {
                reason: failure.to_string(),
            },
        }
    }

    /// Files under `root` whose name contains the database name.
    ///
    /// Hidden directories are skipped. Sorted by path.
    pub fn candidate_dumps(&self, info: &DatabaseInfo, root: &Path) -> Result<Vec<PathBuf>> {
        let name = info
            .name
            .as_deref()
            .ok_or_else(|| Error::UnknownDatabase(self.dir().to_path_buf()))?;

        let mut dumps: Vec<PathBuf> = visible_entries(root)
            .filter(|entry| {
                entry.file_name().to_string_lossy().contains(name) && scanner::is_file(entry)
            })
            .map(|entry| entry.into_path())
            .collect();
        dumps.sort();

        log::debug!("Found {} dump candidate(s) for {}", dumps.len(), name);
        Ok(dumps)
    }
}
