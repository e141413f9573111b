use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// A discovered WordPress installation and what the last probe learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    /// Directory holding the marker file
    pub directory: PathBuf,
    /// Site home URL (`wp option get home`), empty until probed
    pub home_url: String,
    /// The options table checked OK
    pub valid_options: bool,
    /// `wp db check` reported overall success
    pub db_check_success: bool,
    /// Error output from the last database check
    pub db_error: String,
}

impl Installation {
    /// Create a record with nothing probed yet.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            home_url: String::new(),
            valid_options: false,
            db_check_success: false,
            db_error: String::new(),
        }
    }

    /// Directory of the installation.
    pub fn path(&self) -> &Path {
        &self.directory
    }

    /// Last path component, used as a short display name.
    pub fn name(&self) -> String {
        self.directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.directory.display().to_string())
    }

    /// Returns true if the last probe recorded error output.
    pub fn has_error(&self) -> bool {
        !self.db_error.is_empty()
    }

    /// Returns true if the database checked out and the options table is usable.
    pub fn is_healthy(&self) -> bool {
        self.db_check_success && self.valid_options && !self.has_error()
    }
}

/// Result of checking a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCheck {
    /// Qualified table name (`database.table`)
    pub table_name: String,
    /// Status as reported by the check (`OK`, `error`, ...)
    pub check_status: String,
}

impl TableCheck {
    /// Returns true if the table checked OK.
    pub fn is_ok(&self) -> bool {
        self.check_status.eq_ignore_ascii_case("ok")
    }
}

/// Database details for one installation, rebuilt on every inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Database name
    pub name: Option<String>,
    /// Human-readable size
    pub size: Option<String>,
    /// Error output of the size query
    pub size_error: Option<String>,
    /// Per-table check results, in tool output order
    pub check_tables: Vec<TableCheck>,
    /// Error output of the table check
    pub check_error: Option<String>,
}

impl DatabaseInfo {
    /// Tables whose status is not OK.
    pub fn failing_tables(&self) -> impl Iterator<Item = &TableCheck> {
        self.check_tables.iter().filter(|t| !t.is_ok())
    }

    /// Returns true if any query reported error output.
    pub fn has_errors(&self) -> bool {
        self.size_error.is_some() || self.check_error.is_some()
    }
}

/// A single wp-config.php directive as listed by WP-CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDirective {
    /// Constant or variable name
    pub name: String,
    /// Value as text
    #[serde(deserialize_with = "scalar_to_string")]
    pub value: String,
    /// `constant`, `variable` or `includes`
    #[serde(rename = "type")]
    pub kind: String,
}

/// Directives of one installation plus any error WP-CLI reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigListing {
    /// Directives in tool output order
    pub directives: Vec<ConfigDirective>,
    /// Error output of the listing command
    pub error: Option<String>,
}

impl ConfigListing {
    /// Find a directive by exact name.
    pub fn find(&self, name: &str) -> Option<&ConfigDirective> {
        self.directives.iter().find(|d| d.name == name)
    }
}

/// Outcome of a database export or import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DumpOutcome {
    /// WP-CLI reported success
    Completed {
        /// Success message printed by WP-CLI
        message: String,
        /// Dump file written or read
        path: PathBuf,
    },
    /// WP-CLI produced no output
    Failed {
        /// Fixed failure description
        reason: String,
    },
}

impl DumpOutcome {
    /// Returns true if the dump operation completed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The success message or the failure reason.
    pub fn message(&self) -> &str {
        match self {
            Self::Completed { message, .. } => message,
            Self::Failed { reason } => reason,
        }
    }
}

/// Outcome of a wp-config edit (set, delete, shuffle-salts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOutcome {
    /// WP-CLI reported `Success`
    Applied,
    /// Anything else; `output` holds what the tool printed, if anything
    Rejected {
        /// Error output, or standard output when there was none
        output: String,
    },
}

impl EditOutcome {
    /// Returns true if the edit was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Accept any JSON scalar and keep its textual form.
///
/// `wp config list` prints booleans and numbers unquoted when a constant is
/// defined that way.
pub(crate) fn scalar_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
