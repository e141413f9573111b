//! Process-backed runner using the `wp` executable.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

use super::{CommandOutput, Runner};

/// Default executable name.
pub const DEFAULT_TOOL: &str = "wp";

/// Runner that shells out to WP-CLI.
///
/// Every invocation is `<binary> <args...> --path=<installation>`, blocking
/// until the process exits. There is no timeout: a hung `wp` hangs the caller.
#[derive(Debug, Clone)]
pub struct WpCli {
    binary: PathBuf,
}

impl WpCli {
    /// Use `binary` as-is, without checking that it exists.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Resolve `binary` on `PATH` (or as a path) and fail if it is missing.
    pub fn locate(binary: &str) -> Result<Self> {
        let resolved = which::which(binary).map_err(|_| Error::ToolNotFound {
            tool: binary.to_string(),
        })?;
        log::debug!("Using WP-CLI at {}", resolved.display());
        Ok(Self::new(resolved))
    }

    /// Path of the executable.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Runner for WpCli {
    fn run(&self, path: &Path, args: &[&str]) -> CommandOutput {
        let path_flag = format!("--path={}", path.display());
        log::debug!(
            "Running: {} {} {}",
            self.binary.display(),
            args.join(" "),
            path_flag
        );

        let output = match Command::new(&self.binary)
            .args(args)
            .arg(&path_flag)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                log::debug!("Failed to spawn {}: {}", self.binary.display(), e);
                return CommandOutput::failure(format!(
                    "failed to execute {}: {}",
                    self.binary.display(),
                    e
                ));
            }
        };

        if output.status.success() {
            return CommandOutput::new(output.stdout, output.stderr);
        }

        log::debug!(
            "{} {} exited with {}",
            self.binary.display(),
            args.join(" "),
            output.status
        );
        let stderr = if output.stderr.is_empty() {
            format!("{} exited with {}", self.binary.display(), output.status).into_bytes()
        } else {
            output.stderr
        };
        CommandOutput::failure(stderr)
    }
}
