//! The external-process boundary.
//!
//! Every WP-CLI invocation goes through the [`Runner`] trait. The real
//! implementation is [`wp::WpCli`]; [`MockRunner`] answers from canned output
//! so the parsing layers can be tested without PHP or a database.
//!
//! A runner never fails. Whatever went wrong (missing binary, non-zero exit)
//! ends up as bytes in [`CommandOutput::stderr`], and callers branch on that.
//!
//! ```
//! use std::path::Path;
//! use wpcli::backend::{CommandOutput, MockRunner, Runner};
//!
//! let mock = MockRunner::new();
//! mock.respond(&["option", "get", "home"], CommandOutput::success("https://example.test\n"));
//!
//! let output = mock.run(Path::new("/srv/site"), &["option", "get", "home"]);
//! assert_eq!(output.stdout_text().as_deref(), Some("https://example.test\n"));
//! ```

pub mod wp;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Raw output of one WP-CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output (empty when the command failed)
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Output with both streams set.
    pub fn new(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Output of a clean run.
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self::new(stdout, Vec::new())
    }

    /// Output of a failed run.
    pub fn failure(stderr: impl Into<Vec<u8>>) -> Self {
        Self::new(Vec::new(), stderr)
    }

    /// Standard output as UTF-8, or `None` if nothing was printed.
    pub fn stdout_text(&self) -> Option<String> {
        decode(&self.stdout)
    }

    /// Standard error as UTF-8, or `None` if nothing was printed.
    pub fn stderr_text(&self) -> Option<String> {
        decode(&self.stderr)
    }

    /// Returns true if nothing was written to standard error.
    pub fn succeeded(&self) -> bool {
        self.stderr.is_empty()
    }
}

fn decode(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(bytes).to_string())
    }
}

/// Runs WP-CLI subcommands against an installation directory.
pub trait Runner: Send + Sync {
    /// Run `args` against the installation at `path` and capture both streams.
    fn run(&self, path: &Path, args: &[&str]) -> CommandOutput;
}

/// A call recorded by [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Installation directory passed to the runner
    pub path: PathBuf,
    /// Subcommand and arguments, without `--path`
    pub args: Vec<String>,
}

/// Runner answering from canned output.
///
/// Responses are keyed by the space-joined argument list. Unknown commands get
/// the error WP-CLI prints for an unregistered command.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    responses: Arc<Mutex<HashMap<String, CommandOutput>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockRunner {
    /// Create a mock with no responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `args` with `output` from now on.
    pub fn respond(&self, args: &[&str], output: CommandOutput) {
        lock(&self.responses).insert(args.join(" "), output);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls whose arguments start with `prefix`.
    pub fn count(&self, prefix: &[&str]) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| {
                c.args.len() >= prefix.len() && c.args.iter().zip(prefix).all(|(a, p)| a == p)
            })
            .count()
    }
}

impl Runner for MockRunner {
    fn run(&self, path: &Path, args: &[&str]) -> CommandOutput {
        lock(&self.calls).push(RecordedCall {
            path: path.to_path_buf(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        });

        let key = args.join(" ");
        lock(&self.responses).get(&key).cloned().unwrap_or_else(|| {
            CommandOutput::failure(format!("Error: '{key}' is not a registered wp command.\n"))
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_text_helpers() {
        let output = CommandOutput::new("hello\n", "");
        assert_eq!(output.stdout_text().as_deref(), Some("hello\n"));
        assert_eq!(output.stderr_text(), None);
        assert!(output.succeeded());

        let failed = CommandOutput::failure("Error: boom");
        assert_eq!(failed.stdout_text(), None);
        assert_eq!(failed.stderr_text().as_deref(), Some("Error: boom"));
        assert!(!failed.succeeded());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let output = CommandOutput::failure(vec![b'o', b'k', 0xff]);
        assert_eq!(output.stderr_text().as_deref(), Some("ok\u{fffd}"));
    }

    #[test]
    fn test_mock_runner_records_calls() {
        let mock = MockRunner::new();
        mock.respond(&["db", "check"], CommandOutput::success("Success: Database checked.\n"));

        let output = mock.run(Path::new("/srv/a"), &["db", "check"]);
        assert!(output.succeeded());

        let unknown = mock.run(Path::new("/srv/a"), &["db", "size"]);
        assert_eq!(
            unknown.stderr_text().as_deref(),
            Some("Error: 'db size' is not a registered wp command.\n")
        );

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].path, PathBuf::from("/srv/a"));
        assert_eq!(calls[1].args, vec!["db", "size"]);
        assert_eq!(mock.count(&["db"]), 2);
        assert_eq!(mock.count(&["db", "check"]), 1);
    }
}
