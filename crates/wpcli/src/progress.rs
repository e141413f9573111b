//! Progress reporting from long operations to a UI thread.
//!
//! A batch opens a bounded channel with [`channel`], hands the
//! [`ProgressReporter`] to the operation and reads percentages from the
//! [`ProgressReceiver`] elsewhere. The reporter is the only sender, so the
//! channel closes exactly once: when the reporter is finished or dropped.
//! Readers treat closure as completion.
//!
//! Percentages are exact: `completed * 100 / total` over the planned steps,
//! so the last step of a batch always reports `100.0`.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Mutex;

/// Channel capacity used by the CLI.
pub const DEFAULT_CAPACITY: usize = 16;

/// Open a progress channel buffering up to `capacity` updates.
pub fn channel(capacity: usize) -> (ProgressReporter, ProgressReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    let reporter = ProgressReporter {
        inner: Mutex::new(Inner {
            tx,
            total: 0,
            done: 0,
        }),
    };
    (reporter, ProgressReceiver { rx })
}

/// A reporter nobody listens to.
pub fn silent() -> ProgressReporter {
    let (reporter, receiver) = channel(0);
    drop(receiver);
    reporter
}

struct Inner {
    tx: SyncSender<f64>,
    total: u64,
    done: u64,
}

impl Inner {
    fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 * 100.0 / self.total as f64
        }
    }
}

/// Writing half of a progress channel.
///
/// Shared by reference between workers; the step counter and the send happen
/// under one lock, so readers see non-decreasing values.
pub struct ProgressReporter {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("percent", &self.percent())
            .finish()
    }
}

impl ProgressReporter {
    fn inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Add `steps` to the batch total.
    pub fn plan(&self, steps: u64) {
        self.inner().total += steps;
    }

    /// Complete one step and publish the new percentage.
    pub fn advance(&self) {
        let mut inner = self.inner();
        if inner.done < inner.total {
            inner.done += 1;
        }
        let percent = inner.percent();
        // A gone receiver just means nobody is watching
        if inner.tx.send(percent).is_err() {
            log::trace!("Progress receiver dropped at {percent:.1}%");
        }
    }

    /// Current percentage.
    pub fn percent(&self) -> f64 {
        self.inner().percent()
    }

    /// End the batch and close the channel.
    pub fn finish(self) {
        log::trace!("Progress finished at {:.1}%", self.percent());
    }
}

/// Reading half of a progress channel.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: Receiver<f64>,
}

impl ProgressReceiver {
    /// Block for the next percentage; `None` once the batch has finished.
    pub fn recv(&self) -> Option<f64> {
        self.rx.recv().ok()
    }
}

impl Iterator for ProgressReceiver {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.recv()
    }
}
