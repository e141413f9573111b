//! Progress bars for wpdash CLI.
//!
//! Library operations report percentages over a [`wpcli::progress`] channel;
//! a drawing thread reads it and moves an indicatif bar until the operation
//! drops its reporter.

use indicatif::{ProgressBar, ProgressStyle};
use std::thread;
use wpcli::progress::{self, DEFAULT_CAPACITY, ProgressReporter};

const TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {percent}%";

/// Run `op` with a fresh reporter while a bar tracks it. Hidden when `quiet`.
pub fn run<T>(label: &str, quiet: bool, op: impl FnOnce(ProgressReporter) -> T) -> T {
    let (reporter, receiver) = progress::channel(DEFAULT_CAPACITY);

    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(100)
    };
    if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar.set_message(label.to_string());

    let drawer = {
        let bar = bar.clone();
        thread::spawn(move || {
            for percent in receiver {
                bar.set_position(position(percent));
            }
        })
    };

    let result = op(reporter);

    if drawer.join().is_err() {
        log::warn!("Progress display thread panicked");
    }
    bar.finish_and_clear();
    result
}

fn position(percent: f64) -> u64 {
    percent.clamp(0.0, 100.0).round() as u64
}
