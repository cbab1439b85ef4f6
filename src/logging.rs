//! Stderr logging through `env_logger`
//!
//! Info lines (the per-iteration deviation reports) are written bare so the
//! output reads like a plain progress log; everything else carries its level.

use std::io::Write;

use env_logger::{Builder, Target};
use log::{Level, LevelFilter, Record};

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn format_line(record: &Record<'_>) -> String {
    match record.level() {
        Level::Info => record.args().to_string(),
        level => format!("[{}] {}", level.as_str().to_lowercase(), record.args()),
    }
}

fn builder(verbose: bool) -> Builder {
    let mut builder = Builder::new();
    builder
        .target(Target::Stderr)
        .filter_level(level_for(verbose))
        .format(|buf, record| writeln!(buf, "{}", format_line(record)));
    builder
}

/// Install the stderr logger. Calling it again after a logger is set is a
/// no-op, which keeps tests that share a process from failing.
pub fn init(verbose: bool) {
    let _ = builder(verbose).try_init();
}
