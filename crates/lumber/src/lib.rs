#![deny(missing_docs)]

//! Defines the output format of traces, events, and spans produced
//! by the log explorer and the libraries it links.

use std::io;
use tracing_subscriber::fmt;

pub use tracing_core::Level;

/// possible log levels
pub const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Level used when none is requested
pub const DEFAULT_LEVEL: Level = Level::INFO;

/// Initializes a global tracing subscriber writing to stderr.
///
/// `info` and quieter levels get a compact single-line format; `debug` and
/// `trace` add timestamps, targets and thread ids. Calling this twice is a no-op.
pub fn init(level: Option<Level>) {
    let level = level.unwrap_or(DEFAULT_LEVEL);
    let builder = fmt().with_max_level(level).with_writer(io::stderr);
    // try_init only fails when a global subscriber is already set
    let _ = if level > Level::INFO {
        builder.with_thread_ids(true).try_init()
    } else {
        let format = fmt::format().with_target(false).compact();
        builder.event_format(format).try_init()
    };
}
