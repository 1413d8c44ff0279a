//! Diagnostic output on standard error.
//!
//! Results (screenshot paths, links, report paths) go to standard output, so
//! everything logged here stays on standard error and never mixes with them.

use std::io::IsTerminal;

use colored::Colorize;
use log::{Level, LevelFilter};

/// Level used when `verbose` is off: only warnings and errors.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        DEFAULT_LEVEL
    }
}

fn level_label(level: Level) -> String {
    let label = level.to_string().to_lowercase();
    match level {
        Level::Error => label.red().bold().to_string(),
        Level::Warn => label.yellow().bold().to_string(),
        Level::Info => label.green().to_string(),
        Level::Debug | Level::Trace => label.dimmed().to_string(),
    }
}

/// Install the global logger. Can only succeed once per process.
pub fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    if !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    fern::Dispatch::new()
        .level(level_for(verbose))
        // Connection chatter from the HTTP stack drowns out our own messages.
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .format(|out, message, record| {
            out.finish(format_args!("{}: {}", level_label(record.level()), message))
        })
        .chain(std::io::stderr())
        .apply()
}
