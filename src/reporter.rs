//! Progress and failure reporting
//!
//! A `Reporter` is constructed once in `main` from the CLI flags and passed
//! by reference into every component that needs to surface a message. There
//! is no process-global logger; verbosity travels with the handle.

use chrono::Local;

/// Message levels, lowest to highest severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Error,
}

impl Level {
    fn tag(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Error => "ERROR",
        }
    }
}

/// Verbosity-aware reporter writing timestamped lines to stderr.
#[derive(Debug, Clone)]
pub struct Reporter {
    min_level: Level,
}

impl Reporter {
    /// A reporter that emits debug messages only when `debug` is set.
    pub fn new(debug: bool) -> Self {
        Self {
            min_level: if debug { Level::Debug } else { Level::Info },
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.min_level <= Level::Debug
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.emit(Level::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref());
    }

    fn emit(&self, level: Level, message: &str) {
        if level < self.min_level {
            return;
        }
        let now = Local::now().format("%H:%M:%S");
        eprintln!("{} - {} - {}", now, level.tag(), message);
    }
}
