// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Simple UEFI backend for the [`log`] crate.
//!
//! Records are written to the console output with a timestamp and their source location. Frontends install a
//! `static` [`UefiLogger`] with [`log::set_logger`].

use core::fmt::Write;

use log::{LevelFilter, Metadata, Record};
use uefi::{runtime, system::with_stdout};

/// A simple logging backend for UEFI.
pub struct UefiLogger {
    /// The most verbose level that is printed.
    level: LevelFilter,
}

impl UefiLogger {
    /// Constructs a new [`UefiLogger`] that prints records up to `level`.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// The most verbose level this logger prints.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn level(&self) -> LevelFilter {
        self.level
    }
}

impl Default for UefiLogger {
    fn default() -> Self {
        Self::new(LevelFilter::Warn)
    }
}

impl log::Log for UefiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let time = runtime::get_time().unwrap_or(runtime::Time::invalid());
            let level = record.level();
            let file = record.file().unwrap_or_default();
            let line = record.line().unwrap_or_default();
            let args = record.args();
            with_stdout(|stdout| {
                let _ = stdout.write_fmt(format_args!("[{time} {level} {file}:{line}] - {args}\n"));
            });
        }
    }

    fn flush(&self) {}
}
