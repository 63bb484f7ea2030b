// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Platform resets, used when there is nothing left to boot.

use core::fmt::Display;

use log::error;
use uefi::{
    Status, boot,
    runtime::{self, ResetType},
};

/// How long a fatal error stays on screen before the platform is reset, in microseconds.
pub const FATAL_ERROR_DELAY: usize = 10_000_000;

/// Reboots the system.
pub fn reset() -> ! {
    runtime::reset(ResetType::WARM, Status::SUCCESS, None)
}

/// Shuts down the system.
///
/// This function wraps around [`runtime::reset`] and provides a slightly more straightforward way to shutdown the system.
pub fn shutdown() -> ! {
    runtime::reset(ResetType::SHUTDOWN, Status::SUCCESS, None)
}

/// Reports an error that cannot be recovered from, waits [`FATAL_ERROR_DELAY`], then reboots.
pub fn fatal(e: impl Display) -> ! {
    error!("Fatal error occurred: {e}");
    error!("Automatically restarting in 10 seconds");
    boot::stall(FATAL_ERROR_DELAY);
    reset()
}
