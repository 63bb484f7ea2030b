// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Panic handler that reports the panic, waits for a key, then shuts down the system.
//!
//! This is enabled when the `panic_handler` feature is enabled, so that hosted builds and fuzzing keep the
//! standard library's handler.

#![cfg(feature = "panic_handler")]
use core::fmt::Write;

use uefi::{
    Status,
    boot,
    runtime::{self, ResetType},
    system::{with_stdin, with_stdout},
};

/// How long to wait before shutting down when no key can be waited for, in microseconds.
const FALLBACK_STALL: usize = 10_000_000;

/// The panic handler.
#[panic_handler]
fn panic_handler(info: &core::panic::PanicInfo) -> ! {
    with_stdout(|stdout| {
        let _ = writeln!(stdout, "[PANIC]: {info}");
        let _ = writeln!(stdout, "Press a key to shut down");
    });
    with_stdin(|stdin| {
        if let Some(event) = stdin.wait_for_key_event() {
            let _ = boot::wait_for_event(&mut [event]);
        } else {
            with_stdout(|stdout| {
                let _ = writeln!(stdout, "No keyboard, shutting down in 10 seconds");
            });
            boot::stall(FALLBACK_STALL);
        }
    });
    runtime::reset(ResetType::SHUTDOWN, Status::ABORTED, None);
}
