// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Text console output.

use core::fmt::{self, Write};

use uefi::{proto::console::text::Color, system::with_stdout};

/// A text console that can be written to, cleared, and colored.
pub trait Console: Write {
    /// Clears the screen and moves the cursor to the top left.
    fn clear(&mut self);

    /// Sets the colors for text written after this.
    fn set_color(&mut self, foreground: Color, background: Color);
}

/// The firmware's console output.
///
/// Failures to write are ignored, there is nowhere else to report them.
#[derive(Clone, Copy, Debug, Default)]
pub struct UefiConsole;

impl Write for UefiConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        with_stdout(|stdout| stdout.write_str(s))
    }
}

impl Console for UefiConsole {
    fn clear(&mut self) {
        with_stdout(|stdout| {
            let _ = stdout.clear();
        });
    }

    fn set_color(&mut self, foreground: Color, background: Color) {
        with_stdout(|stdout| {
            let _ = stdout.set_color(foreground, background);
        });
    }
}
