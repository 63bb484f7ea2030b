// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Prints the directory tree of the boot volume, then shuts down on a key press.

#![no_main]
#![no_std]

extern crate alloc;

use core::fmt::Write;

use bootnav_core::{
    boot::action,
    browser::tree::print_tree,
    system::{console::Console, firmware::Firmware, input::wait_for_key, log_backend::UefiLogger},
};
use log::LevelFilter;
use uefi::{prelude::*, proto::console::text::Color};

/// The global logging instance.
static LOGGER: UefiLogger = UefiLogger::new(LevelFilter::Warn);

/// The actual main function of the program, which returns a [`Result`].
///
/// # Errors
///
/// May return an `Error` if the firmware services or the root directory could not be opened.
fn main_func() -> anyhow::Result<()> {
    uefi::helpers::init()?;
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(LOGGER.level()));

    let mut fw = Firmware::new()?;
    let mut root = fw.open_root()?;

    fw.console.set_color(Color::Red, Color::Black);
    fw.console.clear();
    print_tree(&mut root, &mut fw.console, 0)?;

    let _ = write!(fw.console, "\r\nPress any key to shutdown...");
    wait_for_key(&mut fw.input)?;
    action::shutdown();
}

/// The main function of the program.
#[entry]
fn main() -> Status {
    match main_func() {
        Ok(()) => Status::SUCCESS,
        Err(e) => action::fatal(e),
    }
}
