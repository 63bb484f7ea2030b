// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The file browser frontend.
//!
//! Browses the volume the boot manager was loaded from, and chainloads the file that is selected. A file that
//! fails to load is reported, and browsing continues from where it left off.

#![no_main]
#![no_std]

extern crate alloc;

use core::fmt::Write;

use bootnav_core::{
    boot::{action, loader::{FirmwareLoader, chainload}},
    browser::FileBrowser,
    system::{firmware::Firmware, input::wait_for_key, log_backend::UefiLogger},
};
use log::{LevelFilter, error};
use uefi::prelude::*;

/// The global logging instance.
static LOGGER: UefiLogger = UefiLogger::new(LevelFilter::Warn);

/// The actual main function of the program, which returns a [`Result`].
///
/// # Errors
///
/// May return an `Error` if the firmware services or the root directory could not be opened, or the keyboard
/// stops responding.
fn main_func() -> anyhow::Result<()> {
    uefi::helpers::init()?;
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(LOGGER.level()));

    let mut fw = Firmware::new()?;
    let root = fw.open_root()?;
    let mut browser = FileBrowser::new(fw.volume.clone(), root)?;

    while let Some(path) = browser.run(&mut fw.input, &mut fw.console)? {
        match chainload(&mut FirmwareLoader, &path, &[]) {
            Ok(()) => return Ok(()),
            Err(e) => {
                error!("Failed to load image: {e}");
                let _ = writeln!(fw.console, "Failed to load image: {e}");
                let _ = writeln!(fw.console, "Press any key to continue browsing");
                wait_for_key(&mut fw.input)?;
            }
        }
    }

    Ok(())
}

/// The main function of the program.
#[entry]
fn main() -> Status {
    match main_func() {
        Ok(()) => Status::SUCCESS,
        Err(e) => action::fatal(e),
    }
}
