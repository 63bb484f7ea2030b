// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The boot menu frontend.
//!
//! Lists the firmware's boot options in `BootOrder` order, counts down the `Timeout`, and chainloads the chosen
//! option. If an option fails to boot, the menu comes back after the error has been acknowledged.

#![no_main]
#![no_std]

extern crate alloc;

use bootnav_core::{
    boot::{BootMgr, action, loader::FirmwareLoader},
    system::{firmware::Firmware, log_backend::UefiLogger},
};
use log::LevelFilter;
use uefi::prelude::*;

/// The global logging instance.
static LOGGER: UefiLogger = UefiLogger::new(LevelFilter::Warn);

/// The actual main function of the program, which returns a [`Result`].
///
/// # Errors
///
/// May return an `Error` if the firmware services could not be opened, the boot catalog could not be built, or
/// the keyboard stops responding.
fn main_func() -> anyhow::Result<()> {
    uefi::helpers::init()?;
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(LOGGER.level()));

    let mut fw = Firmware::new()?;
    let mut boot_mgr = BootMgr::new(&fw.variables, fw.volume.clone())?;

    boot_mgr.run(&mut FirmwareLoader, &mut fw.input, &mut fw.console)?;
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
