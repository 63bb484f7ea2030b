// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

#![no_main]
#![no_std]

// Integration tests for bootnav, ran inside a virtual machine.

// DISCLAIMER: This code extensively uses unwrap and expect, as any errors in testing should be treated as fatal.

extern crate alloc;

use bootnav_core::{
    boot::action,
    system::{firmware::Firmware, input::wait_for_key, log_backend::UefiLogger},
};
use log::LevelFilter;
use uefi::{prelude::*, println, proto::console::text::Key};

use crate::{
    catalog::test_catalog,
    fs::test_filesystem,
    load::test_loading,
    menu::test_menu,
};

mod catalog;
mod fs;
mod load;
mod menu;

static LOGGER: UefiLogger = UefiLogger::new(LevelFilter::Info);

fn main_func() -> anyhow::Result<()> {
    uefi::helpers::init()?;
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LOGGER.level()))
        .expect("Failed to set logger"); // set up logger so that errors produced by the library will get caught as well

    let mut fw = Firmware::new()?;

    println!("Select the test you would like to do:");
    println!("1. Boot catalog test");
    println!("2. Filesystem test");
    println!("3. Boot menu test");
    println!("4. Load image test");
    loop {
        if let Key::Printable(char) = wait_for_key(&mut fw.input)? {
            let char = char::from(char);
            return match char {
                '1' => test_catalog(&fw),
                '2' => test_filesystem(&mut fw),
                '3' => test_menu(&mut fw),
                '4' => test_loading(&mut fw),
                _ => Ok(()),
            };
        }
    }
}

#[entry]
fn main() -> Status {
    main_func().unwrap_or_else(|e| panic!("Failed to run test: {e}"));
    Status::SUCCESS
}

fn press_for_reboot(fw: &mut Firmware) -> ! {
    println!("Press a key to reboot");
    let _ = wait_for_key(&mut fw.input);
    action::reset();
}
