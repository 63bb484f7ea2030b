// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

use bootnav_core::boot::{
    catalog::BootCatalog,
    config::BootConfig,
    menu::{BootMenu, resolve_boot_path},
};
use uefi::println;

use crate::{Firmware, press_for_reboot};

pub fn test_menu(fw: &mut Firmware) -> anyhow::Result<()> {
    let catalog = BootCatalog::load(&fw.variables)?;
    let mut menu = BootMenu::new(catalog, BootConfig::default().without_countdown())?;

    let entry = menu.run(&mut fw.input, &mut fw.console)?;
    let path = resolve_boot_path(&fw.volume, entry)?;
    assert!(!path.is_relative());

    println!("Selected {}", entry.option.description());
    if let Some(file) = path.file_path() {
        println!("It would boot {}", &*file);
    }
    println!("All menu assertions passed!");
    press_for_reboot(fw);
}
