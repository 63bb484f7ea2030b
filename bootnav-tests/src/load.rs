// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

use bootnav_core::boot::loader::{FirmwareLoader, chainload};
use uefi::{CStr16, cstr16, println};

use crate::{Firmware, press_for_reboot};

const SHELL_PATH: &CStr16 = cstr16!("\\shellx64.efi");
const FALLBACK_PATH: &CStr16 = cstr16!("\\EFI\\BOOT\\BOOTx64.efi");

pub fn test_loading(fw: &mut Firmware) -> anyhow::Result<()> {
    println!("Will try to load an image from either {SHELL_PATH} or {FALLBACK_PATH} on same filesystem");

    for efi in [SHELL_PATH, FALLBACK_PATH] {
        let path = fw.volume.with_file_path(efi)?;
        assert_eq!(path.file_path().as_deref(), Some(efi));

        match chainload(&mut FirmwareLoader, &path, &[]) {
            Ok(()) => {
                println!("{efi} was loaded, started, and returned");
                press_for_reboot(fw);
            }
            Err(e) => println!("Could not load {efi}: {e}"),
        }
    }

    println!("Cannot test if load image works, as {SHELL_PATH} and {FALLBACK_PATH} do not exist");
    press_for_reboot(fw);
}
