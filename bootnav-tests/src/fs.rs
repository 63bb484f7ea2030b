// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

use bootnav_core::{
    browser::{path_stack::PathStack, tree::print_tree},
    system::fs::DirectoryHandle,
};
use uefi::{cstr16, println};

use crate::{Firmware, press_for_reboot};

pub fn test_filesystem(fw: &mut Firmware) -> anyhow::Result<()> {
    let mut root = fw.open_root()?;

    let mut names = alloc::vec::Vec::new();
    while let Some(entry) = root.read_next()? {
        names.push(entry);
    }
    assert!(!names.is_empty(), "The boot volume has an empty root");

    root.rewind()?;
    let first = root.read_next()?.unwrap();
    assert_eq!(first.name, names[0].name);

    let efi = names
        .iter()
        .find(|entry| entry.is_directory && &*entry.name == cstr16!("EFI"))
        .expect("The boot volume has no EFI directory");

    let mut stack = PathStack::new();
    let mut dir = root.open_dir(&efi.name)?;
    stack.push(efi.name.clone());
    assert_eq!(&*stack.flatten()?, cstr16!("\\EFI"));
    assert!(dir.read_next()?.is_some());

    print_tree(&mut dir, &mut fw.console, 0)?;
    println!("All filesystem assertions passed!");
    press_for_reboot(fw);
}
