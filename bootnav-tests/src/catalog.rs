// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

use bootnav_core::boot::{
    catalog::BootCatalog,
    config::BootConfig,
    secure_boot::SecureBootState,
};
use uefi::println;

use crate::Firmware;

pub fn test_catalog(fw: &Firmware) -> anyhow::Result<()> {
    let catalog = BootCatalog::load(&fw.variables)?;
    assert!(!catalog.is_empty(), "BootOrder lists no boot options");

    for (i, entry) in catalog.entries().iter().enumerate() {
        let path = entry.option.file_path_list();
        assert!(path.byte_len() >= 4);
        assert_eq!(catalog.get(i).map(|e| e.id), Some(entry.id));
        println!(
            "Boot{:04X}: {} ({} nodes, {} more paths, {} bytes of optional data)",
            entry.id,
            entry.option.description(),
            path.nodes().count(),
            entry.option.additional_paths().len(),
            entry.option.optional_data().len()
        );
    }

    let config = BootConfig::new(&fw.variables);
    println!("Timeout: {:?}", config.countdown());
    println!("Secure Boot: {}", SecureBootState::read(&fw.variables));
    println!("All catalog assertions passed!");
    Ok(())
}
