// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The boot catalog, built from the `BootOrder` variable.
//!
//! `BootOrder` is an array of little endian `u16` option numbers. Each number `N` names a `Boot####` variable,
//! where `####` is `N` in 4 hex digits. The catalog keeps the options in the order `BootOrder` lists them.
//!
//! Loading is all or nothing. If any listed option is missing or cannot be decoded, no catalog is built.

use alloc::{format, string::String, vec::Vec};

use log::{debug, info};
use uefi::{CStr16, CString16, cstr16, runtime::VariableVendor};

use crate::{
    BootResult,
    boot::option::LoadOption,
    error::BootError,
    system::{
        helper::str_to_cstr,
        variable::{VariableError, VariableStore},
    },
};

/// The name of the variable listing the boot options in order.
pub const BOOT_ORDER: &CStr16 = cstr16!("BootOrder");

/// One boot option of the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootEntry {
    /// The option number, as listed in `BootOrder`.
    pub id: u16,

    /// The decoded option.
    pub option: LoadOption,
}

/// The boot options listed by `BootOrder`, in that order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootCatalog {
    /// The entries.
    entries: Vec<BootEntry>,
}

impl BootCatalog {
    /// Reads `BootOrder` and every option it lists from a [`VariableStore`].
    ///
    /// # Errors
    ///
    /// May return an `Error` if `BootOrder` or any option it lists does not exist or is malformed.
    pub fn load(store: &impl VariableStore) -> BootResult<Self> {
        let vendor = VariableVendor::GLOBAL_VARIABLE;
        let order = store.get(BOOT_ORDER, &vendor)?;
        if order.len() % 2 != 0 {
            return Err(VariableError::Malformed {
                name: String::from(BOOT_ORDER),
                len: order.len(),
            }
            .into());
        }

        let mut entries = Vec::new();
        entries.try_reserve_exact(order.len() / 2)?;
        for pair in order.chunks_exact(2) {
            let id = u16::from_le_bytes([pair[0], pair[1]]);
            let blob = read_option(store, id, &vendor)?;
            let option = LoadOption::decode(&blob)?;
            debug!("Boot{id:04X}: {}", option.description());
            entries.push(BootEntry { id, option });
        }

        info!("Loaded {} boot options", entries.len());
        Ok(Self { entries })
    }

    /// Creates a catalog from entries that are already decoded.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn from_entries(entries: Vec<BootEntry>) -> Self {
        Self { entries }
    }

    /// The entries, in boot order.
    #[must_use = "Has no effect if the result is unused"]
    pub fn entries(&self) -> &[BootEntry] {
        &self.entries
    }

    /// Gets an entry by its position in the boot order.
    #[must_use = "Has no effect if the result is unused"]
    pub fn get(&self, index: usize) -> Option<&BootEntry> {
        self.entries.get(index)
    }

    /// The number of entries.
    #[must_use = "Has no effect if the result is unused"]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if there are no entries.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the variable name of an option number, like `Boot000a`.
///
/// # Errors
///
/// May return an `Error` if the name could not be converted, which does not happen for hex digits.
pub fn option_name(id: u16) -> BootResult<CString16> {
    Ok(str_to_cstr(&format!("Boot{id:04x}"))?)
}

/// Reads the content of the `Boot####` variable of an option number.
///
/// Firmware usually stores these names in uppercase, so a name with hex letters that is not found in lowercase
/// is tried once more in uppercase.
fn read_option(store: &impl VariableStore, id: u16, vendor: &VariableVendor) -> BootResult<Vec<u8>> {
    let name = option_name(id)?;
    match store.get(&name, vendor) {
        Err(BootError::VariableError(VariableError::NotFound(_))) if has_hex_letters(id) => {
            let upper = str_to_cstr(&format!("Boot{id:04X}"))?;
            store.get(&upper, vendor)
        }
        result => result,
    }
}

/// Checks if the hex form of a number contains any of `a` to `f`.
const fn has_hex_letters(id: u16) -> bool {
    let mut nibbles = id;
    let mut i = 0;
    while i < 4 {
        if nibbles & 0xF > 9 {
            return true;
        }
        nibbles >>= 4;
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::{
        boot::option::LoadOptionAttributes,
        device_path::tests::volume_path,
        system::variable::tests::MemoryStore,
    };

    fn blob(description: &str) -> Vec<u8> {
        LoadOption::new(
            LoadOptionAttributes::ACTIVE,
            CString16::try_from(description).unwrap(),
            volume_path(),
            Vec::new(),
        )
        .encode()
        .unwrap()
    }

    fn order(ids: &[u16]) -> Vec<u8> {
        ids.iter().flat_map(|id| id.to_le_bytes()).collect()
    }

    fn descriptions(catalog: &BootCatalog) -> Vec<String> {
        catalog
            .entries()
            .iter()
            .map(|x| String::from(x.option.description()))
            .collect()
    }

    #[test]
    fn test_option_name() {
        assert_eq!(String::from(&option_name(0x0003).unwrap()), "Boot0003");
        assert_eq!(String::from(&option_name(0xBEEF).unwrap()), "Bootbeef");
    }

    #[test]
    fn test_load_keeps_boot_order() {
        let store = MemoryStore::default()
            .with("BootOrder", order(&[3, 1]))
            .with("Boot0001", blob("Shell"))
            .with("Boot0003", blob("Linux"));

        let catalog = BootCatalog::load(&store).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].id, 3);
        assert_eq!(catalog.entries()[1].id, 1);
        assert_eq!(descriptions(&catalog), ["Linux", "Shell"]);
    }

    #[test]
    fn test_load_uppercase_names() {
        let store = MemoryStore::default()
            .with("BootOrder", order(&[0x000A]))
            .with("Boot000A", blob("Windows"));

        let catalog = BootCatalog::load(&store).unwrap();
        assert_eq!(descriptions(&catalog), ["Windows"]);
    }

    #[test]
    fn test_missing_option_fails_whole_load() {
        let store = MemoryStore::default()
            .with("BootOrder", order(&[1, 2]))
            .with("Boot0001", blob("Shell"));

        assert!(matches!(
            BootCatalog::load(&store),
            Err(BootError::VariableError(VariableError::NotFound(_)))
        ));
    }

    #[test]
    fn test_malformed_option_fails_whole_load() {
        let store = MemoryStore::default()
            .with("BootOrder", order(&[1, 2]))
            .with("Boot0001", blob("Shell"))
            .with("Boot0002", [0x01, 0x00]);

        assert!(matches!(
            BootCatalog::load(&store),
            Err(BootError::LoadOptionError(_))
        ));
    }

    #[test]
    fn test_missing_boot_order() {
        assert!(matches!(
            BootCatalog::load(&MemoryStore::default()),
            Err(BootError::VariableError(VariableError::NotFound(_)))
        ));
    }

    #[test]
    fn test_odd_boot_order() {
        let store = MemoryStore::default().with("BootOrder", [0x01, 0x00, 0x02]);
        assert!(matches!(
            BootCatalog::load(&store),
            Err(BootError::VariableError(VariableError::Malformed { len: 3, .. }))
        ));
    }

    #[test]
    fn test_empty_boot_order() {
        let store = MemoryStore::default().with("BootOrder", Vec::<u8>::new());
        assert!(BootCatalog::load(&store).unwrap().is_empty());
    }

    #[test]
    fn test_has_hex_letters() {
        assert!(!has_hex_letters(0x0999));
        assert!(has_hex_letters(0x000A));
        assert!(has_hex_letters(0xF000));
    }
}
