// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootMgr`], which ties the boot catalog, the menu and the chainload dispatcher together.

use log::{error, info};

use crate::{
    BootResult,
    boot::{
        catalog::BootCatalog,
        config::BootConfig,
        loader::{ImageLoader, chainload},
        menu::{BootMenu, resolve_boot_path},
        secure_boot::SecureBootState,
    },
    device_path::DevicePathBuf,
    system::{
        console::Console,
        input::{InputSource, wait_for_key},
        variable::VariableStore,
    },
};

pub mod action;
pub mod catalog;
pub mod config;
pub mod loader;
pub mod menu;
pub mod option;
pub mod secure_boot;

/// The boot menu over the firmware's boot options, bound to the volume the boot manager runs from.
pub struct BootMgr {
    /// The menu.
    menu: BootMenu,

    /// The device path of the boot manager's own volume, for options with relative paths.
    volume: DevicePathBuf,
}

impl BootMgr {
    /// Creates a new [`BootMgr`] from the `BootOrder` and `Boot####` variables.
    ///
    /// The countdown follows the `Timeout` variable, and the header shows the Secure Boot state.
    ///
    /// # Errors
    ///
    /// May return an `Error` if any listed boot option is missing or malformed, or if there are none.
    pub fn new(store: &impl VariableStore, volume: DevicePathBuf) -> BootResult<Self> {
        let catalog = BootCatalog::load(store)?;
        let config = BootConfig::new(store);
        let menu = BootMenu::new(catalog, config)?.with_secure_boot(SecureBootState::read(store));
        Ok(Self { menu, volume })
    }

    /// Returns a reference to the inner [`BootMenu`].
    #[must_use = "Has no effect if the result is unused"]
    pub const fn menu(&self) -> &BootMenu {
        &self.menu
    }

    /// Runs the menu and boots the chosen entry.
    ///
    /// If the entry fails to boot, the error is shown until a key is pressed, and the menu comes back without a
    /// countdown. This returns once a started image hands control back.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the input fails while the menu is waiting.
    pub fn run(
        &mut self,
        loader: &mut impl ImageLoader,
        input: &mut impl InputSource,
        console: &mut impl Console,
    ) -> BootResult<()> {
        loop {
            let entry = self.menu.run(input, console)?;
            let description = entry.option.description();

            let result = resolve_boot_path(&self.volume, entry)
                .and_then(|path| chainload(loader, &path, entry.option.optional_data()));

            match result {
                Ok(()) => {
                    info!("{description} returned");
                    return Ok(());
                }
                Err(e) => {
                    error!("Failed to boot {description}: {e}");
                    let _ = writeln!(console, "Failed to boot {description}: {e}");
                    let _ = writeln!(console, "Press any key to return to the menu");
                    wait_for_key(input)?;
                    self.menu.disable_countdown();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use uefi::{CString16, Status};

    use super::*;
    use crate::{
        boot::{
            loader::LoadError,
            menu::MenuState,
            option::{LoadOption, LoadOptionAttributes},
        },
        device_path::tests::volume_path,
        error::BootError,
        system::{
            console::tests::RecordingConsole,
            input::{
                InputEvent,
                tests::{ScriptedInput, enter},
            },
            variable::tests::MemoryStore,
        },
    };

    /// Fails the first load, then succeeds, remembering what was loaded.
    #[derive(Default)]
    struct FlakyLoader {
        attempts: usize,
        loaded: Vec<DevicePathBuf>,
        payloads: Vec<Vec<u8>>,
    }

    impl ImageLoader for FlakyLoader {
        type Image = ();

        fn load(&mut self, path: &DevicePathBuf) -> BootResult<Self::Image> {
            self.attempts += 1;
            if self.attempts == 1 {
                return Err(LoadError::ImageLoadFailed(Status::NOT_FOUND).into());
            }
            self.loaded.push(path.clone());
            Ok(())
        }

        fn set_load_options(&mut self, _image: &mut Self::Image, options: &[u8]) -> BootResult<()> {
            self.payloads.push(options.to_vec());
            Ok(())
        }

        fn start(&mut self, _image: &mut Self::Image) -> BootResult<()> {
            Ok(())
        }
    }

    fn store() -> MemoryStore {
        let relative = DevicePathBuf::from_file_path(uefi::cstr16!("\\EFI\\shell.efi")).unwrap();
        let blob = LoadOption::new(
            LoadOptionAttributes::ACTIVE,
            CString16::try_from("Shell").unwrap(),
            relative,
            alloc::vec![0xAA, 0xBB],
        )
        .encode()
        .unwrap();
        MemoryStore::default()
            .with("BootOrder", 1u16.to_le_bytes())
            .with("Boot0001", blob)
            .with("Timeout", 1u16.to_le_bytes())
    }

    #[test]
    fn test_failed_boot_returns_to_menu() {
        let mut mgr = BootMgr::new(&store(), volume_path()).unwrap();
        let mut loader = FlakyLoader::default();
        let mut input = ScriptedInput::new([
            InputEvent::Tick,             // countdown runs out, first load fails
            InputEvent::Key(enter()),     // acknowledge the error
            InputEvent::Tick,             // no countdown anymore
            InputEvent::Key(enter()),     // boot again
        ]);
        let mut console = RecordingConsole::default();

        mgr.run(&mut loader, &mut input, &mut console).unwrap();

        assert_eq!(loader.attempts, 2);
        assert_eq!(mgr.menu().state(), MenuState::Confirmed);
        assert_eq!(loader.payloads, [alloc::vec![0xAA, 0xBB]]);
        assert_eq!(
            loader.loaded[0].file_path(),
            Some(CString16::try_from("\\EFI\\shell.efi").unwrap())
        );
        assert!(!loader.loaded[0].is_relative());
    }

    #[test]
    fn test_empty_boot_order_is_cancelled() {
        let store = MemoryStore::default().with("BootOrder", Vec::<u8>::new());
        assert!(matches!(
            BootMgr::new(&store, volume_path()),
            Err(BootError::MenuError(_))
        ));
    }
}
