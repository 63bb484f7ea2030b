// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The firmware services a frontend needs, gathered into one context.

use uefi::{
    boot,
    proto::{device_path::DevicePath, loaded_image::LoadedImage, media::file::Directory},
};

use crate::{
    BootResult,
    device_path::DevicePathBuf,
    system::{
        console::UefiConsole,
        fs::{FsError, UefiFileSystem},
        input::UefiInput,
        variable::RuntimeVariableStore,
    },
};

/// Firmware services opened once at startup and passed to the boot menu or file browser.
pub struct Firmware {
    /// The console output.
    pub console: UefiConsole,

    /// The keyboard, and the countdown timer.
    pub input: UefiInput,

    /// UEFI variables through runtime services.
    pub variables: RuntimeVariableStore,

    /// The device path of the volume the boot manager was loaded from.
    pub volume: DevicePathBuf,

    /// The filesystem of that volume.
    fs: UefiFileSystem,
}

impl Firmware {
    /// Opens the firmware services.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the boot manager was not loaded from a device, or if the console input or the
    /// boot volume could not be opened.
    pub fn new() -> BootResult<Self> {
        let volume = image_volume_path()?;
        Ok(Self {
            console: UefiConsole,
            input: UefiInput::new()?,
            variables: RuntimeVariableStore,
            volume,
            fs: UefiFileSystem::from_image_fs()?,
        })
    }

    /// Opens the root directory of the boot volume.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the volume could not be opened.
    pub fn open_root(&mut self) -> Result<Directory, FsError> {
        self.fs.open_root()
    }
}

/// Copies the device path of the device the running image was loaded from.
///
/// The protocols are closed again before this returns, so the filesystem of the same device can be opened
/// exclusively afterwards.
fn image_volume_path() -> BootResult<DevicePathBuf> {
    let device = {
        let image = boot::open_protocol_exclusive::<LoadedImage>(boot::image_handle())?;
        image.device().ok_or(FsError::NoImageDevice)?
    };
    let path = boot::open_protocol_exclusive::<DevicePath>(device)?;
    DevicePathBuf::from_bytes(path.as_bytes())
}
