// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The chainload dispatcher.
//!
//! This provides [`chainload`], which loads the image at a device path, gives it its load options, and starts
//! it. The firmware side is behind [`ImageLoader`], implemented by [`FirmwareLoader`] with boot services.
//!
//! The load options must stay valid for as long as the image may read them, so [`LoadedImageGuard`] owns them
//! and only releases them after the image has been unloaded.

use alloc::vec::Vec;

use log::{info, warn};
use thiserror::Error;
use uefi::{
    Handle, Status,
    boot::{self, LoadImageSource},
    proto::{BootPolicy, loaded_image::LoadedImage},
};

use crate::{BootResult, device_path::DevicePathBuf};

/// An `Error` that may result from loading an image.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The firmware could not load the image.
    #[error("Failed to load image: {0:?}")]
    ImageLoadFailed(Status),

    /// The image was loaded, but could not be started, or returned with an error.
    #[error("Failed to start image: {0:?}")]
    ImageStartFailed(Status),

    /// The load options are too large to be passed to the image.
    #[error("Load options of {0} bytes are too large")]
    OptionsTooLarge(usize),
}

/// Loads and starts images.
pub trait ImageLoader {
    /// A loaded image. Dropping it unloads the image.
    type Image;

    /// Loads the image at a device path.
    ///
    /// # Errors
    ///
    /// Should return [`LoadError::ImageLoadFailed`] if the image could not be loaded.
    fn load(&mut self, path: &DevicePathBuf) -> BootResult<Self::Image>;

    /// Gives a loaded image its load options.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the options could not be set.
    fn set_load_options(&mut self, image: &mut Self::Image, options: &[u8]) -> BootResult<()>;

    /// Transfers control to a loaded image, until it returns.
    ///
    /// # Errors
    ///
    /// Should return [`LoadError::ImageStartFailed`] if the image could not be started or returned an error.
    fn start(&mut self, image: &mut Self::Image) -> BootResult<()>;
}

/// Loads the image at `path`, passes it `payload` as its load options, then starts it.
///
/// An empty payload leaves the load options unset. Nothing is started if loading fails. When this returns, the
/// image has been unloaded and the payload released, whether or not it started.
///
/// # Errors
///
/// May return an `Error` if the image could not be loaded or started.
pub fn chainload<L: ImageLoader>(loader: &mut L, path: &DevicePathBuf, payload: &[u8]) -> BootResult<()> {
    if let Some(name) = path.file_path() {
        info!("Loading {}", &*name);
    }

    let mut image = loader.load(path)?;
    if !payload.is_empty() {
        loader.set_load_options(&mut image, payload)?;
    }
    loader.start(&mut image)
}

/// Loads images with boot services.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirmwareLoader;

/// An image loaded by [`FirmwareLoader`], together with the load options it was given.
pub struct LoadedImageGuard {
    /// The handle of the loaded image.
    handle: Handle,

    /// The load options. The image holds a pointer into this buffer.
    options: Vec<u8>,

    /// Set once the image has run and returned, after which the firmware has already unloaded it.
    started: bool,
}

impl LoadedImageGuard {
    /// The handle of the loaded image.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn handle(&self) -> Handle {
        self.handle
    }

    /// Checks if the image still has to be unloaded when the guard is dropped.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn needs_unload(&self) -> bool {
        !self.started
    }
}

impl Drop for LoadedImageGuard {
    fn drop(&mut self) {
        if !self.needs_unload() {
            return;
        }
        if let Err(e) = boot::unload_image(self.handle) {
            warn!("Failed to unload image: {:?}", e.status());
        }
    }
}

impl ImageLoader for FirmwareLoader {
    type Image = LoadedImageGuard;

    fn load(&mut self, path: &DevicePathBuf) -> BootResult<Self::Image> {
        let src = LoadImageSource::FromDevicePath {
            device_path: path.as_device_path()?,
            boot_policy: BootPolicy::BootSelection,
        };
        let handle = boot::load_image(boot::image_handle(), src)
            .map_err(|e| LoadError::ImageLoadFailed(e.status()))?;
        Ok(LoadedImageGuard {
            handle,
            options: Vec::new(),
            started: false,
        })
    }

    fn set_load_options(&mut self, image: &mut Self::Image, options: &[u8]) -> BootResult<()> {
        let size =
            u32::try_from(options.len()).map_err(|_| LoadError::OptionsTooLarge(options.len()))?;

        image.options.try_reserve_exact(options.len())?;
        image.options.extend_from_slice(options);

        let mut loaded = boot::open_protocol_exclusive::<LoadedImage>(image.handle)?;
        // SAFETY: the buffer is owned by the guard, which outlives the image
        unsafe {
            loaded.set_load_options(image.options.as_ptr(), size);
        }
        Ok(())
    }

    fn start(&mut self, image: &mut Self::Image) -> BootResult<()> {
        boot::start_image(image.handle).map_err(|e| LoadError::ImageStartFailed(e.status()))?;
        image.started = true;
        Ok(())
    }
}
