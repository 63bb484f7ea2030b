// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootError`], which encapsulates other errors

use thiserror::Error;

/// An `Error` resulting from the program.
#[derive(Error, Debug)]
pub enum BootError {
    /// An error with UEFI, or a service from the [`uefi`] crate.
    #[error("UEFI Error")]
    Uefi(#[from] uefi::Error),

    /// A `String` could not be converted into a `CString16`
    #[error("String Conversion Error")]
    StrError(#[from] crate::system::helper::StrError),

    /// An error occurred while performing filesystem operations.
    #[error("Filesystem Error")]
    FsError(#[from] crate::system::fs::FsError),

    /// An error occurred while reading a UEFI variable.
    #[error("Variable Error")]
    VariableError(#[from] crate::system::variable::VariableError),

    /// An error occurred with the keyboard input.
    #[error("Input Error")]
    InputError(#[from] crate::system::input::InputError),

    /// A `DevicePath` was malformed or could not be built.
    #[error("DevicePath Error")]
    DevicePathError(#[from] crate::device_path::DevicePathError),

    /// A load option could not be decoded.
    #[error("Load Option Error")]
    LoadOptionError(#[from] crate::boot::option::LoadOptionError),

    /// An error occurred while loading or starting an image.
    #[error("Load Image Error")]
    LoadError(#[from] crate::boot::loader::LoadError),

    /// The boot menu could not be started.
    #[error("Menu Error")]
    MenuError(#[from] crate::boot::menu::MenuError),

    /// A buffer could not be allocated.
    #[error("Allocation Failure")]
    AllocationFailure(#[from] alloc::collections::TryReserveError),
}
