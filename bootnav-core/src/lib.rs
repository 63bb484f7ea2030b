// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The `bootnav` core library crate.
//!
//! This contains everything the `bootnav` frontends share: the device path model, the load option codec,
//! the boot catalog built from the `BootOrder` variable, the boot menu and file browser state machines, and
//! the chainload dispatcher that hands control to the chosen image.
//!
//! Every piece of firmware it touches is reached through a small trait (variables, directories, input,
//! console, image loading), with an implementation over the [`uefi`] crate in [`system`]. This is what lets
//! the state machines be unit tested on the host.
//!
//! ## MSRV
//!
//! The minimum supported rust version is 1.88.0.

#![cfg_attr(not(any(fuzzing, test, doctest)), no_std)]

/// The primary result type that wraps around [`crate::error::BootError`].
pub type BootResult<T> = Result<T, crate::error::BootError>;

pub mod boot;
pub mod browser;
pub mod device_path;
pub mod error;
pub mod system;

extern crate alloc;
