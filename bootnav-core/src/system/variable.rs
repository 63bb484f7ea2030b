// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! UEFI variable access.
//!
//! Boot options, the boot order, the firmware timeout and the Secure Boot state all live in UEFI variables in the
//! global variable namespace. They are read through [`VariableStore`], so that the boot catalog can be built
//! from an in-memory store in tests.

use alloc::{string::String, vec::Vec};
use thiserror::Error;
use uefi::{
    CStr16, Status,
    runtime::{self, VariableVendor},
};

use crate::{BootResult, error::BootError};

/// An `Error` that may result from reading a UEFI variable.
#[derive(Error, Debug)]
pub enum VariableError {
    /// The variable does not exist.
    #[error("Variable \"{0}\" was not found")]
    NotFound(String),

    /// The variable exists, but its content does not have the expected size.
    #[error("Variable \"{name}\" has an unexpected size of {len} bytes")]
    Malformed {
        /// The name of the variable.
        name: String,

        /// The size of the content in bytes.
        len: usize,
    },
}

/// A source of UEFI variables.
///
/// Usually this will use runtime services.
pub trait VariableStore {
    /// Reads the whole content of a variable given its name and vendor.
    ///
    /// # Errors
    ///
    /// Must return [`VariableError::NotFound`] if the variable does not exist. May return other errors if the
    /// variable could not be read.
    fn get(&self, name: &CStr16, vendor: &VariableVendor) -> BootResult<Vec<u8>>;
}

/// UEFI variable storage implementation with runtime services.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuntimeVariableStore;

impl VariableStore for RuntimeVariableStore {
    fn get(&self, name: &CStr16, vendor: &VariableVendor) -> BootResult<Vec<u8>> {
        // get_variable_boxed queries the size first, then reads into a buffer of that size.
        match runtime::get_variable_boxed(name, vendor) {
            Ok((var, _)) => Ok(var.into_vec()),
            Err(e) if e.status() == Status::NOT_FOUND => {
                Err(VariableError::NotFound(String::from(name)).into())
            }
            Err(e) => Err(BootError::Uefi(e.to_err_without_payload())),
        }
    }
}

/// A fixed size value that can be read from a UEFI variable.
pub trait UefiVariable: Sized {
    /// Convert little endian bytes to `Self`, if there are exactly enough of them.
    fn from_bytes(bytes: &[u8]) -> Option<Self>;
}

/// Implements [`UefiVariable`] for integer types.
macro_rules! uefi_variable_int {
    ($($ty:ty),*) => {
        $(
            impl UefiVariable for $ty {
                fn from_bytes(bytes: &[u8]) -> Option<Self> {
                    bytes.try_into().ok().map(Self::from_le_bytes)
                }
            }
        )*
    };
}

uefi_variable_int!(u8, u16, u32, u64);

/// Gets a UEFI variable of a [`UefiVariable`] given the name and vendor.
///
/// If the variable was not found, `None` is returned.
///
/// # Errors
///
/// May return an `Error` if the variable could not be read, or its size does not match the type.
pub fn get_variable<T: UefiVariable>(
    store: &impl VariableStore,
    name: &CStr16,
    vendor: &VariableVendor,
) -> BootResult<Option<T>> {
    match store.get(name, vendor) {
        Ok(bytes) => T::from_bytes(&bytes).map(Some).ok_or_else(|| {
            VariableError::Malformed {
                name: String::from(name),
                len: bytes.len(),
            }
            .into()
        }),
        Err(BootError::VariableError(VariableError::NotFound(_))) => Ok(None),
        Err(e) => Err(e),
    }
}
