// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The stack of directory names leading to the directory being browsed.

use alloc::vec::Vec;

use smallvec::SmallVec;
use uefi::{CStr16, CString16};

use crate::{BootResult, system::helper::StrError};

/// The separator placed before every segment.
const SEPARATOR: u16 = b'\\' as u16;

/// The directories descended into from the root of a volume, outermost first.
///
/// Segments are only ever pushed when descending and popped when ascending. Flattening turns them into an
/// absolute path like `\EFI\BOOT`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathStack {
    /// The directory names.
    segments: SmallVec<[CString16; 8]>,
}

impl PathStack {
    /// Creates an empty [`PathStack`], standing at the root.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descends into a directory.
    pub fn push(&mut self, name: CString16) {
        self.segments.push(name);
    }

    /// Ascends to the parent directory, returning the name that was left.
    pub fn pop(&mut self) -> Option<CString16> {
        self.segments.pop()
    }

    /// The amount of directories below the root.
    #[must_use = "Has no effect if the result is unused"]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Checks if the stack stands at the root.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The directory names, outermost first.
    #[must_use = "Has no effect if the result is unused"]
    pub fn segments(&self) -> &[CString16] {
        &self.segments
    }

    /// Flattens the stack into an absolute path. The root is `\`.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the buffer could not be allocated.
    pub fn flatten(&self) -> BootResult<CString16> {
        if self.is_empty() {
            return Ok(CString16::from(uefi::cstr16!("\\")));
        }
        join(self.segments.iter().map(|x| &**x))
    }

    /// Flattens the stack with one more name at the end, without pushing it.
    ///
    /// This is the absolute path of an entry in the current directory.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the buffer could not be allocated.
    pub fn path_to(&self, name: &CStr16) -> BootResult<CString16> {
        join(self.segments.iter().map(|x| &**x).chain([name]))
    }
}

/// Joins names into `\name\name...`.
fn join<'a>(names: impl Iterator<Item = &'a CStr16> + Clone) -> BootResult<CString16> {
    let len: usize = names.clone().map(|x| x.num_chars() + 1).sum();

    let mut buf = Vec::new();
    buf.try_reserve_exact(len + 1)?;
    for name in names {
        buf.push(SEPARATOR);
        buf.extend_from_slice(name.to_u16_slice());
    }
    buf.push(0);

    let path = CStr16::from_u16_with_nul(&buf).map_err(StrError::FromSliceWithNul)?;
    Ok(CString16::from(path))
}
