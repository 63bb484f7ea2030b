// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The load option codec.
//!
//! Every `Boot####` variable holds one load option, laid out as:
//!
//! ```text
//! [u32 attributes][u16 file path list length][UTF-16 description, nul terminated][file path list][optional data]
//! ```
//!
//! All integers are little endian. The file path list is one or more complete device paths packed back to back,
//! filling exactly the length in the header. The first one is the image to boot, the others are left to whoever
//! reads the option. The optional data takes up whatever is left after the file path list, and is passed to the
//! image as its load options when it is started.
//!
//! Decoding is strict: any size that does not add up fails with a [`LoadOptionError`] instead of being clamped.

use alloc::vec::Vec;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use thiserror::Error;
use uefi::{CStr16, CString16};

use crate::{
    BootResult,
    device_path::{self, DevicePathBuf, DevicePathError},
};

/// The size of the fixed header of a load option in bytes.
pub const HEADER_LEN: usize = size_of::<LoadOptionHeader>();

/// An `Error` that may result from decoding or encoding a load option.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadOptionError {
    /// The blob is smaller than the fixed header.
    #[error("Load option of {0} bytes is smaller than its header")]
    TooShort(usize),

    /// The description runs to the end of the blob without a nul character.
    #[error("Load option description is not nul terminated")]
    UnterminatedDescription,

    /// The description contains characters that are not valid UCS-2.
    #[error("Load option description is not a valid UCS-2 string")]
    InvalidDescription,

    /// The declared file path list is larger than what is left after the description.
    #[error("Load option file path list of {declared} bytes overruns the {available} remaining bytes")]
    FilePathListOverrun {
        /// The file path list length in the header.
        declared: usize,

        /// The bytes left after the header and the description.
        available: usize,
    },

    /// The file path list is not a sequence of well formed device paths filling its declared length.
    #[error("Load option file path list is malformed")]
    FilePathList(#[source] DevicePathError),

    /// The file path list is too large to be encoded.
    #[error("Load option file path list of {0} bytes does not fit in the header")]
    FilePathListTooLong(usize),
}

bitflags! {
    /// The attributes of a load option.
    ///
    /// Bits not named here are kept as they are.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct LoadOptionAttributes: u32 {
        /// The option is active, and should be considered by boot managers.
        const ACTIVE = 0x0000_0001;

        /// Drivers should be reconnected after the option is processed.
        const FORCE_RECONNECT = 0x0000_0002;

        /// The option should not be shown in menus.
        const HIDDEN = 0x0000_0008;

        /// The option is an application, not a boot target.
        const CATEGORY_APP = 0x0000_0100;
    }
}

/// The fixed header of a load option, exactly as it is laid out in memory.
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LoadOptionHeader {
    /// The attributes, little endian.
    attributes: u32,

    /// The length of the file path list in bytes, little endian.
    file_path_list_length: u16,
}

/// A decoded load option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOption {
    /// The attributes of the option.
    attributes: LoadOptionAttributes,

    /// The name of the option as shown to the user.
    description: CString16,

    /// The device path of the image to load.
    file_path_list: DevicePathBuf,

    /// The device paths packed after the first one.
    additional_paths: Vec<DevicePathBuf>,

    /// The load options passed to the image.
    optional_data: Vec<u8>,
}

impl LoadOption {
    /// Creates a new [`LoadOption`] from its parts.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new(
        attributes: LoadOptionAttributes,
        description: CString16,
        file_path_list: DevicePathBuf,
        optional_data: Vec<u8>,
    ) -> Self {
        Self {
            attributes,
            description,
            file_path_list,
            additional_paths: Vec::new(),
            optional_data,
        }
    }

    /// Decodes a load option from the content of a `Boot####` variable.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the blob is smaller than the header, the description is not terminated or not
    /// valid UCS-2, the file path list overruns the blob, or is not made of complete device paths filling its
    /// declared length.
    /// May also return an `Error` if the parts could not be allocated.
    pub fn decode(blob: &[u8]) -> BootResult<Self> {
        let header = blob
            .get(..HEADER_LEN)
            .ok_or(LoadOptionError::TooShort(blob.len()))?;
        let header: LoadOptionHeader = bytemuck::pod_read_unaligned(header);
        let attributes = LoadOptionAttributes::from_bits_retain(u32::from_le(header.attributes));
        let declared = usize::from(u16::from_le(header.file_path_list_length));

        let rest = &blob[HEADER_LEN..];
        let (description, description_len) = decode_description(rest)?;

        let rest = &rest[description_len..];
        if declared > rest.len() {
            return Err(LoadOptionError::FilePathListOverrun {
                declared,
                available: rest.len(),
            }
            .into());
        }
        let (list, optional) = rest.split_at(declared);

        let (file_path_list, additional_paths) = decode_file_path_list(list)?;

        let mut optional_data = Vec::new();
        optional_data.try_reserve_exact(optional.len())?;
        optional_data.extend_from_slice(optional);

        Ok(Self {
            attributes,
            description,
            file_path_list,
            additional_paths,
            optional_data,
        })
    }

    /// Encodes the load option into the layout of a `Boot####` variable.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the file path list is too large for the header, or the buffer could not be
    /// allocated.
    pub fn encode(&self) -> BootResult<Vec<u8>> {
        let paths = || core::iter::once(&self.file_path_list).chain(&self.additional_paths);
        let list_len: usize = paths().map(DevicePathBuf::byte_len).sum();
        let file_path_list_length =
            u16::try_from(list_len).map_err(|_| LoadOptionError::FilePathListTooLong(list_len))?;
        let header = LoadOptionHeader {
            attributes: self.attributes.bits().to_le(),
            file_path_list_length: file_path_list_length.to_le(),
        };
        let description = self.description.to_u16_slice_with_nul();

        let mut blob = Vec::new();
        blob.try_reserve_exact(
            HEADER_LEN + description.len() * 2 + list_len + self.optional_data.len(),
        )?;
        blob.extend_from_slice(bytemuck::bytes_of(&header));
        blob.extend(description.iter().flat_map(|c| c.to_le_bytes()));
        for path in paths() {
            blob.extend_from_slice(path.as_bytes());
        }
        blob.extend_from_slice(&self.optional_data);
        Ok(blob)
    }

    /// The attributes of the option.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn attributes(&self) -> LoadOptionAttributes {
        self.attributes
    }

    /// Checks if the option is marked active.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn is_active(&self) -> bool {
        self.attributes.contains(LoadOptionAttributes::ACTIVE)
    }

    /// The name of the option.
    #[must_use = "Has no effect if the result is unused"]
    pub fn description(&self) -> &CStr16 {
        &self.description
    }

    /// The device path of the image the option boots, which is the first path of the file path list.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn file_path_list(&self) -> &DevicePathBuf {
        &self.file_path_list
    }

    /// The device paths following the first one in the file path list, such as an initrd.
    #[must_use = "Has no effect if the result is unused"]
    pub fn additional_paths(&self) -> &[DevicePathBuf] {
        &self.additional_paths
    }

    /// The opaque data passed to the image, which may be empty.
    #[must_use = "Has no effect if the result is unused"]
    pub fn optional_data(&self) -> &[u8] {
        &self.optional_data
    }
}

/// Splits a file path list into the device paths packed in it.
///
/// The first path is required, and the paths must end exactly at the end of the list.
fn decode_file_path_list(mut list: &[u8]) -> BootResult<(DevicePathBuf, Vec<DevicePathBuf>)> {
    let first = next_path(&mut list)?;
    let mut rest = Vec::new();
    while !list.is_empty() {
        let path = next_path(&mut list)?;
        rest.try_reserve(1)?;
        rest.push(path);
    }
    Ok((first, rest))
}

/// Copies the device path at the start of `list`, and advances past it.
fn next_path(list: &mut &[u8]) -> BootResult<DevicePathBuf> {
    let len = device_path::length(list).map_err(LoadOptionError::FilePathList)?;
    let (path, rest) = list.split_at(len);
    *list = rest;
    DevicePathBuf::from_bytes(path)
}

/// Reads the nul terminated description at the start of `bytes`.
///
/// Returns the description and the amount of bytes it took up, nul included.
fn decode_description(bytes: &[u8]) -> BootResult<(CString16, usize)> {
    let mut chars = Vec::new();
    for pair in bytes.chunks_exact(2) {
        let c = u16::from_le_bytes([pair[0], pair[1]]);
        chars.try_reserve(1)?;
        chars.push(c);
        if c == 0 {
            let len = chars.len() * 2;
            let description = CStr16::from_u16_with_nul(&chars)
                .map_err(|_| LoadOptionError::InvalidDescription)?;
            return Ok((CString16::from(description), len));
        }
    }
    Err(LoadOptionError::UnterminatedDescription.into())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use uefi::cstr16;

    use super::*;
    use crate::{
        device_path::{TYPE_MEDIA, tests::volume_path},
        error::BootError,
    };

    fn option(description: &str, optional_data: &[u8]) -> LoadOption {
        LoadOption::new(
            LoadOptionAttributes::ACTIVE,
            CString16::try_from(description).unwrap(),
            volume_path()
                .with_file_path(cstr16!("\\EFI\\BOOT\\BOOTX64.EFI"))
                .unwrap(),
            optional_data.to_vec(),
        )
    }

    fn decode_err(blob: &[u8]) -> LoadOptionError {
        match LoadOption::decode(blob) {
            Err(BootError::LoadOptionError(e)) => e,
            other => panic!("expected a load option error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_known_layout() {
        // "A", then a file path node holding "\x" and the terminator, then two bytes of optional data
        let blob = [
            0x01, 0x00, 0x00, 0x00, // attributes
            0x0E, 0x00, // file path list length
            b'A', 0x00, 0x00, 0x00, // description
            TYPE_MEDIA, 0x04, 0x0A, 0x00, b'\\', 0x00, b'x', 0x00, 0x00, 0x00, // file path
            0x7F, 0xFF, 0x04, 0x00, // terminator
            0xDE, 0xAD, // optional data
        ];
        let option = LoadOption::decode(&blob).unwrap();
        assert!(option.is_active());
        assert_eq!(option.description(), cstr16!("A"));
        assert_eq!(option.file_path_list().byte_len(), 14);
        assert_eq!(
            option.file_path_list().file_path(),
            Some(CString16::try_from("\\x").unwrap())
        );
        assert_eq!(option.optional_data(), [0xDE, 0xAD]);
    }

    #[test]
    fn test_header_only_is_too_short() {
        assert_eq!(decode_err(&[0x01, 0x00, 0x00]), LoadOptionError::TooShort(3));
        assert_eq!(decode_err(&[]), LoadOptionError::TooShort(0));
    }

    #[test]
    fn test_unterminated_description() {
        let blob = [0x01, 0x00, 0x00, 0x00, 0x04, 0x00, b'A', 0x00, b'B'];
        assert_eq!(decode_err(&blob), LoadOptionError::UnterminatedDescription);
    }

    #[test]
    fn test_file_path_list_overrun() {
        let blob = [0x01, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x7F, 0xFF, 0x04, 0x00];
        assert_eq!(
            decode_err(&blob),
            LoadOptionError::FilePathListOverrun {
                declared: 8,
                available: 4
            }
        );
    }

    #[test]
    fn test_packed_file_path_list() {
        // two paths of a file path node and a terminator each, then one byte of optional data
        let blob = [
            0x01, 0x00, 0x00, 0x00, // attributes
            0x1C, 0x00, // file path list length
            b'A', 0x00, 0x00, 0x00, // description
            TYPE_MEDIA, 0x04, 0x0A, 0x00, b'\\', 0x00, b'x', 0x00, 0x00, 0x00, // first file path
            0x7F, 0xFF, 0x04, 0x00, // terminator
            TYPE_MEDIA, 0x04, 0x0A, 0x00, b'\\', 0x00, b'y', 0x00, 0x00, 0x00, // second file path
            0x7F, 0xFF, 0x04, 0x00, // terminator
            0x42, // optional data
        ];
        let option = LoadOption::decode(&blob).unwrap();
        assert_eq!(
            option.file_path_list().file_path(),
            Some(CString16::try_from("\\x").unwrap())
        );
        assert_eq!(option.additional_paths().len(), 1);
        assert_eq!(
            option.additional_paths()[0].file_path(),
            Some(CString16::try_from("\\y").unwrap())
        );
        assert_eq!(option.optional_data(), [0x42]);
        assert_eq!(option.encode().unwrap(), blob);
    }

    #[test]
    fn test_truncated_second_path() {
        // a complete terminator, then half of another node
        let blob = [0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x7F, 0xFF, 0x04, 0x00, 0x7F, 0xFF];
        assert_eq!(
            decode_err(&blob),
            LoadOptionError::FilePathList(DevicePathError::Truncated {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_empty_file_path_list() {
        let blob = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            decode_err(&blob),
            LoadOptionError::FilePathList(DevicePathError::Truncated {
                needed: 4,
                available: 0
            })
        );
    }

    #[test]
    fn test_malformed_file_path_list() {
        let blob = [0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x7F, 0xFF, 0x00, 0x00];
        assert_eq!(
            decode_err(&blob),
            LoadOptionError::FilePathList(DevicePathError::NodeTooShort(0))
        );
    }

    #[test]
    fn test_unknown_attributes_are_kept() {
        let mut blob = option("Linux", &[]).encode().unwrap();
        blob[2] = 0x80;
        let decoded = LoadOption::decode(&blob).unwrap();
        assert_eq!(decoded.attributes().bits(), 0x0080_0001);
        assert_eq!(decoded.encode().unwrap(), blob);
    }

    proptest! {
        #[test]
        fn encode_then_decode(
            description in "[a-zA-Z0-9 ]{0,32}",
            optional_data in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let original = option(&description, &optional_data);
            let decoded = LoadOption::decode(&original.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded.description(), original.description());
            prop_assert_eq!(decoded.file_path_list().as_bytes(), original.file_path_list().as_bytes());
            prop_assert_eq!(decoded.optional_data(), optional_data.as_slice());
        }

        #[test]
        fn decode_never_panics(blob in prop::collection::vec(any::<u8>(), 0..96)) {
            let _ = LoadOption::decode(&blob);
        }
    }
}
