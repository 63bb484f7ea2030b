// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The device path model.
//!
//! A device path is a chain of variable length nodes, each starting with a 4 byte header of
//! `[type][subtype][length (u16, little endian)]`, where the length covers the header and the payload. The chain
//! ends at a node of type [`TYPE_END`] and subtype [`SUBTYPE_END_ENTIRE`].
//!
//! Paths come from firmware variables and from the firmware itself, so none of the length fields are trusted.
//! Every node is read through [`Nodes`], which checks the declared length against what is actually left in the
//! buffer before advancing. An owned [`DevicePathBuf`] is only ever constructed from bytes that passed this check,
//! and always owns its own buffer. Splicing or appending to a path allocates a fresh one.

use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;
use uefi::{CStr16, CString16, proto::device_path::DevicePath};

use crate::BootResult;

/// The size of a node header in bytes.
pub const NODE_HEADER_LEN: usize = size_of::<NodeHeader>();

/// The node type of media device paths.
pub const TYPE_MEDIA: u8 = 0x04;

/// The node type of end of path nodes.
pub const TYPE_END: u8 = 0x7F;

/// The media subtype of a file path node.
pub const SUBTYPE_FILE_PATH: u8 = 0x04;

/// The end subtype that terminates one instance of a multi-instance path.
pub const SUBTYPE_END_INSTANCE: u8 = 0x01;

/// The end subtype that terminates the entire path.
pub const SUBTYPE_END_ENTIRE: u8 = 0xFF;

/// The encoded terminator node.
const END_ENTIRE_NODE: [u8; NODE_HEADER_LEN] = [TYPE_END, SUBTYPE_END_ENTIRE, 4, 0];

/// An `Error` that may result from reading or building a device path.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DevicePathError {
    /// A node declared a length smaller than its own header (zero included).
    #[error("Device path node declares a length of {0} bytes, shorter than its header")]
    NodeTooShort(usize),

    /// A node would extend past the end of the buffer, or the buffer ended before a terminator.
    #[error("Device path node needs {needed} bytes, but only {available} remain")]
    Truncated {
        /// The amount of bytes the node requires.
        needed: usize,

        /// The amount of bytes left in the buffer.
        available: usize,
    },

    /// A node payload is too large for the 16 bit length field.
    #[error("Device path node payload of {0} bytes does not fit in a node")]
    NodeTooLarge(usize),

    /// The firmware representation of the path could not be created.
    #[error("Device path was rejected by the firmware conversion")]
    Firmware,
}

/// The header of a device path node, exactly as it is laid out in memory.
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct NodeHeader {
    /// The major type of the node.
    device_type: u8,

    /// The subtype of the node.
    sub_type: u8,

    /// The total length of the node, little endian.
    length: u16,
}

/// A borrowed view of one validated device path node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node<'a> {
    /// The major type of the node.
    device_type: u8,

    /// The subtype of the node.
    sub_type: u8,

    /// The whole node, header included.
    bytes: &'a [u8],
}

impl<'a> Node<'a> {
    /// The major type of the node.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn device_type(&self) -> u8 {
        self.device_type
    }

    /// The subtype of the node.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn sub_type(&self) -> u8 {
        self.sub_type
    }

    /// The total length of the node, header included.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn length(&self) -> usize {
        self.bytes.len()
    }

    /// The bytes following the header.
    #[must_use = "Has no effect if the result is unused"]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[NODE_HEADER_LEN..]
    }

    /// The whole node, header included.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Checks if this node terminates the entire path.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn is_end_entire(&self) -> bool {
        self.device_type == TYPE_END && self.sub_type == SUBTYPE_END_ENTIRE
    }

    /// Checks if this node is a media file path node.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn is_file_path(&self) -> bool {
        self.device_type == TYPE_MEDIA && self.sub_type == SUBTYPE_FILE_PATH
    }

    /// Checks if two nodes have the same type, subtype and length.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn same_shape(&self, other: &Node<'_>) -> bool {
        self.device_type == other.device_type
            && self.sub_type == other.sub_type
            && self.bytes.len() == other.bytes.len()
    }
}

/// A bounds checked cursor over the nodes of a device path.
///
/// Yields every node up to and including the terminator, then stops. If a node is malformed, the error is
/// yielded once and the cursor stops as well.
#[derive(Clone, Debug)]
pub struct Nodes<'a> {
    /// The bytes that have not been visited yet.
    remaining: &'a [u8],

    /// Set once the terminator or an error has been yielded.
    finished: bool,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = Result<Node<'a>, DevicePathError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match read_node(self.remaining) {
            Ok(node) => {
                self.remaining = &self.remaining[node.length()..];
                self.finished = node.is_end_entire();
                Some(Ok(node))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Returns a bounds checked cursor over the nodes in a byte buffer.
#[must_use = "Has no effect if the result is unused"]
pub const fn nodes(bytes: &[u8]) -> Nodes<'_> {
    Nodes {
        remaining: bytes,
        finished: false,
    }
}

/// Measures a device path, from the first node to and including the terminator.
///
/// # Errors
///
/// May return an `Error` if a node declares a length shorter than its header, a node extends past the end of
/// the buffer, or the buffer ends before a terminator is found.
pub fn length(bytes: &[u8]) -> Result<usize, DevicePathError> {
    nodes(bytes).try_fold(0, |total, node| node.map(|node| total + node.length()))
}

/// Reads the node at the start of a buffer.
fn read_node(bytes: &[u8]) -> Result<Node<'_>, DevicePathError> {
    let header = bytes
        .get(..NODE_HEADER_LEN)
        .ok_or(DevicePathError::Truncated {
            needed: NODE_HEADER_LEN,
            available: bytes.len(),
        })?;
    let header: NodeHeader = bytemuck::pod_read_unaligned(header);

    let length = usize::from(u16::from_le(header.length));
    if length < NODE_HEADER_LEN {
        return Err(DevicePathError::NodeTooShort(length));
    }

    let node = bytes.get(..length).ok_or(DevicePathError::Truncated {
        needed: length,
        available: bytes.len(),
    })?;

    Ok(Node {
        device_type: header.device_type,
        sub_type: header.sub_type,
        bytes: node,
    })
}

/// Appends an encoded node to a buffer.
///
/// # Errors
///
/// May return an `Error` if the payload does not fit in a node, or the buffer could not grow.
pub(crate) fn push_node(
    buf: &mut Vec<u8>,
    device_type: u8,
    sub_type: u8,
    payload: &[u8],
) -> BootResult<()> {
    let length = u16::try_from(NODE_HEADER_LEN + payload.len())
        .map_err(|_| DevicePathError::NodeTooLarge(payload.len()))?;
    let header = NodeHeader {
        device_type,
        sub_type,
        length: length.to_le(),
    };

    buf.try_reserve(usize::from(length))?;
    buf.extend_from_slice(bytemuck::bytes_of(&header));
    buf.extend_from_slice(payload);
    Ok(())
}

/// An owned, validated device path.
///
/// The buffer always ends exactly at an end of entire path node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevicePathBuf {
    /// The encoded nodes, terminator included.
    bytes: Vec<u8>,
}

impl DevicePathBuf {
    /// Validates a foreign buffer and copies the path at its start.
    ///
    /// Anything after the terminator is ignored.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the path is malformed, or the buffer could not be allocated.
    pub fn from_bytes(bytes: &[u8]) -> BootResult<Self> {
        let len = length(bytes)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)?;
        buf.extend_from_slice(&bytes[..len]);
        Ok(Self { bytes: buf })
    }

    /// Creates a path made of a single media file path node, with no device in front of it.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the name is too long for one node, or the buffer could not be allocated.
    pub fn from_file_path(name: &CStr16) -> BootResult<Self> {
        let payload: Vec<u8> = name
            .to_u16_slice_with_nul()
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect();

        let mut bytes = Vec::new();
        push_node(&mut bytes, TYPE_MEDIA, SUBTYPE_FILE_PATH, &payload)?;
        bytes.try_reserve_exact(END_ENTIRE_NODE.len())?;
        bytes.extend_from_slice(&END_ENTIRE_NODE);
        Ok(Self { bytes })
    }

    /// The encoded path, terminator included.
    #[must_use = "Has no effect if the result is unused"]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The length of the encoded path in bytes, terminator included.
    #[must_use = "Has no effect if the result is unused"]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns a cursor over every node, terminator included.
    #[must_use = "Has no effect if the result is unused"]
    pub fn nodes(&self) -> Nodes<'_> {
        nodes(&self.bytes)
    }

    /// Checks if the path starts with a file path node, meaning it is relative to some volume.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_relative(&self) -> bool {
        matches!(self.nodes().next(), Some(Ok(node)) if node.is_file_path())
    }

    /// Splices another path onto this one.
    ///
    /// Nodes are copied from `self` until the first node with the same type, subtype and length as the
    /// terminator of `tail`, or until the terminator of `self`. Every node of `tail` is appended after that,
    /// terminator included. The result owns a new buffer.
    ///
    /// The terminator of `tail` is always an end of entire path node, so the copy stops at the first one in
    /// `self`. End of instance nodes have another subtype and are copied.
    ///
    /// # Errors
    ///
    /// May return an `Error` if either path is malformed, or the buffer could not be allocated.
    pub fn splice(&self, tail: &Self) -> BootResult<Self> {
        let junction = tail.terminator()?;

        let mut prefix_len = 0;
        for node in self.nodes() {
            let node = node?;
            if node.is_end_entire() || node.same_shape(&junction) {
                break;
            }
            prefix_len += node.length();
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(prefix_len + tail.bytes.len())?;
        bytes.extend_from_slice(&self.bytes[..prefix_len]);
        bytes.extend_from_slice(&tail.bytes);
        Ok(Self { bytes })
    }

    /// Appends a file path node holding an absolute name to this path, which is usually a volume.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the name is too long for one node, or the buffer could not be allocated.
    pub fn with_file_path(&self, name: &CStr16) -> BootResult<Self> {
        self.splice(&Self::from_file_path(name)?)
    }

    /// Gets the file name held by the file path nodes of this path, if there are any.
    ///
    /// The payloads of consecutive file path nodes are joined together.
    #[must_use = "Has no effect if the result is unused"]
    pub fn file_path(&self) -> Option<CString16> {
        let mut name: Vec<u16> = self
            .nodes()
            .filter_map(Result::ok)
            .filter(Node::is_file_path)
            .flat_map(|node| {
                node.payload()
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .take_while(|&c| c != 0)
            })
            .collect();

        if name.is_empty() {
            return None;
        }
        name.push(0);
        CStr16::from_u16_with_nul(&name).ok().map(CString16::from)
    }

    /// Borrows the path as the firmware's [`DevicePath`].
    ///
    /// # Errors
    ///
    /// May return an `Error` if the firmware type rejects the buffer.
    pub fn as_device_path(&self) -> Result<&DevicePath, DevicePathError> {
        <&DevicePath>::try_from(self.bytes.as_slice()).map_err(|_| DevicePathError::Firmware)
    }

    /// The terminator node of the path.
    fn terminator(&self) -> Result<Node<'_>, DevicePathError> {
        self.nodes()
            .last()
            .unwrap_or(Err(DevicePathError::Truncated {
                needed: NODE_HEADER_LEN,
                available: 0,
            }))
    }
}

impl AsRef<[u8]> for DevicePathBuf {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
