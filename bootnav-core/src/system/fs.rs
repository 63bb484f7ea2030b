// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Filesystem helpers for the file browser.
//!
//! The browser only ever needs to enumerate a directory and open a child of it by name. This is expressed by
//! [`DirectoryHandle`], which is implemented for the UEFI [`Directory`] of a [`SimpleFileSystem`]. Handles are
//! closed when they are dropped.

use alloc::string::String;
use thiserror::Error;
use uefi::{
    CStr16, CString16, Status,
    boot::{self, ScopedProtocol},
    cstr16,
    proto::media::{
        file::{Directory, File, FileAttribute, FileMode},
        fs::SimpleFileSystem,
    },
};

use crate::BootResult;

/// An error that may result from performing filesystem operations
#[derive(Error, Debug)]
pub enum FsError {
    /// A file could not be opened.
    #[error("Failed to open file: {0:?}")]
    OpenErr(Status),

    /// A directory could not be read.
    #[error("Failed to read directory: {0:?}")]
    ReadErr(Status),

    /// A directory could not be rewound.
    #[error("Failed to rewind directory: {0:?}")]
    SeekErr(Status),

    /// The opened file is a regular file, not a directory.
    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),

    /// The boot manager image was not loaded from a device.
    #[error("The image was not loaded from a device")]
    NoImageDevice,
}

/// One entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    /// The name of the entry, without any path.
    pub name: CString16,

    /// If the entry is a directory.
    pub is_directory: bool,
}

impl DirEntry {
    /// Checks if this is the `.` entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_current_dir(&self) -> bool {
        &*self.name == cstr16!(".")
    }

    /// Checks if this is the `..` entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_parent_dir(&self) -> bool {
        &*self.name == cstr16!("..")
    }

    /// Checks if the name starts with a dot.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_dot(&self) -> bool {
        self.name.to_u16_slice().first() == Some(&u16::from(b'.'))
    }
}

/// An open directory that can be enumerated.
pub trait DirectoryHandle: Sized {
    /// Opens a directory inside this one by name.
    ///
    /// `..` opens the parent directory.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the entry does not exist, could not be opened, or is not a directory.
    fn open_dir(&mut self, name: &CStr16) -> Result<Self, FsError>;

    /// Reads the next entry, or `None` once every entry has been read.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the directory could not be read.
    fn read_next(&mut self) -> Result<Option<DirEntry>, FsError>;

    /// Moves back to the first entry.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the position could not be reset.
    fn rewind(&mut self) -> Result<(), FsError>;
}

impl DirectoryHandle for Directory {
    fn open_dir(&mut self, name: &CStr16) -> Result<Self, FsError> {
        self.open(name, FileMode::Read, FileAttribute::empty())
            .map_err(|e| FsError::OpenErr(e.status()))?
            .into_directory()
            .ok_or_else(|| FsError::NotADirectory(String::from(name)))
    }

    fn read_next(&mut self) -> Result<Option<DirEntry>, FsError> {
        let info = self
            .read_entry_boxed()
            .map_err(|e| FsError::ReadErr(e.status()))?;
        Ok(info.map(|info| DirEntry {
            name: CString16::from(info.file_name()),
            is_directory: info.is_directory(),
        }))
    }

    fn rewind(&mut self) -> Result<(), FsError> {
        self.reset_entry_readout()
            .map_err(|e| FsError::SeekErr(e.status()))
    }
}

/// A thin wrapper around [`SimpleFileSystem`].
pub struct UefiFileSystem(ScopedProtocol<SimpleFileSystem>);

impl UefiFileSystem {
    /// Create a new [`UefiFileSystem`] from the same filesystem as the boot manager.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the boot image's filesystem does not support [`SimpleFileSystem`] for some reason.
    pub fn from_image_fs() -> BootResult<Self> {
        let fs = boot::get_image_file_system(boot::image_handle())?;
        Ok(Self(fs))
    }

    /// Opens the root directory of the volume.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the volume could not be opened.
    pub fn open_root(&mut self) -> Result<Directory, FsError> {
        self.0
            .open_volume()
            .map_err(|e| FsError::OpenErr(e.status()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::{string::String, vec::Vec};

    use super::*;

    /// An entry of an in-memory directory tree.
    #[derive(Clone, Debug)]
    pub(crate) enum FakeNode {
        File(&'static str),
        Dir(&'static str, Vec<FakeNode>),
    }

    impl FakeNode {
        fn name(&self) -> &'static str {
            match self {
                Self::File(name) | Self::Dir(name, _) => *name,
            }
        }
    }

    /// A handle into an in-memory directory tree.
    ///
    /// Every directory lists `.` and `..` first, the root included.
    #[derive(Clone, Debug)]
    pub(crate) struct FakeDir {
        root: Vec<FakeNode>,
        path: Vec<&'static str>,
        cursor: usize,
    }

    impl FakeDir {
        pub(crate) fn new(root: Vec<FakeNode>) -> Self {
            Self {
                root,
                path: Vec::new(),
                cursor: 0,
            }
        }

        pub(crate) fn path(&self) -> &[&'static str] {
            &self.path
        }

        fn children(&self) -> &[FakeNode] {
            let mut children = self.root.as_slice();
            for segment in &self.path {
                match children.iter().find(|x| x.name() == *segment) {
                    Some(FakeNode::Dir(_, inner)) => children = inner.as_slice(),
                    _ => return &[],
                }
            }
            children
        }

        fn listing(&self) -> Vec<DirEntry> {
            let dots = [(".", true), ("..", true)];
            dots.into_iter()
                .chain(
                    self.children()
                        .iter()
                        .map(|x| (x.name(), matches!(x, FakeNode::Dir(..)))),
                )
                .map(|(name, is_directory)| DirEntry {
                    name: CString16::try_from(name).unwrap(),
                    is_directory,
                })
                .collect()
        }
    }

    impl DirectoryHandle for FakeDir {
        fn open_dir(&mut self, name: &CStr16) -> Result<Self, FsError> {
            let name = String::from(name);
            let mut path = self.path.clone();
            match name.as_str() {
                "." => (),
                ".." => {
                    path.pop();
                }
                name => match self.children().iter().find(|x| x.name() == name) {
                    Some(FakeNode::Dir(name, _)) => path.push(*name),
                    Some(FakeNode::File(_)) => {
                        return Err(FsError::NotADirectory(name.to_owned()));
                    }
                    None => return Err(FsError::OpenErr(Status::NOT_FOUND)),
                },
            }
            Ok(Self {
                root: self.root.clone(),
                path,
                cursor: 0,
            })
        }

        fn read_next(&mut self) -> Result<Option<DirEntry>, FsError> {
            let entry = self.listing().into_iter().nth(self.cursor);
            self.cursor += 1;
            Ok(entry)
        }

        fn rewind(&mut self) -> Result<(), FsError> {
            self.cursor = 0;
            Ok(())
        }
    }

    #[test]
    fn test_dot_entries() {
        let entry = |name| DirEntry {
            name: CString16::try_from(name).unwrap(),
            is_directory: true,
        };
        assert!(entry(".").is_current_dir());
        assert!(entry("..").is_parent_dir());
        assert!(!entry("..").is_current_dir());
        assert!(entry(".hidden").is_dot());
        assert!(!entry("EFI").is_dot());
    }

    #[test]
    fn test_fake_dir_navigation() {
        let mut root = FakeDir::new(vec![
            FakeNode::Dir("EFI", vec![FakeNode::File("shell.efi")]),
            FakeNode::File("startup.nsh"),
        ]);
        let mut efi = root.open_dir(&CString16::try_from("EFI").unwrap()).unwrap();
        assert_eq!(efi.path(), ["EFI"]);

        let names: Vec<_> = core::iter::from_fn(|| efi.read_next().unwrap())
            .map(|x| String::from(&x.name))
            .collect();
        assert_eq!(names, [".", "..", "shell.efi"]);

        assert!(matches!(
            root.open_dir(&CString16::try_from("startup.nsh").unwrap()),
            Err(FsError::NotADirectory(_))
        ));
    }
}
