// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Prints the tree of a volume.

use log::warn;

use crate::{
    BootResult,
    system::{console::Console, fs::DirectoryHandle},
};

/// Directories are not descended into at this depth or deeper.
pub const MAX_DEPTH: usize = 4;

/// How much further children are indented than their parent.
pub const INDENT: usize = 2;

/// Prints every entry of a directory, indented by `depth` spaces, and the entries of its subdirectories below
/// them.
///
/// Directories whose names start with a dot are listed but not descended into. A subdirectory that cannot be
/// opened is logged and skipped.
///
/// # Errors
///
/// May return an `Error` if a directory could not be read.
pub fn print_tree<D: DirectoryHandle>(
    dir: &mut D,
    console: &mut impl Console,
    depth: usize,
) -> BootResult<()> {
    dir.rewind()?;
    while let Some(entry) = dir.read_next()? {
        let tag = if entry.is_directory { "[DIR]  " } else { "[FILE] " };
        let _ = writeln!(console, "{:depth$}{tag}{}", "", &*entry.name);

        if entry.is_directory && !entry.is_dot() && depth < MAX_DEPTH {
            match dir.open_dir(&entry.name) {
                Ok(mut child) => print_tree(&mut child, console, depth + INDENT)?,
                Err(e) => warn!("Skipping {}: {e}", &*entry.name),
            }
        }
    }
    Ok(())
}
