// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The file browser state machine.
//!
//! The browser lists one directory of the boot volume at a time. Up and down move a 1-based highlight, and
//! enter acts on the highlighted entry:
//!
//! - `.` does nothing.
//! - `..` ascends to the parent directory.
//! - a directory is descended into.
//! - a file is selected. Its absolute path is appended to the volume's device path, ready to be chainloaded.
//!
//! Escape or `q` leaves without a selection. If a directory cannot be opened or read, the error is shown below
//! the listing and nothing else changes.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use log::{debug, warn};
use uefi::proto::console::text::{Key, ScanCode};

use crate::{
    BootResult,
    boot::config::BootConfig,
    device_path::DevicePathBuf,
    system::{
        console::Console,
        fs::{DirEntry, DirectoryHandle, FsError},
        input::{InputSource, is_char, is_enter, is_special, wait_for_key},
    },
};

pub mod path_stack;
pub mod tree;

use path_stack::PathStack;

/// What the browser is doing after a key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowserState {
    /// Showing the current directory.
    Listing,

    /// A file was chosen. This is the full device path of it.
    Selected(DevicePathBuf),

    /// The user left without choosing a file.
    Exited,
}

/// A file browser over a volume.
pub struct FileBrowser<D: DirectoryHandle> {
    /// The device path of the volume being browsed.
    volume: DevicePathBuf,

    /// The directory being listed.
    dir: D,

    /// The names leading from the root to `dir`.
    stack: PathStack,

    /// The entries of `dir`, in the order they were read.
    entries: Vec<DirEntry>,

    /// The highlighted entry, starting at 1.
    highlight: usize,

    /// A message shown below the listing until the next key press.
    message: Option<String>,

    /// The colors.
    config: BootConfig,
}

impl<D: DirectoryHandle> FileBrowser<D> {
    /// Creates a new [`FileBrowser`] listing the root directory of a volume.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the root directory could not be read.
    pub fn new(volume: DevicePathBuf, mut root: D) -> BootResult<Self> {
        let entries = read_entries(&mut root)?;
        Ok(Self {
            volume,
            dir: root,
            stack: PathStack::new(),
            entries,
            highlight: 1,
            message: None,
            config: BootConfig::default(),
        })
    }

    /// The entries of the current directory.
    #[must_use = "Has no effect if the result is unused"]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// The highlighted position, starting at 1.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn highlight(&self) -> usize {
        self.highlight
    }

    /// The highlighted entry, if the directory is not empty.
    #[must_use = "Has no effect if the result is unused"]
    pub fn highlighted(&self) -> Option<&DirEntry> {
        self.entries.get(self.highlight.checked_sub(1)?)
    }

    /// The names leading from the root to the current directory.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn stack(&self) -> &PathStack {
        &self.stack
    }

    /// The message from the last key press, if any.
    #[must_use = "Has no effect if the result is unused"]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Applies one key press.
    ///
    /// Failures to open or read a directory are kept as the message, and leave the browser as it was.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the path of a selected file could not be built.
    pub fn handle(&mut self, key: Key) -> BootResult<BrowserState> {
        self.message = None;

        if is_special(&key, ScanCode::ESCAPE) || is_char(&key, 'q') {
            return Ok(BrowserState::Exited);
        }
        if is_special(&key, ScanCode::UP) {
            self.highlight = self.highlight.saturating_sub(1).max(1);
        } else if is_special(&key, ScanCode::DOWN) {
            self.highlight = (self.highlight + 1).min(self.entries.len().max(1));
        } else if is_enter(&key) {
            return self.activate();
        } else {
            self.message = Some("Unrecognized key, use Up/Down, Enter, or Escape".to_string());
        }
        Ok(BrowserState::Listing)
    }

    /// Draws the listing until a file is selected or the user leaves.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the input fails, or the path of a selected file could not be built.
    pub fn run(
        &mut self,
        input: &mut impl InputSource,
        console: &mut impl Console,
    ) -> BootResult<Option<DevicePathBuf>> {
        loop {
            self.render(console);
            match self.handle(wait_for_key(input)?)? {
                BrowserState::Listing => (),
                BrowserState::Selected(path) => return Ok(Some(path)),
                BrowserState::Exited => return Ok(None),
            }
        }
    }

    /// Draws the current path, the numbered entries with the highlighted one inverted, and the message.
    pub fn render(&self, console: &mut impl Console) {
        let config = &self.config;
        console.set_color(config.fg, config.bg);
        console.clear();

        match self.stack.flatten() {
            Ok(path) => {
                let _ = writeln!(console, "{}", &*path);
            }
            Err(_) => {
                let _ = writeln!(console, "?");
            }
        }
        let _ = writeln!(console);

        for (i, entry) in self.entries.iter().enumerate() {
            let position = i + 1;
            if position == self.highlight {
                console.set_color(config.highlight_fg, config.highlight_bg);
            }
            let tag = if entry.is_directory { "[DIR] " } else { "[FILE]" };
            let _ = write!(console, "{position:>3}. {tag} {}", &*entry.name);
            if position == self.highlight {
                console.set_color(config.fg, config.bg);
            }
            let _ = writeln!(console);
        }

        if let Some(message) = &self.message {
            let _ = writeln!(console);
            let _ = writeln!(console, "{message}");
        }
    }

    /// Acts on the highlighted entry.
    fn activate(&mut self) -> BootResult<BrowserState> {
        let Some(entry) = self.highlighted().cloned() else {
            return Ok(BrowserState::Listing);
        };

        if entry.is_current_dir() {
            return Ok(BrowserState::Listing);
        }

        if entry.is_parent_dir() {
            if !self.stack.is_empty() {
                self.navigate(&entry, |stack| {
                    stack.pop();
                });
            }
            return Ok(BrowserState::Listing);
        }

        if entry.is_directory {
            self.navigate(&entry, |stack| stack.push(entry.name.clone()));
            return Ok(BrowserState::Listing);
        }

        let name = self.stack.path_to(&entry.name)?;
        debug!("Selected {}", &*name);
        Ok(BrowserState::Selected(self.volume.with_file_path(&name)?))
    }

    /// Opens a directory next to or below the current one, and moves there if its entries could be read.
    ///
    /// On failure the error becomes the message, and the browser stays where it was.
    fn navigate(&mut self, entry: &DirEntry, update: impl FnOnce(&mut PathStack)) {
        let opened = self
            .dir
            .open_dir(&entry.name)
            .and_then(|mut dir| Ok((read_entries(&mut dir)?, dir)));

        match opened {
            Ok((entries, dir)) => {
                self.dir = dir;
                self.entries = entries;
                self.highlight = 1;
                update(&mut self.stack);
            }
            Err(e) => {
                warn!("Failed to open {}: {e}", &*entry.name);
                self.message = Some(alloc::format!("Failed to open {}: {e}", &*entry.name));
            }
        }
    }
}

/// Reads every entry of a directory, from the first one.
fn read_entries<D: DirectoryHandle>(dir: &mut D) -> Result<Vec<DirEntry>, FsError> {
    dir.rewind()?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.read_next()? {
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use uefi::CString16;

    use super::*;
    use crate::{
        device_path::tests::volume_path,
        system::{
            console::tests::RecordingConsole,
            fs::tests::{FakeDir, FakeNode},
            input::tests::{ScriptedInput, enter, printable},
        },
    };

    fn root() -> FakeDir {
        FakeDir::new(vec![
            FakeNode::Dir(
                "docs",
                vec![FakeNode::File("readme.txt"), FakeNode::Dir("empty", vec![])],
            ),
            FakeNode::File("a.txt"),
        ])
    }

    fn browser() -> FileBrowser<FakeDir> {
        FileBrowser::new(volume_path(), root()).unwrap()
    }

    fn down() -> Key {
        Key::Special(ScanCode::DOWN)
    }

    fn names(browser: &FileBrowser<FakeDir>) -> Vec<String> {
        browser
            .entries()
            .iter()
            .map(|x| String::from(&x.name))
            .collect()
    }

    #[test]
    fn test_select_file_at_root() {
        let mut browser = browser();
        assert_eq!(names(&browser), [".", "..", "docs", "a.txt"]);
        for _ in 0..3 {
            browser.handle(down()).unwrap();
        }
        assert_eq!(browser.highlight(), 4);

        let BrowserState::Selected(path) = browser.handle(enter()).unwrap() else {
            panic!("a.txt should be selected");
        };
        assert_eq!(path.file_path(), Some(CString16::try_from("\\a.txt").unwrap()));
        assert_eq!(path, volume_path().with_file_path(uefi::cstr16!("\\a.txt")).unwrap());
        assert!(browser.stack().is_empty());
    }

    #[test]
    fn test_descend_then_ascend() {
        let mut browser = browser();
        browser.handle(down()).unwrap();
        browser.handle(down()).unwrap();
        assert_eq!(browser.handle(enter()).unwrap(), BrowserState::Listing);
        assert_eq!(browser.stack().depth(), 1);
        assert_eq!(names(&browser), [".", "..", "readme.txt", "empty"]);
        assert_eq!(browser.highlight(), 1);

        browser.handle(down()).unwrap();
        assert_eq!(browser.handle(enter()).unwrap(), BrowserState::Listing);
        assert_eq!(browser.stack().depth(), 0);
        assert_eq!(names(&browser), [".", "..", "docs", "a.txt"]);
        assert_eq!(browser.highlight(), 1);
    }

    #[test]
    fn test_select_file_in_subdirectory() {
        let mut browser = browser();
        let mut input = ScriptedInput::keys([down(), down(), enter(), down(), down(), enter()]);
        let mut console = RecordingConsole::default();

        let path = browser.run(&mut input, &mut console).unwrap().unwrap();
        assert_eq!(
            path.file_path(),
            Some(CString16::try_from("\\docs\\readme.txt").unwrap())
        );
        assert_eq!(browser.stack().depth(), 1);
    }

    #[test]
    fn test_current_dir_is_noop() {
        let mut browser = browser();
        assert_eq!(browser.handle(enter()).unwrap(), BrowserState::Listing);
        assert!(browser.stack().is_empty());
        assert_eq!(browser.entries().len(), 4);
    }

    #[test]
    fn test_parent_at_root_is_noop() {
        let mut browser = browser();
        browser.handle(down()).unwrap();
        assert_eq!(browser.handle(enter()).unwrap(), BrowserState::Listing);
        assert!(browser.stack().is_empty());
        assert_eq!(browser.highlight(), 2);
    }

    #[test]
    fn test_highlight_is_clamped() {
        let mut browser = browser();
        browser.handle(Key::Special(ScanCode::UP)).unwrap();
        assert_eq!(browser.highlight(), 1);
        for _ in 0..10 {
            browser.handle(down()).unwrap();
        }
        assert_eq!(browser.highlight(), 4);
    }

    #[test]
    fn test_failed_navigation_keeps_state() {
        let mut browser = browser();
        // the listing says "docs" is a directory, but the volume changed underneath
        browser.entries[2].name = CString16::try_from("gone").unwrap();
        browser.highlight = 3;

        assert_eq!(browser.handle(enter()).unwrap(), BrowserState::Listing);
        assert!(browser.stack().is_empty());
        assert_eq!(browser.highlight(), 3);
        assert!(browser.message().is_some_and(|x| x.starts_with("Failed to open gone")));
    }

    #[test]
    fn test_exit_keys() {
        let mut browser = browser();
        assert_eq!(browser.handle(printable('q')).unwrap(), BrowserState::Exited);
        assert_eq!(
            browser.handle(Key::Special(ScanCode::ESCAPE)).unwrap(),
            BrowserState::Exited
        );

        let mut input = ScriptedInput::keys([printable('Q')]);
        let mut console = RecordingConsole::default();
        assert_eq!(browser.run(&mut input, &mut console).unwrap(), None);
    }

    #[test]
    fn test_unknown_key_is_reported() {
        let mut browser = browser();
        assert_eq!(browser.handle(printable('x')).unwrap(), BrowserState::Listing);
        assert!(browser.message().is_some());

        let mut console = RecordingConsole::default();
        browser.render(&mut console);
        assert!(console.lines().last().is_some_and(|x| x.starts_with("Unrecognized key")));

        browser.handle(down()).unwrap();
        assert_eq!(browser.message(), None);
    }

    #[test]
    fn test_render_listing() {
        let browser = browser();
        let mut console = RecordingConsole::default();
        browser.render(&mut console);
        assert_eq!(
            console.lines(),
            [
                "\\",
                "",
                "  1. [DIR]  .",
                "  2. [DIR]  ..",
                "  3. [DIR]  docs",
                "  4. [FILE] a.txt",
            ]
        );
    }
}
