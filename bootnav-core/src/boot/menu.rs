// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The boot menu state machine.
//!
//! The menu starts in [`MenuState::Countdown`], counting down one tick per timer period. If the countdown runs
//! out, the highlighted entry is confirmed. The first key press instead stops the countdown and moves to
//! [`MenuState::Selecting`], without otherwise acting on that key. While selecting, up and down move the
//! highlight and enter confirms it.
//!
//! [`BootMenu::handle`] is the pure transition function. [`BootMenu::run`] drives it with an [`InputSource`],
//! drawing every state on a [`Console`].

use log::debug;
use thiserror::Error;
use uefi::proto::console::text::ScanCode;

use crate::{
    BootResult,
    boot::{
        catalog::{BootCatalog, BootEntry},
        config::BootConfig,
        secure_boot::SecureBootState,
    },
    device_path::DevicePathBuf,
    system::{
        console::Console,
        input::{InputEvent, InputSource, is_enter, is_special},
    },
};

/// An `Error` that may result from starting the boot menu.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MenuError {
    /// There are no entries to choose from.
    #[error("There are no boot options to choose from")]
    Cancelled,
}

/// The state of the boot menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuState {
    /// Waiting for the countdown to run out, or for a key press.
    Countdown {
        /// The ticks left before the highlighted entry is confirmed.
        remaining: u16,
    },

    /// Waiting for the user to pick an entry.
    Selecting,

    /// An entry was chosen.
    Confirmed,
}

/// The boot menu over a [`BootCatalog`].
pub struct BootMenu {
    /// The entries to choose from, never empty.
    catalog: BootCatalog,

    /// The menu settings.
    config: BootConfig,

    /// Shown in the header.
    secure_boot: SecureBootState,

    /// The index of the highlighted entry.
    selected: usize,

    /// The current state.
    state: MenuState,
}

impl BootMenu {
    /// Creates a new [`BootMenu`].
    ///
    /// The second entry is highlighted first if there is more than one. Without a countdown the menu starts in
    /// [`MenuState::Selecting`], and a countdown of zero ticks confirms right away.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Cancelled`] if the catalog is empty.
    pub fn new(catalog: BootCatalog, config: BootConfig) -> Result<Self, MenuError> {
        if catalog.is_empty() {
            return Err(MenuError::Cancelled);
        }

        let selected = usize::from(catalog.len() > 1);
        let state = match config.countdown() {
            None => MenuState::Selecting,
            Some(0) => MenuState::Confirmed,
            Some(remaining) => MenuState::Countdown { remaining },
        };

        Ok(Self {
            catalog,
            config,
            secure_boot: SecureBootState::Unknown,
            selected,
            state,
        })
    }

    /// Sets the Secure Boot state shown in the header.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn with_secure_boot(mut self, secure_boot: SecureBootState) -> Self {
        self.secure_boot = secure_boot;
        self
    }

    /// The current state.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn state(&self) -> MenuState {
        self.state
    }

    /// The index of the highlighted entry.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// The highlighted entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn selected_entry(&self) -> Option<&BootEntry> {
        self.catalog.get(self.selected)
    }

    /// The entries of the menu.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn catalog(&self) -> &BootCatalog {
        &self.catalog
    }

    /// Returns to [`MenuState::Selecting`] with the countdown turned off, keeping the highlight.
    ///
    /// This is used after the chosen entry failed to boot.
    pub fn disable_countdown(&mut self) {
        self.config = self.config.without_countdown();
        self.state = MenuState::Selecting;
    }

    /// Applies one input event, and returns the new state.
    pub fn handle(&mut self, event: InputEvent) -> MenuState {
        self.state = match (self.state, event) {
            (MenuState::Countdown { remaining }, InputEvent::Tick) => match remaining.saturating_sub(1) {
                0 => MenuState::Confirmed,
                remaining => MenuState::Countdown { remaining },
            },
            (MenuState::Countdown { .. }, InputEvent::Key(_)) => MenuState::Selecting,
            (MenuState::Selecting, InputEvent::Key(key)) if is_enter(&key) => {
                debug!("Confirmed entry {}", self.selected);
                MenuState::Confirmed
            }
            (MenuState::Selecting, InputEvent::Key(key)) => {
                if is_special(&key, ScanCode::UP) {
                    self.selected = self.selected.saturating_sub(1);
                } else if is_special(&key, ScanCode::DOWN) {
                    self.selected = (self.selected + 1).min(self.catalog.len() - 1);
                }
                MenuState::Selecting
            }
            (state, _) => state,
        };
        self.state
    }

    /// Draws the menu until an entry is confirmed, then returns it.
    ///
    /// The countdown timer is armed while counting down, and disarmed as soon as the countdown ends.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the timer could not be armed, or the input could not be waited on.
    pub fn run(
        &mut self,
        input: &mut impl InputSource,
        console: &mut impl Console,
    ) -> BootResult<&BootEntry> {
        self.render(console);

        if matches!(self.state, MenuState::Countdown { .. }) {
            input.arm_timer(self.config.tick_interval)?;
        }

        while self.state != MenuState::Confirmed {
            let event = input.wait()?;
            let counting = matches!(self.state, MenuState::Countdown { .. });
            self.handle(event);
            if counting && !matches!(self.state, MenuState::Countdown { .. }) {
                input.disarm_timer()?;
            }
            self.render(console);
        }

        self.catalog
            .get(self.selected)
            .ok_or_else(|| MenuError::Cancelled.into())
    }

    /// Draws the header, every entry with the highlighted one inverted, and a footer for the current state.
    pub fn render(&self, console: &mut impl Console) {
        let config = &self.config;
        console.set_color(config.fg, config.bg);
        console.clear();

        let _ = writeln!(console, "bootnav (Secure Boot {})", self.secure_boot);
        let _ = writeln!(console);

        for (i, entry) in self.catalog.entries().iter().enumerate() {
            if i == self.selected {
                console.set_color(config.highlight_fg, config.highlight_bg);
            }
            let _ = write!(console, "  {}", entry.option.description());
            if !entry.option.is_active() {
                let _ = write!(console, " (inactive)");
            }
            if i == self.selected {
                console.set_color(config.fg, config.bg);
            }
            let _ = writeln!(console);
        }

        let _ = writeln!(console);
        let _ = match self.state {
            MenuState::Countdown { remaining } => {
                writeln!(console, "Booting the highlighted entry in {remaining}, press any key to stop")
            }
            MenuState::Selecting => writeln!(console, "Up/Down to select, Enter to boot"),
            MenuState::Confirmed => writeln!(console, "Booting..."),
        };
    }
}

/// Gets the device path to load for a boot entry.
///
/// A file path list that starts with a file path node is relative to the volume the boot manager was loaded
/// from, so it is spliced onto `volume`. Anything else is already complete.
///
/// # Errors
///
/// May return an `Error` if the paths could not be spliced.
pub fn resolve_boot_path(volume: &DevicePathBuf, entry: &BootEntry) -> BootResult<DevicePathBuf> {
    let path = entry.option.file_path_list();
    if path.is_relative() {
        volume.splice(path)
    } else {
        Ok(path.clone())
    }
}
