// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootConfig`], the settings of the boot menu.
//!
//! There is no configuration file. The defaults below apply, except for the countdown, which follows the
//! firmware's own `Timeout` variable when it exists:
//!
//! | Setting   | Default                      |
//! |-----------|------------------------------|
//! | countdown | 6 ticks, or `Timeout`        |
//! | tick      | 1 second                     |
//! | colors    | light gray on black          |
//! | highlight | the colors, inverted         |
//!
//! A `Timeout` of `0xFFFF` means the firmware waits forever, so the menu starts without a countdown.

use log::warn;
use uefi::{CStr16, cstr16, proto::console::text::Color, runtime::VariableVendor};

use crate::system::variable::{VariableStore, get_variable};

/// The name of the firmware's boot timeout variable.
pub const TIMEOUT_VARIABLE: &CStr16 = cstr16!("Timeout");

/// The countdown used when `Timeout` does not exist, in ticks.
pub const DEFAULT_TIMEOUT: u16 = 6;

/// The `Timeout` value that disables the countdown.
pub const TIMEOUT_DISABLED: u16 = 0xFFFF;

/// The period of one countdown tick, in units of 100 nanoseconds.
pub const TICK_INTERVAL: u64 = 10_000_000;

/// The settings of the boot menu.
#[derive(Clone, Copy, Debug)]
pub struct BootConfig {
    /// The amount of ticks before the selected entry is booted, or [`TIMEOUT_DISABLED`].
    pub timeout: u16,

    /// The period of one tick, in units of 100 nanoseconds.
    pub tick_interval: u64,

    /// Allows adjusting the foreground of the menu.
    pub fg: Color,

    /// Allows adjusting the background of the menu.
    pub bg: Color,

    /// Allows adjusting the foreground of the highlighted entry.
    pub highlight_fg: Color,

    /// Allows adjusting the background of the highlighted entry.
    pub highlight_bg: Color,
}

impl BootConfig {
    /// Creates a new [`BootConfig`], taking the countdown from the `Timeout` variable if it exists.
    ///
    /// A `Timeout` that cannot be read is logged, and the default is kept.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(store: &impl VariableStore) -> Self {
        let mut config = Self::default();
        match get_variable::<u16>(store, TIMEOUT_VARIABLE, &VariableVendor::GLOBAL_VARIABLE) {
            Ok(Some(timeout)) => config.timeout = timeout,
            Ok(None) => (),
            Err(e) => warn!("Ignoring the Timeout variable: {e}"),
        }
        config
    }

    /// The amount of countdown ticks, or `None` if the menu should wait forever.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn countdown(&self) -> Option<u16> {
        match self.timeout {
            TIMEOUT_DISABLED => None,
            ticks => Some(ticks),
        }
    }

    /// Returns the same settings with the countdown disabled.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn without_countdown(self) -> Self {
        Self {
            timeout: TIMEOUT_DISABLED,
            ..self
        }
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            tick_interval: TICK_INTERVAL,
            fg: Color::LightGray,
            bg: Color::Black,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightGray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::variable::tests::MemoryStore;

    #[test]
    fn test_defaults() {
        let config = BootConfig::new(&MemoryStore::default());
        assert_eq!(config.countdown(), Some(6));
        assert_eq!(config.tick_interval, 10_000_000);
        assert!(matches!(config.fg, Color::LightGray));
        assert!(matches!(config.highlight_bg, Color::LightGray));
    }

    #[test]
    fn test_timeout_variable() {
        let store = MemoryStore::default().with("Timeout", 3u16.to_le_bytes());
        assert_eq!(BootConfig::new(&store).countdown(), Some(3));

        let store = MemoryStore::default().with("Timeout", 0xFFFFu16.to_le_bytes());
        assert_eq!(BootConfig::new(&store).countdown(), None);
    }

    #[test]
    fn test_malformed_timeout_keeps_default() {
        let store = MemoryStore::default().with("Timeout", [1]);
        assert_eq!(BootConfig::new(&store).countdown(), Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_without_countdown() {
        let config = BootConfig::default().without_countdown();
        assert_eq!(config.countdown(), None);
        assert_eq!(config.tick_interval, TICK_INTERVAL);
    }
}
