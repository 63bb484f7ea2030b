// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Secure Boot state, for display only.
//!
//! The boot manager does not enforce any policy of its own. Images are still verified by the firmware's
//! `LoadImage` when Secure Boot is on.

use core::fmt;

use uefi::{CStr16, cstr16, runtime::VariableVendor};

use crate::system::variable::{VariableStore, get_variable};

/// The name of the variable holding the Secure Boot state.
pub const SECURE_BOOT_VARIABLE: &CStr16 = cstr16!("SecureBoot");

/// The Secure Boot state reported by the firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecureBootState {
    /// `SecureBoot` is 1.
    Enabled,

    /// `SecureBoot` is 0.
    Disabled,

    /// `SecureBoot` is missing or holds something else, which firmware without Secure Boot support does.
    Unknown,
}

impl SecureBootState {
    /// Reads the Secure Boot state from a [`VariableStore`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn read(store: &impl VariableStore) -> Self {
        match get_variable::<u8>(store, SECURE_BOOT_VARIABLE, &VariableVendor::GLOBAL_VARIABLE) {
            Ok(Some(1)) => Self::Enabled,
            Ok(Some(0)) => Self::Disabled,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SecureBootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Unknown => "unsupported",
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::system::variable::tests::MemoryStore;

    #[test]
    fn test_secure_boot_state() {
        let enabled = MemoryStore::default().with("SecureBoot", [1]);
        let disabled = MemoryStore::default().with("SecureBoot", [0]);
        let malformed = MemoryStore::default().with("SecureBoot", [1, 0]);

        assert_eq!(SecureBootState::read(&enabled), SecureBootState::Enabled);
        assert_eq!(SecureBootState::read(&disabled), SecureBootState::Disabled);
        assert_eq!(SecureBootState::read(&malformed), SecureBootState::Unknown);
        assert_eq!(
            SecureBootState::read(&MemoryStore::default()).to_string(),
            "unsupported"
        );
    }
}
