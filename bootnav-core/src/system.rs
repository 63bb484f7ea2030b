// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! System re-exports
//!
//! Everything here sits between the firmware and the rest of the crate. Each firmware service the boot manager
//! depends on is a trait ([`variable::VariableStore`], [`fs::DirectoryHandle`], [`input::InputSource`],
//! [`console::Console`]) with one implementation over the [`uefi`] crate.

pub mod console;
pub mod firmware;
pub mod fs;
pub mod helper;
pub mod input;
pub mod log_backend;
pub mod variable;

mod global_allocator;
mod panic_handler;
