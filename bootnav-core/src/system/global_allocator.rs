// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Routes heap allocations through boot services pool memory.
//!
//! This is enabled when the `global_allocator` feature is enabled. Hosted test and fuzz builds use the system
//! allocator instead.

#![cfg(feature = "global_allocator")]
use uefi::allocator::Allocator;

/// The UEFI global allocator, valid until boot services are exited.
#[global_allocator]
static ALLOCATOR: Allocator = Allocator;
