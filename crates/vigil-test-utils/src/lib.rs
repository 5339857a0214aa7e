// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vigil.
//!
//! - [`MemoryStore`] - every repository trait over in-memory vectors, with
//!   call counting and injectable failures
//! - [`fixtures`] - terse builders for messages, traces, and payloads

pub mod fixtures;
pub mod memory_store;

pub use memory_store::{MemoryStore, Operation};
