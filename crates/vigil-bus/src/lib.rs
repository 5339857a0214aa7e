// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live event fan-out for the Vigil transcript service.
//!
//! Producers call [`EventBus::publish`] for each execution event; every
//! viewer currently subscribed to that conversation receives a copy on its
//! own bounded queue. Publishing never blocks: a full queue drops the event
//! for that one subscriber.

pub mod bus;

pub use bus::{CancelHandle, EventBus, Subscription, DEFAULT_QUEUE_SIZE};
