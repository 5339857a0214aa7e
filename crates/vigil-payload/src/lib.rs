// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload body delivery for the Vigil transcript service.
//!
//! Serves stored payload bodies with single byte-range support, transparent
//! gzip decompression, and deadline-bounded reads from remote object stores.

pub mod decompress;
pub mod error;
pub mod fetch;
pub mod range;
pub mod server;

pub use error::DeliveryError;
pub use fetch::{FetchError, FsObjectFetcher, HttpObjectFetcher, ObjectFetcher, SchemeRouter};
pub use range::{ByteRange, RangeError, RangeSpec};
pub use server::{DeliveryStatus, PayloadResponse, PayloadServer};
