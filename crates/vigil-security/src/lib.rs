// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redaction of sensitive values in payload bodies.
//!
//! The key list is injected per call through [`RedactionPolicy`] rather than
//! read from process state, so callers and tests can vary it freely.

pub mod redact;

pub use redact::{redact_text, RedactionPolicy, REDACTED};
