// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload repository trait.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::types::Payload;

/// Read access to stored payload records.
#[async_trait]
pub trait PayloadRepository: Send + Sync {
    /// Fetch a payload by id. `Ok(None)` means no such record.
    async fn get(&self, id: &str) -> Result<Option<Payload>, VigilError>;
}
