// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single byte-range parsing (`Range: bytes=...`).
//!
//! Parsing happens before the body length is known; [`RangeSpec::resolve`]
//! clamps against the length once it is.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("malformed range header: {0}")]
    Malformed(String),

    #[error("multiple ranges are not supported")]
    MultipleRanges,

    #[error("range start {start} is past end {end}")]
    Inverted { start: u64, end: u64 },

    #[error("range lies outside a {total}-byte body")]
    Unsatisfiable { total: u64 },
}

/// One requested range, as written by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `bytes=start-`
    From { start: u64 },
    /// `bytes=start-end`, both inclusive.
    Bounded { start: u64, end: u64 },
    /// `bytes=-len`, the final `len` bytes.
    Suffix { len: u64 },
}

/// A resolved inclusive range within a body of `total` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ByteRange {
    /// Number of selected bytes; never zero.
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }

    /// The selected bytes of `body`. `body.len()` must equal `total`.
    pub fn slice<'a>(&self, body: &'a [u8]) -> &'a [u8] {
        let start = usize::try_from(self.start).unwrap_or(usize::MAX).min(body.len());
        let end = usize::try_from(self.end + 1).unwrap_or(usize::MAX).min(body.len());
        &body[start..end]
    }
}

impl FromStr for RangeSpec {
    type Err = RangeError;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let malformed = || RangeError::Malformed(header.to_string());

        let spec = header
            .trim()
            .strip_prefix("bytes=")
            .ok_or_else(malformed)?
            .trim();
        if spec.contains(',') {
            return Err(RangeError::MultipleRanges);
        }
        let (start, end) = spec.split_once('-').ok_or_else(malformed)?;
        let (start, end) = (start.trim(), end.trim());
        let number = |s: &str| -> Result<u64, RangeError> {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            s.parse().map_err(|_| malformed())
        };

        match (start.is_empty(), end.is_empty()) {
            (true, true) => Err(malformed()),
            (true, false) => Ok(Self::Suffix { len: number(end)? }),
            (false, true) => Ok(Self::From {
                start: number(start)?,
            }),
            (false, false) => {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(RangeError::Inverted { start, end });
                }
                Ok(Self::Bounded { start, end })
            }
        }
    }
}

impl RangeSpec {
    /// Clamp against a known body length.
    ///
    /// Empty bodies satisfy no range. A suffix longer than the body selects
    /// the whole body; a zero-length suffix selects nothing and is rejected.
    pub fn resolve(self, total: u64) -> Result<ByteRange, RangeError> {
        let unsatisfiable = RangeError::Unsatisfiable { total };
        if total == 0 {
            return Err(unsatisfiable);
        }
        let last = total - 1;
        let (start, end) = match self {
            Self::From { start } => (start, last),
            Self::Bounded { start, end } => (start, end.min(last)),
            Self::Suffix { len: 0 } => return Err(unsatisfiable),
            Self::Suffix { len } => (total - len.min(total), last),
        };
        if start > last {
            return Err(unsatisfiable);
        }
        Ok(ByteRange { start, end, total })
    }
}
