// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gzip inflation with an output cap.

use std::io::{self, Read};

use flate2::read::GzDecoder;
use vigil_core::Compression;

/// Inflate `body` according to `compression`, refusing output over `limit` bytes.
pub fn decompress(body: Vec<u8>, compression: Compression, limit: u64) -> io::Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(body),
        Compression::Gzip => gunzip(&body, limit),
    }
}

fn gunzip(body: &[u8], limit: u64) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(body)
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)?;
    if out.len() as u64 > limit {
        return Err(io::Error::other(format!(
            "decompressed body exceeds {limit} bytes"
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_test_utils::fixtures::gzip;

    #[test]
    fn plain_body_passes_through() {
        let body = decompress(b"abc".to_vec(), Compression::None, 1).unwrap();
        assert_eq!(body, b"abc");
    }

    #[test]
    fn gzip_body_is_inflated() {
        let body = decompress(gzip(b"0123456789"), Compression::Gzip, 1024).unwrap();
        assert_eq!(body, b"0123456789");
    }

    #[test]
    fn oversized_output_is_refused() {
        let err = decompress(gzip(&[b'x'; 4096]), Compression::Gzip, 100).unwrap_err();
        assert!(err.to_string().contains("exceeds 100 bytes"));
    }

    #[test]
    fn corrupt_gzip_is_an_error() {
        assert!(decompress(b"not gzip".to_vec(), Compression::Gzip, 1024).is_err());
    }
}
