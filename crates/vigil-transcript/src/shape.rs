// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload shaping by payload level and redaction flags.

use vigil_core::{Compression, Payload, PayloadStorage};
use vigil_security::RedactionPolicy;

use crate::options::{PayloadLevel, TranscriptOptions};
use crate::view::PayloadView;

/// Apply the payload level and redaction policy to a resolved payload.
///
/// Returns `None` only for [`PayloadLevel::None`]. Metadata always survives;
/// the body is kept or stripped.
pub fn shape_payload(
    payload: Payload,
    options: &TranscriptOptions,
    policy: &RedactionPolicy,
) -> Option<PayloadView> {
    if options.payload_level == PayloadLevel::None {
        return None;
    }

    let storage = payload.storage.mode().to_string();
    let (uri, body) = match payload.storage {
        PayloadStorage::Inline { body } => (None, Some(body)),
        PayloadStorage::Object { uri } => (Some(uri), None),
        PayloadStorage::Unsupported { .. } => (None, None),
    };

    let body = body.filter(|body| match options.payload_level {
        PayloadLevel::None | PayloadLevel::Preview => false,
        PayloadLevel::InlineIfSmall => body.len() <= options.payload_inline_max_bytes,
        PayloadLevel::Full => true,
    });

    // The preview is a prefix of the body and is withheld with it.
    let preview = if options.redact_sensitive && payload.redacted {
        None
    } else {
        payload.preview
    };

    let body = if options.redact_sensitive {
        body.and_then(|body| {
            redact_body(&payload.id, payload.redacted, payload.compression, body, policy)
        })
    } else {
        body
    };

    Some(PayloadView {
        id: payload.id,
        kind: payload.kind,
        mime_type: payload.mime_type,
        size_bytes: payload.size_bytes,
        storage,
        uri,
        compression: payload.compression,
        redacted: payload.redacted,
        preview,
        inline_body: body,
    })
}

fn redact_body(
    id: &str,
    redacted: bool,
    compression: Compression,
    body: Vec<u8>,
    policy: &RedactionPolicy,
) -> Option<Vec<u8>> {
    if redacted {
        return None;
    }
    match compression {
        Compression::None => Some(policy.scrub_body(&body)),
        // Cannot scrub without inflating; never hand out an unscrubbed body.
        Compression::Gzip => {
            tracing::debug!(payload_id = id, "stripping compressed body under redaction");
            None
        }
    }
}
