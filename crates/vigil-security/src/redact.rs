// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret masking for payload bodies.
//!
//! Two complementary mechanisms:
//! 1. **Key-based**: values of JSON object keys named in the policy.
//! 2. **Pattern-based**: well-known credential formats in free text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// The redaction placeholder.
pub const REDACTED: &str = "[REDACTED]";

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Anthropic API keys: sk-ant-api03-...
        r"sk-ant-[a-zA-Z0-9_\-]{20,}",
        // OpenAI-style secret keys
        r"sk-[a-zA-Z0-9]{20,}",
        // Bearer tokens in headers
        r"Bearer\s+[a-zA-Z0-9._\-]{10,}",
        // AWS access key ids
        r"AKIA[0-9A-Z]{16}",
    ]
    .iter()
    .filter_map(|p| match Regex::new(p) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern = p, error = %e, "invalid redaction pattern");
            None
        }
    })
    .collect()
});

/// Mask well-known credential formats in free text.
pub fn redact_text(input: &str) -> String {
    SECRET_PATTERNS
        .iter()
        .fold(input.to_string(), |acc, re| {
            re.replace_all(&acc, REDACTED).into_owned()
        })
}

/// Which JSON keys carry values that must never be shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionPolicy {
    keys: Vec<String>,
}

impl RedactionPolicy {
    /// Build a policy; keys match case-insensitively.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keys.sort();
        keys.dedup();
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_sensitive_key(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.keys.iter().any(|k| *k == key)
    }

    /// Mask sensitive key values at any depth. Returns true if anything changed.
    pub fn scrub_json(&self, value: &mut Value) -> bool {
        match value {
            Value::Object(map) => {
                let mut changed = false;
                for (key, child) in map.iter_mut() {
                    if self.is_sensitive_key(key) {
                        if *child != Value::String(REDACTED.to_string()) {
                            *child = Value::String(REDACTED.to_string());
                            changed = true;
                        }
                    } else {
                        changed |= self.scrub_json(child);
                    }
                }
                changed
            }
            Value::Array(items) => items
                .iter_mut()
                .fold(false, |changed, item| self.scrub_json(item) | changed),
            Value::String(s) => {
                let masked = redact_text(s);
                if masked != *s {
                    *s = masked;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Scrub a stored body.
    ///
    /// JSON bodies are masked by key and pattern; other UTF-8 text by pattern
    /// only. Binary bodies are returned untouched.
    pub fn scrub_body(&self, body: &[u8]) -> Vec<u8> {
        if let Ok(mut value) = serde_json::from_slice::<Value>(body) {
            if !self.scrub_json(&mut value) {
                return body.to_vec();
            }
            return match serde_json::to_vec(&value) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "re-serializing scrubbed body failed");
                    Vec::new()
                }
            };
        }
        match std::str::from_utf8(body) {
            Ok(text) => redact_text(text).into_bytes(),
            Err(_) => body.to_vec(),
        }
    }
}
