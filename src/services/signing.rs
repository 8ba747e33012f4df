//! Signature generation for outbound verification requests.
//!
//! The Pico platform expects a `sign` field computed over the other request
//! fields with a keyed message-authentication scheme from its integration
//! documentation. That scheme is not available here, so the shipped
//! implementation produces a deterministic placeholder digest and warns on
//! every use. Only the canonicalization below is authoritative.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::warn;

/// Field name excluded from the canonical string.
const SIGNATURE_FIELD: &str = "sign";

/// Pluggable signing strategy for the outbound verification call.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, fields: &BTreeMap<&str, &str>) -> String;
}

/// Canonical request form: fields sorted by name, `sign` itself excluded,
/// joined as `key=value` pairs separated by `&`.
pub fn canonical_string(fields: &BTreeMap<&str, &str>) -> String {
    fields
        .iter()
        .filter(|(key, _)| **key != SIGNATURE_FIELD)
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Stand-in signer: unkeyed SHA-256 over the canonical string.
///
/// NOT the platform's signing scheme. The keyed algorithm must be obtained
/// from the Pico integration documentation before production use; until
/// then every call logs a warning.
pub struct PlaceholderSigner;

impl PlaceholderSigner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaceholderSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner for PlaceholderSigner {
    fn sign(&self, fields: &BTreeMap<&str, &str>) -> String {
        warn!(
            "Signing verification request with placeholder digest; \
             the platform's keyed signing scheme is not implemented"
        );

        let canonical = canonical_string(fields);
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
