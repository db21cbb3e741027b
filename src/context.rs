//! Static registry of JSON-LD contexts known to this crate.
//!
//! Canonicalization never performs network I/O. The registry is a
//! process-wide read-only table, initialized on first use and immutable
//! thereafter. A document whose `@context` names a URL outside the table
//! cannot be canonicalized.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Base context present in every DID document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

const REGISTERED: [&str; 8] = [
    DID_CONTEXT,
    "https://w3id.org/security/suites/ed25519-2020/v1",
    "https://w3id.org/security/v1",
    "https://w3id.org/security/v2",
    "https://w3id.org/security/multikey/v1",
    "https://w3id.org/security/data-integrity/v2",
    "https://identity.foundation/linked-vp/contexts/v1",
    "https://didcomm.org/messaging/contexts/v2",
];

static REGISTRY: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| REGISTERED.into_iter().collect());

/// Check a context URL against the static registry.
///
/// # Errors
///
/// Will return [`Error::ContextResolution`] if the URL is not registered.
pub fn ensure_registered(context: &str) -> Result<()> {
    if REGISTRY.contains(context) {
        Ok(())
    } else {
        Err(Error::ContextResolution(context.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered() {
        ensure_registered(DID_CONTEXT).expect("should resolve");
        ensure_registered("https://w3id.org/security/multikey/v1").expect("should resolve");
    }

    #[test]
    fn unregistered() {
        let err = ensure_registered("https://example.com/contexts/v1").unwrap_err();
        assert!(matches!(err, Error::ContextResolution(_)));
    }
}
