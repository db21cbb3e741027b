//! Canonical serialization and hashing.
//!
//! Signatures and chain hashes are computed over the JCS (RFC 8785) form of
//! a value, so that semantically equivalent JSON yields byte-identical
//! input to the hash function regardless of serializer.

use anyhow::anyhow;
use multibase::Base;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::Kind;
use crate::document::Document;
use crate::error::Result;
use crate::log::Patch;

/// Number of multibase characters retained from a content hash. The
/// truncated genesis hash doubles as the DID's self-certifying identifier.
pub(crate) const HASH_LENGTH: usize = 24;

/// JCS canonical bytes of any serializable value.
pub(crate) fn canonicalize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json_canonicalizer::to_string(value)
        .map_err(|e| anyhow!("failed to canonicalize: {e}"))?;
    Ok(json.into_bytes())
}

/// JCS canonical bytes of a document, after checking that every context it
/// names resolves from the static registry.
pub(crate) fn canonicalize_document(document: &Document) -> Result<Vec<u8>> {
    for context in &document.context {
        if let Kind::String(url) = context {
            crate::context::ensure_registered(url)?;
        }
    }
    canonicalize(document)
}

/// SHA-256 digest.
pub(crate) fn hash(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Multibase encoding (base58btc, `z` prefix).
pub(crate) fn multibase_encode(data: &[u8]) -> String {
    multibase::encode(Base::Base58Btc, data)
}

/// Entry hash: multibase SHA-256 over the canonical form of the previous
/// entry hash and a patch, truncated to [`HASH_LENGTH`] characters. The
/// genesis entry hashes against the empty string.
pub(crate) fn derive_hash(previous: &str, patch: &Patch) -> Result<String> {
    let digest = hash(&canonicalize(&(previous, patch))?);
    Ok(multibase_encode(&digest).chars().take(HASH_LENGTH).collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_order_is_stable() {
        let a = json!({"b": 1, "a": {"d": true, "c": "x"}});
        let b = json!({"a": {"c": "x", "d": true}, "b": 1});
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
        assert_eq!(
            String::from_utf8(canonicalize(&a).unwrap()).unwrap(),
            r#"{"a":{"c":"x","d":true},"b":1}"#
        );
    }

    #[test]
    fn derived_hash_shape() {
        let hash = derive_hash("", &Patch::default()).unwrap();
        assert_eq!(hash.len(), HASH_LENGTH);
        assert!(hash.starts_with('z'));
        assert_ne!(hash, derive_hash("zPrevious", &Patch::default()).unwrap());
    }
}
