//! # Verification Methods
//!
//! A verification method binds public key material to a DID document role,
//! such as authenticating as the DID subject or agreeing on encryption
//! keys.

use ed25519_dalek::VerifyingKey;
use multibase::Base;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Multicodec prefix for an Ed25519 public key.
pub const ED25519_CODEC: [u8; 2] = [0xed, 0x01];

/// Multicodec prefix for an X25519 public key.
pub const X25519_CODEC: [u8; 2] = [0xec, 0x01];

/// Key type for multibase-encoded keys.
pub const MULTIKEY: &str = "Multikey";

/// Number of trailing `publicKeyMultibase` characters used as the method's
/// id fragment.
const ID_FRAGMENT_LENGTH: usize = 8;

/// A public key expressed as a document verification method.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// The controller DID qualified with a fragment derived from the key.
    pub id: String,

    /// Key encoding. Always [`MULTIKEY`] for this method.
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID that controls this key. Defaults to the enclosing document's
    /// DID; may be an external DID for third-party-controlled keys.
    pub controller: String,

    /// Multibase-encoded public key.
    pub public_key_multibase: String,
}

impl VerificationMethod {
    /// Create a new `VerificationMethodBuilder`.
    #[must_use]
    pub fn build() -> VerificationMethodBuilder {
        VerificationMethodBuilder::default()
    }

    /// The id fragment for a multibase-encoded key.
    pub(crate) fn fragment(key: &str) -> String {
        let start = key.len().saturating_sub(ID_FRAGMENT_LENGTH);
        key[start..].to_string()
    }
}

/// The role key material plays in a document.
#[derive(Clone, Copy, Debug, Deserialize, Hash, PartialEq, Serialize, Eq)]
pub enum KeyPurpose {
    /// The document's `authentication` field.
    Authentication,

    /// The document's `assertionMethod` field.
    AssertionMethod,

    /// The document's `keyAgreement` field.
    KeyAgreement,

    /// The document's `capabilityInvocation` field.
    CapabilityInvocation,

    /// The document's `capabilityDelegation` field.
    CapabilityDelegation,
}

/// A builder for creating a verification method.
#[derive(Clone, Debug, Default)]
pub struct VerificationMethodBuilder {
    key: Option<String>,
    purpose: Option<KeyPurpose>,
    controller: Option<String>,
}

impl VerificationMethodBuilder {
    /// The multibase-encoded public key for the method.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The role the key plays in the document.
    #[must_use]
    pub const fn purpose(mut self, purpose: KeyPurpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Controller of the key, where it is not the enclosing document.
    #[must_use]
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Build the verification method for the document identified by `did`.
    ///
    /// # Errors
    ///
    /// Will fail if no key or role has been supplied, or if the key's
    /// multicodec does not match the role (Ed25519 for signing roles,
    /// X25519 for key agreement).
    pub(crate) fn build(self, did: &str) -> Result<(VerificationMethod, KeyPurpose)> {
        let Some(key) = self.key else {
            return Err(Error::InvalidKey("no public key supplied".to_string()));
        };
        let Some(purpose) = self.purpose else {
            return Err(Error::InvalidKey("no role supplied for key".to_string()));
        };

        let codec = match purpose {
            KeyPurpose::KeyAgreement => X25519_CODEC,
            _ => ED25519_CODEC,
        };
        decode_key(&key, &codec)?;

        let controller = self.controller.unwrap_or_else(|| did.to_string());
        let id = format!("{controller}#{}", VerificationMethod::fragment(&key));

        Ok((
            VerificationMethod {
                id,
                type_: MULTIKEY.to_string(),
                controller,
                public_key_multibase: key,
            },
            purpose,
        ))
    }
}

/// Decode a multibase-encoded key, checking its multicodec prefix.
pub(crate) fn decode_key(multikey: &str, codec: &[u8; 2]) -> Result<[u8; 32]> {
    let (base, bytes) =
        multibase::decode(multikey).map_err(|e| Error::InvalidKey(format!("{multikey}: {e}")))?;
    if base != Base::Base58Btc {
        return Err(Error::InvalidKey(format!("{multikey}: not base58btc")));
    }
    if bytes.len() != 34 || bytes[..2] != *codec {
        return Err(Error::InvalidKey(format!("{multikey}: unexpected multicodec")));
    }
    bytes[2..]
        .try_into()
        .map_err(|_| Error::InvalidKey(multikey.to_string()))
}

/// Derive an X25519 key-agreement method from an Ed25519 signing key
/// already encoded for the document identified by `did`.
pub(crate) fn derive_key_agreement(
    did: &str, ed25519_key: &str,
) -> Result<(VerificationMethod, KeyPurpose)> {
    let key_bytes = decode_key(ed25519_key, &ED25519_CODEC)?;
    let verifying = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| Error::InvalidKey(format!("{ed25519_key}: {e}")))?;
    let montgomery = verifying.to_montgomery();

    let mut multi_bytes = X25519_CODEC.to_vec();
    multi_bytes.extend_from_slice(montgomery.as_bytes());
    let multikey = crate::canonical::multibase_encode(&multi_bytes);

    VerificationMethod::build().key(multikey).purpose(KeyPurpose::KeyAgreement).build(did)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multikey(codec: &[u8; 2]) -> String {
        let mut bytes = codec.to_vec();
        bytes.extend_from_slice(&[7u8; 32]);
        crate::canonical::multibase_encode(&bytes)
    }

    #[test]
    fn id_from_controller_and_key() {
        let key = multikey(&ED25519_CODEC);
        let (vm, purpose) = VerificationMethod::build()
            .key(key.clone())
            .purpose(KeyPurpose::Authentication)
            .build("did:tdw:abc")
            .expect("should build");

        assert_eq!(vm.controller, "did:tdw:abc");
        assert_eq!(vm.id, format!("did:tdw:abc#{}", &key[key.len() - 8..]));
        assert_eq!(vm.type_, MULTIKEY);
        assert_eq!(purpose, KeyPurpose::Authentication);
    }

    #[test]
    fn external_controller() {
        let key = multikey(&ED25519_CODEC);
        let (vm, _) = VerificationMethod::build()
            .key(key)
            .purpose(KeyPurpose::AssertionMethod)
            .controller("did:key:z6MkExternal")
            .build("did:tdw:abc")
            .expect("should build");

        assert_eq!(vm.controller, "did:key:z6MkExternal");
        assert!(vm.id.starts_with("did:key:z6MkExternal#"));
    }

    #[test]
    fn codec_must_match_role() {
        let key = multikey(&ED25519_CODEC);
        let err = VerificationMethod::build()
            .key(key)
            .purpose(KeyPurpose::KeyAgreement)
            .build("did:tdw:abc")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
    }
}
