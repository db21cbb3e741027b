//! Ephemeral Ed25519 keyring for exercising log operations in tests.
#![allow(dead_code)]

use anyhow::Result;
use ed25519_dalek::{Signer as _, SigningKey};
use multibase::Base;
use rand::rngs::OsRng;

use did_tdw::{ED25519_CODEC, X25519_CODEC};

/// A single-key, in-memory keyring.
pub struct Keyring {
    signing_key: SigningKey,
}

impl Keyring {
    /// Generate a fresh signing key.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// The multibase-encoded Ed25519 verifying key.
    pub fn verifying_multibase(&self) -> String {
        let mut bytes = ED25519_CODEC.to_vec();
        bytes.extend_from_slice(self.signing_key.verifying_key().as_bytes());
        multibase::encode(Base::Base58Btc, bytes)
    }

    /// A multibase-encoded X25519 key derived from the signing key, for
    /// key-agreement methods.
    pub fn agreement_multibase(&self) -> String {
        let montgomery = self.signing_key.verifying_key().to_montgomery();
        let mut bytes = X25519_CODEC.to_vec();
        bytes.extend_from_slice(montgomery.as_bytes());
        multibase::encode(Base::Base58Btc, bytes)
    }
}

impl did_tdw::Signer for Keyring {
    async fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(msg).to_bytes().to_vec())
    }

    async fn verifying_key(&self) -> Result<String> {
        Ok(self.verifying_multibase())
    }
}
