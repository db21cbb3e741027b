//! # Provider Traits
//!
//! Capabilities supplied by the caller: signing with a private key and
//! resolving documents for keys controlled outside the log being
//! processed.

use std::future::Future;

use anyhow::{Result, bail};

use crate::context::DID_CONTEXT;
use crate::core::Kind;
use crate::document::Document;
use crate::verification::{MULTIKEY, VerificationMethod};

/// A signer holds the private counterpart of a document verification
/// method and produces raw Ed25519 signatures.
pub trait Signer: Send + Sync {
    /// Sign the message, returning the raw signature bytes.
    fn sign(&self, msg: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// The signer's multibase-encoded Ed25519 verifying key.
    fn verifying_key(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Resolver for documents of externally controlled verification methods.
///
/// The only suspension point in the crate: implementations may perform I/O
/// to fetch a controller's document. The default [`KeyResolver`] does not.
pub trait ControllerResolver: Send + Sync {
    /// Resolve a controller DID to its document.
    fn resolve(&self, did: &str) -> impl Future<Output = Result<Document>> + Send;
}

/// Default controller resolver.
///
/// Derives `did:key` documents from the key embedded in the identifier,
/// with no I/O, and rejects every other method. Applications needing richer
/// resolution inject their own [`ControllerResolver`].
#[derive(Clone, Debug, Default)]
pub struct KeyResolver;

impl ControllerResolver for KeyResolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        let Some(id) = did.strip_prefix("did:key:") else {
            bail!("cannot resolve controller document for {did}");
        };
        // For did:key the method-specific id is the key, already multibase
        // encoded.
        let key = id.split('#').next().unwrap_or(id);
        if key.is_empty() {
            bail!("did:key has no key material: {did}");
        }

        let controller = format!("did:key:{key}");
        let vm = VerificationMethod {
            id: format!("{controller}#{key}"),
            type_: MULTIKEY.to_string(),
            controller: controller.clone(),
            public_key_multibase: key.to_string(),
        };

        Ok(Document {
            context: vec![
                Kind::String(DID_CONTEXT.to_string()),
                Kind::String("https://w3id.org/security/multikey/v1".to_string()),
            ],
            id: controller,
            authentication: Some(vec![Kind::String(vm.id.clone())]),
            verification_method: Some(vec![vm]),
            ..Document::default()
        })
    }
}
