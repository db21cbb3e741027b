//! # Data Integrity Proofs
//!
//! Construction and verification of proofs binding an Ed25519 signature to
//! a document. The signed payload is the concatenated SHA-256 hashes of the
//! canonicalized proof options and the canonicalized document, per the
//! `eddsa-jcs-2022` cryptosuite.

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canonical;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::provider::{ControllerResolver, Signer};
use crate::verification::{self, ED25519_CODEC, KeyPurpose};

/// Proof type for data-integrity proofs.
pub const PROOF_TYPE: &str = "DataIntegrityProof";

/// The only cryptosuite supported by this crate.
pub const CRYPTOSUITE: &str = "eddsa-jcs-2022";

const AUTHENTICATION: &str = "authentication";

/// A data-integrity proof embedded in a log entry.
///
/// The `proof_value` field is the signature output; a proof with the field
/// removed is the proof's configuration (options) object used when
/// computing the signed payload.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// An optional identifier for the proof, a UUID as a URN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The specific proof type. Always [`PROOF_TYPE`] for this crate.
    #[serde(rename = "type")]
    pub type_: String,

    /// Identifies the cryptographic suite used to create the proof.
    pub cryptosuite: String,

    /// The date-time the proof was created.
    pub created: DateTime<Utc>,

    /// Id of the verification method used to verify the proof.
    pub verification_method: String,

    /// The reason for the proof. Log entry proofs always authenticate the
    /// controller.
    pub proof_purpose: String,

    /// The multibase-encoded signature. Omitted on a proof configuration
    /// object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

impl Proof {
    /// The proof options: this proof without its signature output.
    fn options(&self) -> Self {
        Self {
            proof_value: None,
            ..self.clone()
        }
    }
}

/// Signing input: hash of the canonical proof options concatenated with the
/// hash of the canonical document.
fn verify_data(options: &Proof, document: &Document) -> Result<Vec<u8>> {
    let options_hash = canonical::hash(&canonical::canonicalize(options)?);
    let document_hash = canonical::hash(&canonical::canonicalize_document(document)?);
    Ok([options_hash.as_slice(), document_hash.as_slice()].concat())
}

/// Construct a proof over `content`, signed with a key that
/// `authorized_by` lists for authentication.
///
/// # Errors
///
/// Will fail with [`Error::UnauthorizedKey`] if the signer's key is not an
/// authentication key of `authorized_by`, or if signing fails.
pub(crate) async fn sign(
    content: &Document, authorized_by: &Document, created: DateTime<Utc>, signer: &impl Signer,
) -> Result<Proof> {
    let key = signer.verifying_key().await.map_err(Error::Other)?;
    let Some(vm) = authorized_by.role_method_by_key(KeyPurpose::Authentication, &key) else {
        return Err(Error::UnauthorizedKey(key));
    };

    let mut proof = Proof {
        id: Some(format!("urn:uuid:{}", Uuid::new_v4())),
        type_: PROOF_TYPE.to_string(),
        cryptosuite: CRYPTOSUITE.to_string(),
        created,
        verification_method: vm.id.clone(),
        proof_purpose: AUTHENTICATION.to_string(),
        proof_value: None,
    };

    let payload = verify_data(&proof, content)?;
    let signature = signer.sign(&payload).await.map_err(Error::Other)?;
    proof.proof_value = Some(canonical::multibase_encode(&signature));
    Ok(proof)
}

/// Verify a proof over `content` against the keys `authorized_by` lists for
/// the proof's purpose.
///
/// The verification method is resolved from `authorized_by` where
/// published, otherwise through the external controller resolver.
pub(crate) async fn verify(
    content: &Document, authorized_by: &Document, proof: &Proof,
    resolver: &impl ControllerResolver,
) -> Result<()> {
    if proof.type_ != PROOF_TYPE {
        return Err(Error::ProofInvalid);
    }
    if proof.cryptosuite != CRYPTOSUITE {
        return Err(Error::CryptosuiteUnsupported(proof.cryptosuite.clone()));
    }
    if proof.proof_purpose != AUTHENTICATION {
        return Err(Error::UnauthorizedKey(proof.proof_purpose.clone()));
    }

    let vm = match authorized_by.verification_method(&proof.verification_method) {
        Some(vm) => vm.clone(),
        None => {
            let did = proof.verification_method.split('#').next().unwrap_or_default();
            let external = resolver.resolve(did).await.map_err(|e| {
                Error::UnknownVerificationMethod(format!("{}: {e}", proof.verification_method))
            })?;
            external
                .verification_method(&proof.verification_method)
                .cloned()
                .ok_or_else(|| {
                    Error::UnknownVerificationMethod(proof.verification_method.clone())
                })?
        }
    };

    if !authorized_by.authorized(KeyPurpose::Authentication, &vm.id) {
        return Err(Error::UnauthorizedKey(vm.id.clone()));
    }

    let Some(value) = &proof.proof_value else {
        return Err(Error::ProofInvalid);
    };
    let (_, signature_bytes) = multibase::decode(value).map_err(|_| Error::ProofInvalid)?;
    let signature = Signature::from_slice(&signature_bytes).map_err(|_| Error::ProofInvalid)?;

    let key_bytes = verification::decode_key(&vm.public_key_multibase, &ED25519_CODEC)?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|_| Error::InvalidKey(vm.public_key_multibase.clone()))?;

    let payload = verify_data(&proof.options(), content)?;
    verifying_key.verify(&payload, &signature).map_err(|_| Error::ProofInvalid)
}
