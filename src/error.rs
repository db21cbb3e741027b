//! Errors surfaced by document building, log operations, and resolution.

use thiserror::Error;

/// Result type for DID log operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building documents, appending log entries, or
/// resolving a log.
///
/// Every error is fatal to the operation that raised it: a failed create,
/// update, or resolve returns no partial state.
#[derive(Error, Debug)]
pub enum Error {
    /// The genesis entry does not hash to the DID's self-certifying
    /// identifier.
    #[error("genesis hash does not match the self-certifying identifier")]
    ScidMismatch,

    /// An entry hash does not recompute from the previous hash and the
    /// entry's patch.
    #[error("entry hash does not match the hash chain")]
    HashMismatch,

    /// Version numbers must start at 1 and increment by one per entry.
    #[error("log entry version is not sequential")]
    VersionGap,

    /// Version times must be strictly increasing across entries.
    #[error("log entry time is not strictly increasing")]
    TimeRegression,

    /// A data-integrity proof failed signature verification.
    #[error("proof is invalid")]
    ProofInvalid,

    /// The signing key is not present in the role set matching the proof
    /// purpose of the target document.
    #[error("key is not authorized: {0}")]
    UnauthorizedKey(String),

    /// The proof's verification method cannot be resolved, either from the
    /// document or from the external controller resolver.
    #[error("verification method cannot be resolved: {0}")]
    UnknownVerificationMethod(String),

    /// The proof declares a cryptosuite this crate does not implement.
    #[error("unsupported cryptosuite: {0}")]
    CryptosuiteUnsupported(String),

    /// A document references a JSON-LD context that is not statically
    /// registered.
    #[error("unknown context: {0}")]
    ContextResolution(String),

    /// The operation is not valid for the log's current state, such as
    /// updating a deactivated DID or creating one without an
    /// authentication key.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A DID string does not conform to this method's syntax.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// Key material is malformed or uses an unexpected multicodec.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// An unclassified failure, typically serialization.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
