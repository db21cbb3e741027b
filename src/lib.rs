//! # DID with a Verifiable History
//!
//! The `did:tdw` method binds an identifier (and optionally a DNS domain)
//! to a DID document whose entire history is carried in an append-only,
//! cryptographically chained log. The identifier is self-certifying: its
//! suffix is the hash of the genesis log entry, so the DID itself proves
//! its genesis.
//!
//! Any party holding the log can replay it from genesis, verifying the
//! hash chain and the data-integrity proof on every entry, and reconstruct
//! the current document without trusting the party that served the log.
//!
//! Operations are exposed as builders: [`CreateBuilder`] derives a new DID
//! and its genesis entry, [`UpdateBuilder`] appends a version,
//! [`DeactivateBuilder`] appends a terminal entry, and [`resolve_log`]
//! replays and verifies a log.

mod canonical;
mod context;
mod core;
mod did;
mod document;
mod error;
mod log;
mod proof;
mod provider;
mod service;
mod verification;

pub use self::context::DID_CONTEXT;
pub use self::core::{Kind, OneMany};
pub use self::did::{Did, METHOD, PROTOCOL, SCID_LENGTH, SCID_PLACEHOLDER};
pub use self::document::{Document, DocumentBuilder, DocumentMetadata};
pub use self::error::{Error, Result};
pub use self::log::create::{CreateBuilder, CreateResult};
pub use self::log::deactivate::{DeactivateBuilder, DeactivateResult};
pub use self::log::resolve::{ResolveResult, resolve_log};
pub use self::log::update::{UpdateBuilder, UpdateResult};
pub use self::log::{DidLog, LogEntry, NoSigner, Patch, WithSigner, from_jsonl, to_jsonl};
pub use self::proof::{CRYPTOSUITE, PROOF_TYPE, Proof};
pub use self::provider::{ControllerResolver, KeyResolver, Signer};
pub use self::service::{Service, ServiceBuilder};
pub use self::verification::{
    ED25519_CODEC, KeyPurpose, MULTIKEY, VerificationMethod, VerificationMethodBuilder,
    X25519_CODEC,
};
