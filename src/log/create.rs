//! Create operation: derive a self-certifying DID and its genesis log
//! entry.
//!
//! The DID depends on the genesis entry hash, which in turn covers the
//! document that contains the DID. The cycle is broken by hashing a
//! placeholder form of the patch and substituting the derived identifier
//! afterwards.

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use crate::did::{Did, PROTOCOL, SCID_PLACEHOLDER};
use crate::document::{Document, DocumentBuilder, DocumentMetadata};
use crate::error::{Error, Result};
use crate::log::{self, DidLog, LogEntry, NoSigner, Patch, WithSigner};
use crate::proof;
use crate::provider::Signer;

/// Output of a `create` operation.
#[derive(Clone, Debug)]
pub struct CreateResult {
    /// The new DID.
    pub did: String,

    /// The genesis DID document.
    pub document: Document,

    /// Metadata for the genesis version.
    pub metadata: DocumentMetadata,

    /// The log, containing the single genesis entry.
    pub log: DidLog,
}

/// Builder of a genesis log entry and the DID it certifies.
pub struct CreateBuilder<S> {
    document: DocumentBuilder,
    domain: Option<String>,
    version_time: Option<DateTime<Utc>>,
    signer: S,
}

impl CreateBuilder<NoSigner> {
    /// Start a new `create` operation from a populated
    /// [`DocumentBuilder`].
    #[must_use]
    pub fn new(document: DocumentBuilder) -> Self {
        Self {
            document,
            domain: None,
            version_time: None,
            signer: NoSigner,
        }
    }

    /// Bind the DID to a DNS domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Timestamp for the genesis entry. Defaults to the wall clock.
    #[must_use]
    pub fn version_time(mut self, version_time: DateTime<Utc>) -> Self {
        self.version_time = Some(version_time);
        self
    }

    /// Add a signer holding one of the document's authentication keys.
    #[must_use]
    pub fn signer<S: Signer>(self, signer: &S) -> CreateBuilder<WithSigner<'_, S>> {
        CreateBuilder {
            document: self.document,
            domain: self.domain,
            version_time: self.version_time,
            signer: WithSigner(signer),
        }
    }
}

impl<S: Signer> CreateBuilder<WithSigner<'_, S>> {
    /// Build the genesis log entry and derive the DID.
    ///
    /// # Errors
    ///
    /// Will fail with [`Error::InvalidState`] if the document has no
    /// authentication key, with [`Error::UnauthorizedKey`] if the signer's
    /// key is not one of them, or if hashing or signing fails.
    pub async fn build(self) -> Result<CreateResult> {
        let placeholder_did = Did::placeholder(self.domain.clone()).to_string();
        let document = self.document.build(&placeholder_did)?;
        if document.is_deactivated() {
            return Err(Error::InvalidState(
                "an authentication key is required to create a DID".to_string(),
            ));
        }

        let patch = Patch {
            method: Some(PROTOCOL.to_string()),
            scid: Some(SCID_PLACEHOLDER.to_string()),
            state: document,
        };

        // The self-certifying identifier is the hash of the placeholder
        // form, chained from the empty string.
        let scid = log::derive_hash("", &patch)?;

        let serialized = serde_json::to_string(&patch)
            .map_err(|e| anyhow!("failed to serialize genesis patch: {e}"))?;
        let patch: Patch = serde_json::from_str(&serialized.replace(SCID_PLACEHOLDER, &scid))
            .map_err(|e| anyhow!("failed to deserialize genesis patch: {e}"))?;

        let version_time = self.version_time.unwrap_or_else(Utc::now);
        let state = patch.state.clone();
        let proof = proof::sign(&state, &state, version_time, self.signer.0).await?;

        let entry = LogEntry {
            entry_hash: scid,
            version_id: 1,
            version_time,
            patch,
            proof,
        };

        tracing::debug!("created {}", state.id);

        Ok(CreateResult {
            did: state.id.clone(),
            metadata: DocumentMetadata {
                created: version_time,
                updated: version_time,
                version_id: 1,
                version_time,
                deactivated: false,
            },
            document: state,
            log: vec![entry],
        })
    }
}
