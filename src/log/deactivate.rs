//! Deactivate operation: append a terminal entry whose state carries no
//! verification material.
//!
//! Deactivation is an ordinary update in the log's terms. Resolvers treat
//! a document without authentication keys as terminal, and the update
//! engine refuses to extend such a log.

use chrono::{DateTime, Utc};

use crate::document::{Document, DocumentMetadata};
use crate::error::{Error, Result};
use crate::log::resolve::resolve_log;
use crate::log::{self, DidLog, NoSigner, WithSigner};
use crate::provider::{KeyResolver, Signer};

/// Output of a `deactivate` operation.
#[derive(Clone, Debug)]
pub struct DeactivateResult {
    /// The deactivated DID.
    pub did: String,

    /// The terminal document, stripped of verification material.
    pub document: Document,

    /// Metadata for the terminal version.
    pub metadata: DocumentMetadata,

    /// The original log appended with the terminal entry.
    pub log: DidLog,
}

/// Builder to append a terminal entry to a DID log.
pub struct DeactivateBuilder<S> {
    log: DidLog,
    version_time: Option<DateTime<Utc>>,
    signer: S,
}

impl DeactivateBuilder<NoSigner> {
    /// Start a `deactivate` operation on the current log entries.
    #[must_use]
    pub fn from(log: DidLog) -> Self {
        Self {
            log,
            version_time: None,
            signer: NoSigner,
        }
    }

    /// Timestamp for the terminal entry. Defaults to the wall clock,
    /// clamped to strictly follow the previous entry.
    #[must_use]
    pub fn version_time(mut self, version_time: DateTime<Utc>) -> Self {
        self.version_time = Some(version_time);
        self
    }

    /// Add a signer holding a key the current document authorizes for
    /// authentication.
    #[must_use]
    pub fn signer<S: Signer>(self, signer: &S) -> DeactivateBuilder<WithSigner<'_, S>> {
        DeactivateBuilder {
            log: self.log,
            version_time: self.version_time,
            signer: WithSigner(signer),
        }
    }
}

impl<S: Signer> DeactivateBuilder<WithSigner<'_, S>> {
    /// Build the terminal entry and append it to the log.
    ///
    /// # Errors
    ///
    /// Will fail if the existing log does not verify, or with
    /// [`Error::InvalidState`] if the DID is already deactivated.
    pub async fn build(self) -> Result<DeactivateResult> {
        let resolved = resolve_log(&self.log, None, &KeyResolver).await?;
        if resolved.metadata.deactivated {
            return Err(Error::InvalidState("DID is already deactivated".to_string()));
        }

        let document = Document {
            verification_method: None,
            authentication: None,
            assertion_method: None,
            key_agreement: None,
            capability_invocation: None,
            capability_delegation: None,
            ..resolved.document.clone()
        };

        // The terminal state cannot authorize anything; the proof is
        // authorized by the state being retired.
        let mut log = self.log;
        let metadata = log::append(
            &mut log,
            resolved.metadata.created,
            &document,
            &resolved.document,
            self.version_time,
            self.signer.0,
        )
        .await?;

        tracing::debug!("deactivated {} at version {}", resolved.did, metadata.version_id);

        Ok(DeactivateResult {
            did: resolved.did,
            metadata,
            document,
            log,
        })
    }
}
