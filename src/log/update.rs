//! Update operation: append a new version to an existing log.
//!
//! The existing log is resolved (and so fully verified) before the new
//! entry is constructed. The new entry's proof is signed with a key the
//! *new* document authorizes, which allows rotating the sole key in one
//! atomic update provided the new key is present in the new document's
//! authentication set.

use chrono::{DateTime, Utc};

use crate::did::Did;
use crate::document::{Document, DocumentBuilder, DocumentMetadata};
use crate::error::{Error, Result};
use crate::log::resolve::resolve_log;
use crate::log::{self, DidLog, NoSigner, WithSigner};
use crate::provider::{KeyResolver, Signer};

/// Output of an `update` operation.
#[derive(Clone, Debug)]
pub struct UpdateResult {
    /// The DID, which may have moved to a new domain.
    pub did: String,

    /// The updated DID document.
    pub document: Document,

    /// Metadata for the new version.
    pub metadata: DocumentMetadata,

    /// The original log appended with the entry describing the update.
    pub log: DidLog,
}

/// Builder does not have a document (can't build).
pub struct NoDocument;

/// Builder has a document (can build).
pub struct WithDocument(DocumentBuilder);

/// Builder to append an update entry to a DID log.
pub struct UpdateBuilder<D, S> {
    log: DidLog,
    domain: Option<String>,
    version_time: Option<DateTime<Utc>>,
    document: D,
    signer: S,
}

impl UpdateBuilder<NoDocument, NoSigner> {
    /// Start an `update` operation on the current log entries.
    #[must_use]
    pub fn from(log: DidLog) -> Self {
        Self {
            log,
            domain: None,
            version_time: None,
            document: NoDocument,
            signer: NoSigner,
        }
    }
}

impl<S> UpdateBuilder<NoDocument, S> {
    /// The new document content, typically a [`DocumentBuilder`]
    /// constructed from the currently resolved document.
    #[must_use]
    pub fn document(self, builder: DocumentBuilder) -> UpdateBuilder<WithDocument, S> {
        UpdateBuilder {
            log: self.log,
            domain: self.domain,
            version_time: self.version_time,
            document: WithDocument(builder),
            signer: self.signer,
        }
    }
}

impl<D, S> UpdateBuilder<D, S> {
    /// Move the DID to a new domain. The identifier's self-certifying
    /// segment is unchanged.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Timestamp for the new entry. Defaults to the wall clock, clamped to
    /// strictly follow the previous entry.
    #[must_use]
    pub fn version_time(mut self, version_time: DateTime<Utc>) -> Self {
        self.version_time = Some(version_time);
        self
    }
}

impl<D> UpdateBuilder<D, NoSigner> {
    /// Add a signer holding a key the new document authorizes for
    /// authentication.
    #[must_use]
    pub fn signer<S: Signer>(self, signer: &S) -> UpdateBuilder<D, WithSigner<'_, S>> {
        UpdateBuilder {
            log: self.log,
            domain: self.domain,
            version_time: self.version_time,
            document: self.document,
            signer: WithSigner(signer),
        }
    }
}

impl<S: Signer> UpdateBuilder<WithDocument, WithSigner<'_, S>> {
    /// Build the update entry and append it to the log.
    ///
    /// # Errors
    ///
    /// Will fail if the existing log does not verify, with
    /// [`Error::InvalidState`] if the DID is deactivated, or with
    /// [`Error::UnauthorizedKey`] if the signer's key is not authorized by
    /// the new document.
    pub async fn build(self) -> Result<UpdateResult> {
        let resolved = resolve_log(&self.log, None, &KeyResolver).await?;
        if resolved.metadata.deactivated {
            return Err(Error::InvalidState("cannot update a deactivated DID".to_string()));
        }

        let previous: Did = resolved.did.parse()?;
        let did = Did {
            scid: previous.scid,
            domain: self.domain.or(previous.domain),
        };
        let document = self.document.0.build(&did.to_string())?;

        // An update that removes all authentication material deactivates
        // the DID; only then is the proof authorized by the prior state.
        let authorized_by =
            if document.is_deactivated() { &resolved.document } else { &document };

        let mut log = self.log;
        let metadata = log::append(
            &mut log,
            resolved.metadata.created,
            &document,
            authorized_by,
            self.version_time,
            self.signer.0,
        )
        .await?;

        tracing::debug!("updated {did} to version {}", metadata.version_id);

        Ok(UpdateResult {
            did: did.to_string(),
            metadata,
            document,
            log,
        })
    }
}
