//! Resolution: replay a log from genesis, verifying every entry, and emit
//! the reconstructed document with its metadata.
//!
//! Resolution is fail-stop: the first invalid entry aborts the operation
//! and no earlier state is returned, so an attacker cannot usefully
//! truncate or splice a log.

use anyhow::anyhow;

use crate::did::{Did, PROTOCOL, SCID_PLACEHOLDER};
use crate::document::{Document, DocumentMetadata};
use crate::error::{Error, Result};
use crate::log::{self, LogEntry, Patch};
use crate::proof;
use crate::provider::ControllerResolver;

/// Output of a `resolve` operation.
#[derive(Clone, Debug)]
pub struct ResolveResult {
    /// The resolved DID.
    pub did: String,

    /// The document at the resolved version.
    pub document: Document,

    /// Resolution metadata.
    pub metadata: DocumentMetadata,
}

/// Verify a DID log and resolve it into a document.
///
/// Entries are replayed from genesis up to `at_version` (defaults to the
/// latest). Each entry must extend the hash chain, increment the version
/// counter, advance the clock, and carry a proof verifiable against the
/// state it produces. External-controller verification methods are
/// resolved through `resolver`.
///
/// # Errors
///
/// Fails with the error kind of the first violated invariant; see
/// [`Error`]. No partial state is returned.
pub async fn resolve_log(
    log: &[LogEntry], at_version: Option<u64>, resolver: &impl ControllerResolver,
) -> Result<ResolveResult> {
    let Some(genesis) = log.first() else {
        return Err(Error::InvalidState("log must not be empty".to_string()));
    };
    if at_version == Some(0) {
        return Err(Error::InvalidState("version numbers start at 1".to_string()));
    }

    // Genesis entry: log format, self-certification, initial proof.
    if genesis.version_id != 1 {
        return Err(Error::VersionGap);
    }
    if genesis.patch.method.as_deref() != Some(PROTOCOL) {
        return Err(Error::InvalidState(format!(
            "unsupported log format: {}",
            genesis.patch.method.as_deref().unwrap_or("none")
        )));
    }
    let Some(scid) = genesis.patch.scid.clone() else {
        return Err(Error::ScidMismatch);
    };
    if genesis.entry_hash != scid {
        return Err(Error::ScidMismatch);
    }

    // Re-derive the identifier from the placeholder form of the patch.
    let serialized = serde_json::to_string(&genesis.patch)
        .map_err(|e| anyhow!("failed to serialize genesis patch: {e}"))?;
    let placeholder: Patch = serde_json::from_str(&serialized.replace(&scid, SCID_PLACEHOLDER))
        .map_err(|e| anyhow!("failed to deserialize genesis patch: {e}"))?;
    if log::derive_hash("", &placeholder)? != scid {
        return Err(Error::ScidMismatch);
    }

    let did: Did = genesis.patch.state.id.parse()?;
    if did.scid != scid {
        return Err(Error::ScidMismatch);
    }

    let mut document = genesis.patch.state.clone();
    document.validate_contexts()?;
    if document.is_deactivated() {
        return Err(Error::InvalidState(
            "genesis document has no authentication key".to_string(),
        ));
    }
    proof::verify(&document, &document, &genesis.proof, resolver).await?;

    let created = genesis.version_time;
    let mut last = genesis;

    for entry in &log[1..] {
        if at_version == Some(last.version_id) {
            break;
        }

        if entry.version_id != last.version_id + 1 {
            return Err(Error::VersionGap);
        }
        if entry.version_time <= last.version_time {
            return Err(Error::TimeRegression);
        }
        if log::derive_hash(&last.entry_hash, &entry.patch)? != entry.entry_hash {
            return Err(Error::HashMismatch);
        }

        let state = entry.patch.state.clone();
        state.validate_contexts()?;
        let state_did: Did = state.id.parse()?;
        if state_did.scid != scid {
            return Err(Error::InvalidDid(format!(
                "self-certifying identifier changed at version {}",
                entry.version_id
            )));
        }

        // A terminal (deactivating) entry is authorized by the state it
        // retires; every other entry by the state it produces.
        let authorized_by = if state.is_deactivated() { &document } else { &state };
        proof::verify(&state, authorized_by, &entry.proof, resolver).await?;

        document = state;
        last = entry;
    }

    if let Some(version) = at_version {
        if last.version_id != version {
            return Err(Error::InvalidState(format!("version {version} not found in log")));
        }
    }

    tracing::debug!("resolved {} at version {}", document.id, last.version_id);

    Ok(ResolveResult {
        did: document.id.clone(),
        metadata: DocumentMetadata {
            created,
            updated: last.version_time,
            version_id: last.version_id,
            version_time: last.version_time,
            deactivated: document.is_deactivated(),
        },
        document,
    })
}
