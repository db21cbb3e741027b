//! # DID Log
//!
//! The append-only log is the authoritative history of a DID. Each entry
//! chains to its predecessor through a content hash, carries a monotone
//! version counter and timestamp, and is proven by a key the controlling
//! document authorizes. The document is only ever a derived view of the
//! log.

pub mod create;
pub mod deactivate;
pub mod resolve;
pub mod update;

use std::fmt;

use anyhow::anyhow;
use chrono::{DateTime, TimeDelta, Utc};
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub(crate) use crate::canonical::derive_hash;
use crate::document::{Document, DocumentMetadata};
use crate::error::{Error, Result};
use crate::proof::{self, Proof};
use crate::provider::Signer;

/// A set of log entries: the full version history of a DID.
pub type DidLog = Vec<LogEntry>;

/// Operation builder state: no signer provided yet (can't build).
pub struct NoSigner;

/// Operation builder state: signer provided (can build).
pub struct WithSigner<'a, S: Signer>(pub(crate) &'a S);

/// One version of a DID, serialized as a positional 5-element array:
///
/// `[entryHash, versionId, versionTime, patch, proof]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Hash chaining this entry to its predecessor. For the genesis entry
    /// this is also the DID's self-certifying identifier.
    pub entry_hash: String,

    /// DID version number starting at 1 and incrementing by one per
    /// version.
    pub version_id: u64,

    /// A UTC timestamp, strictly increasing across entries.
    pub version_time: DateTime<Utc>,

    /// The state change carried by this version.
    pub patch: Patch,

    /// Signed data integrity proof over the state the patch produces.
    pub proof: Proof,
}

impl Serialize for LogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(5)?;
        tuple.serialize_element(&self.entry_hash)?;
        tuple.serialize_element(&self.version_id)?;
        tuple.serialize_element(&self.version_time)?;
        tuple.serialize_element(&self.patch)?;
        tuple.serialize_element(&self.proof)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = LogEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a 5-element log entry array")
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self, mut seq: A,
            ) -> std::result::Result<LogEntry, A::Error> {
                const EXPECTED: &str = "a 5-element log entry array";
                let entry_hash =
                    seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &EXPECTED))?;
                let version_id =
                    seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &EXPECTED))?;
                let version_time =
                    seq.next_element()?.ok_or_else(|| de::Error::invalid_length(2, &EXPECTED))?;
                let patch =
                    seq.next_element()?.ok_or_else(|| de::Error::invalid_length(3, &EXPECTED))?;
                let proof =
                    seq.next_element()?.ok_or_else(|| de::Error::invalid_length(4, &EXPECTED))?;
                if seq.next_element::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::custom("log entry must have exactly 5 elements"));
                }

                Ok(LogEntry {
                    entry_hash,
                    version_id,
                    version_time,
                    patch,
                    proof,
                })
            }
        }

        deserializer.deserialize_seq(EntryVisitor)
    }
}

/// The state change carried by a log entry: the complete document state
/// after applying the entry. The genesis entry additionally pins the log
/// format and the self-certifying identifier.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Patch {
    /// Log format version. Present on the genesis entry only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// The self-certifying identifier. Present on the genesis entry only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scid: Option<String>,

    /// The complete document state after this entry.
    #[serde(flatten)]
    pub state: Document,
}

/// Chain a new state onto the log: hash, stamp, prove, append.
///
/// The entry's proof is signed over `state` with a key `authorized_by`
/// lists for authentication. Returns the metadata for the new version.
pub(crate) async fn append(
    log: &mut DidLog, created: DateTime<Utc>, state: &Document, authorized_by: &Document,
    requested_time: Option<DateTime<Utc>>, signer: &impl Signer,
) -> Result<DocumentMetadata> {
    let Some(last) = log.last() else {
        return Err(Error::InvalidState("log must not be empty".to_string()));
    };

    let patch = Patch {
        method: None,
        scid: None,
        state: state.clone(),
    };
    let entry_hash = derive_hash(&last.entry_hash, &patch)?;
    let version_time = next_version_time(last.version_time, requested_time);
    let version_id = last.version_id + 1;
    let proof = proof::sign(state, authorized_by, version_time, signer).await?;

    log.push(LogEntry {
        entry_hash,
        version_id,
        version_time,
        patch,
        proof,
    });

    Ok(DocumentMetadata {
        created,
        updated: version_time,
        version_id,
        version_time,
        deactivated: state.is_deactivated(),
    })
}

/// The timestamp for a new entry: the requested time, or the wall clock,
/// clamped so it strictly follows the previous entry's timestamp even when
/// the clock regresses.
fn next_version_time(previous: DateTime<Utc>, requested: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let time = requested.unwrap_or_else(Utc::now);
    if time <= previous {
        previous + TimeDelta::milliseconds(1)
    } else {
        time
    }
}

/// Serialize a log in the `did.jsonl` format: one JSON-encoded entry per
/// `\n`-terminated line, no header or trailer.
pub fn to_jsonl(log: &[LogEntry]) -> Result<String> {
    let mut out = String::new();
    for entry in log {
        out.push_str(
            &serde_json::to_string(entry).map_err(|e| anyhow!("failed to serialize entry: {e}"))?,
        );
        out.push('\n');
    }
    Ok(out)
}

/// Parse a log from the `did.jsonl` format.
pub fn from_jsonl(data: &str) -> Result<DidLog> {
    data.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| Error::Other(anyhow!("invalid log entry: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn entry() -> LogEntry {
        LogEntry {
            entry_hash: "zQmWvQxTsqxcxjN3J8b6cFab".to_string(),
            version_id: 1,
            version_time: "2024-06-01T12:00:00Z".parse().unwrap(),
            patch: Patch {
                method: Some(crate::did::PROTOCOL.to_string()),
                scid: Some("zQmWvQxTsqxcxjN3J8b6cFab".to_string()),
                state: Document {
                    id: "did:tdw:zQmWvQxTsqxcxjN3J8b6cFab:example.com".to_string(),
                    ..Document::default()
                },
            },
            proof: Proof {
                type_: "DataIntegrityProof".to_string(),
                cryptosuite: "eddsa-jcs-2022".to_string(),
                ..Proof::default()
            },
        }
    }

    #[test]
    fn entry_is_a_positional_tuple() {
        let serialized = serde_json::to_value(entry()).expect("should serialize");
        let Value::Array(elements) = &serialized else {
            panic!("entry should serialize to an array");
        };
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[0], Value::String("zQmWvQxTsqxcxjN3J8b6cFab".to_string()));
        assert_eq!(elements[1], Value::from(1));
        assert_eq!(elements[3]["method"], Value::String("did:tdw:1".to_string()));

        let round_tripped: LogEntry =
            serde_json::from_value(serialized).expect("should deserialize");
        assert_eq!(round_tripped, entry());
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(serde_json::from_str::<LogEntry>(r#"["hash", 1, "2024-06-01T12:00:00Z"]"#).is_err());
    }

    #[test]
    fn jsonl_round_trip() {
        let log = vec![entry()];
        let jsonl = to_jsonl(&log).expect("should serialize");
        assert!(jsonl.ends_with('\n'));
        assert_eq!(jsonl.lines().count(), 1);
        assert_eq!(from_jsonl(&jsonl).expect("should parse"), log);
    }

    #[test]
    fn hash_is_deterministic() {
        let patch = entry().patch;
        let first = derive_hash("", &patch).expect("should hash");
        let second = derive_hash("", &patch).expect("should hash");
        assert_eq!(first, second);
        assert_eq!(first.len(), crate::did::SCID_LENGTH);
        assert_ne!(first, derive_hash("zPrevious", &patch).expect("should hash"));
    }

    #[test]
    fn clock_regression_is_clamped() {
        let previous: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let earlier: DateTime<Utc> = "2024-06-01T11:00:00Z".parse().unwrap();
        let clamped = next_version_time(previous, Some(earlier));
        assert_eq!(clamped, previous + TimeDelta::milliseconds(1));

        let later: DateTime<Utc> = "2024-06-01T13:00:00Z".parse().unwrap();
        assert_eq!(next_version_time(previous, Some(later)), later);
    }
}
