//! # DID Syntax
//!
//! Destructure `did:tdw` identifiers into strongly typed components.
//!
//! A DID of this method is of the form
//!
//! `did:tdw:<scid>[:<domain>]`
//!
//! where `<scid>` is the self-certifying identifier derived from the
//! genesis log entry and `<domain>` is an optional DNS name the identifier
//! is bound to.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::canonical::HASH_LENGTH;
use crate::error::Error;

/// Method name segment of the DID.
pub const METHOD: &str = "tdw";

/// Log format version, carried in the genesis patch.
pub const PROTOCOL: &str = "did:tdw:1";

/// Placeholder for the self-certifying identifier while the genesis hash
/// is derived. Deliberately not valid multibase so it can never collide
/// with a derived identifier.
pub const SCID_PLACEHOLDER: &str = "{SCID}";

/// Number of multibase characters in a self-certifying identifier.
pub const SCID_LENGTH: usize = HASH_LENGTH;

/// Structured form of a `did:tdw` identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Did {
    /// Self-certifying identifier: the genesis entry hash.
    pub scid: String,

    /// Optional DNS domain bound to the identifier.
    pub domain: Option<String>,
}

impl Did {
    /// A DID carrying the SCID placeholder, used while the genesis hash is
    /// derived.
    pub(crate) fn placeholder(domain: Option<String>) -> Self {
        Self {
            scid: SCID_PLACEHOLDER.to_string(),
            domain,
        }
    }
}

impl Display for Did {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "did:{METHOD}:{}", self.scid)?;
        if let Some(domain) = &self.domain {
            write!(f, ":{domain}")?;
        }
        Ok(())
    }
}

impl FromStr for Did {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        if parts.next() != Some("did") {
            return Err(Error::InvalidDid(format!("{s}: missing did prefix")));
        }
        if parts.next() != Some(METHOD) {
            return Err(Error::InvalidDid(format!("{s}: unsupported method")));
        }
        let Some(scid) = parts.next() else {
            return Err(Error::InvalidDid(format!("{s}: missing identifier")));
        };
        if scid != SCID_PLACEHOLDER && scid.len() != SCID_LENGTH {
            return Err(Error::InvalidDid(format!(
                "{s}: identifier must be {SCID_LENGTH} characters"
            )));
        }
        let domain = match parts.next() {
            Some("") => return Err(Error::InvalidDid(format!("{s}: empty domain"))),
            Some(domain) => Some(domain.to_string()),
            None => None,
        };

        Ok(Self {
            scid: scid.to_string(),
            domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCID: &str = "zQmWvQxTsqxcxjN3J8b6cFab";

    #[test]
    fn round_trip() {
        let did = Did {
            scid: SCID.to_string(),
            domain: Some("example.com".to_string()),
        };
        let formatted = did.to_string();
        assert_eq!(formatted, format!("did:tdw:{SCID}:example.com"));
        assert_eq!(formatted.parse::<Did>().expect("should parse"), did);
    }

    #[test]
    fn no_domain() {
        let did: Did = format!("did:tdw:{SCID}").parse().expect("should parse");
        assert_eq!(did.scid, SCID);
        assert_eq!(did.domain, None);
    }

    #[test]
    fn rejects_malformed() {
        assert!("did:web:example.com".parse::<Did>().is_err());
        assert!("did:tdw:short".parse::<Did>().is_err());
        assert!(format!("did:tdw:{SCID}:").parse::<Did>().is_err());
        assert!("not-a-did".parse::<Did>().is_err());
    }

    #[test]
    fn placeholder_form() {
        let did = Did::placeholder(Some("example.com".to_string()));
        assert_eq!(did.to_string(), "did:tdw:{SCID}:example.com");
        assert!(did.to_string().parse::<Did>().is_ok());
    }
}
