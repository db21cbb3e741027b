//! Tests for creating a DID and the self-certification of its identifier.

mod utils;

use chrono::{DateTime, Utc};
use did_tdw::{
    CreateBuilder, DocumentBuilder, Error, KeyPurpose, KeyResolver, PROTOCOL, SCID_LENGTH,
    VerificationMethod, resolve_log,
};
use utils::Keyring;

fn two_key_document(auth: &Keyring, assertion: &Keyring) -> DocumentBuilder {
    DocumentBuilder::new()
        .verification_method(
            VerificationMethod::build()
                .key(auth.verifying_multibase())
                .purpose(KeyPurpose::Authentication),
        )
        .verification_method(
            VerificationMethod::build()
                .key(assertion.verifying_multibase())
                .purpose(KeyPurpose::AssertionMethod),
        )
}

// Create a DID bound to a domain with an authentication and an assertion
// key, then check the shape of the identifier and the genesis entry.
#[tokio::test]
async fn create_with_two_keys_and_domain() {
    let auth = Keyring::generate();
    let assertion = Keyring::generate();

    let result = CreateBuilder::new(two_key_document(&auth, &assertion))
        .domain("example.com")
        .signer(&auth)
        .build()
        .await
        .expect("should create");

    assert!(result.did.contains("example.com"));
    assert_eq!(result.did.split(':').count(), 4);

    assert_eq!(result.log.len(), 1);
    let entry = &result.log[0];
    let scid = entry.patch.scid.as_deref().expect("should have scid");
    assert_eq!(scid.len(), SCID_LENGTH);
    assert_eq!(entry.entry_hash, scid);
    assert_eq!(entry.version_id, 1);
    assert_eq!(entry.patch.method.as_deref(), Some(PROTOCOL));

    assert_eq!(result.document.verification_method.as_ref().map(Vec::len), Some(2));
    assert_eq!(result.metadata.version_id, 1);
    assert!(!result.metadata.deactivated);
}

// Resolving a freshly created log must yield the created document.
#[tokio::test]
async fn round_trip() {
    let auth = Keyring::generate();
    let assertion = Keyring::generate();

    let result = CreateBuilder::new(two_key_document(&auth, &assertion))
        .domain("example.com")
        .signer(&auth)
        .build()
        .await
        .expect("should create");

    let resolved = resolve_log(&result.log, None, &KeyResolver).await.expect("should resolve");
    assert_eq!(resolved.did, result.did);
    assert_eq!(resolved.document, result.document);
    assert_eq!(resolved.metadata.version_id, 1);
    assert_eq!(resolved.metadata.created, resolved.metadata.updated);
}

// The identifier depends only on the genesis inputs: identical inputs must
// derive an identical DID.
#[tokio::test]
async fn identifier_is_deterministic() {
    let auth = Keyring::generate();
    let assertion = Keyring::generate();
    let time: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();

    let first = CreateBuilder::new(two_key_document(&auth, &assertion))
        .domain("example.com")
        .version_time(time)
        .signer(&auth)
        .build()
        .await
        .expect("should create");
    let second = CreateBuilder::new(two_key_document(&auth, &assertion))
        .domain("example.com")
        .version_time(time)
        .signer(&auth)
        .build()
        .await
        .expect("should create");

    assert_eq!(first.did, second.did);
}

// A DID without authentication material could never be updated or proven.
#[tokio::test]
async fn create_requires_an_authentication_key() {
    let assertion = Keyring::generate();
    let document = DocumentBuilder::new().verification_method(
        VerificationMethod::build()
            .key(assertion.verifying_multibase())
            .purpose(KeyPurpose::AssertionMethod),
    );

    let err = CreateBuilder::new(document)
        .signer(&assertion)
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

// The signer must hold one of the document's authentication keys.
#[tokio::test]
async fn create_rejects_unauthorized_signer() {
    let auth = Keyring::generate();
    let assertion = Keyring::generate();
    let stranger = Keyring::generate();

    let err = CreateBuilder::new(two_key_document(&auth, &assertion))
        .signer(&stranger)
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnauthorizedKey(_)));
}

// A domainless DID has three segments and still resolves.
#[tokio::test]
async fn create_without_domain() {
    let auth = Keyring::generate();
    let assertion = Keyring::generate();

    let result = CreateBuilder::new(two_key_document(&auth, &assertion))
        .signer(&auth)
        .build()
        .await
        .expect("should create");

    assert_eq!(result.did.split(':').count(), 3);
    resolve_log(&result.log, None, &KeyResolver).await.expect("should resolve");
}
