//! # DID Document
//!
//! A DID Document is a JSON-LD document that contains information related
//! to a DID. The document is a derived view: it has no persistence of its
//! own, only the log is authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::DID_CONTEXT;
use crate::core::{Kind, OneMany};
use crate::error::Result;
use crate::service::{Service, ServiceBuilder};
use crate::verification::{
    self, KeyPurpose, VerificationMethod, VerificationMethodBuilder,
};

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The context of the DID document.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// The DID for a particular DID subject.
    pub id: String,

    /// DIDs whose verification methods are to be accepted as authoritative
    /// for the subject. Populated with the controllers of any
    /// third-party-controlled verification methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<OneMany<String>>,

    /// A set of URIs that are other identifiers for the subject of this
    /// DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    /// The set of verification methods for the DID subject. A superset of
    /// every method referenced from a relationship field below.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    /// Specifies how the DID subject is authenticated, such as for signing
    /// log entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<Kind<VerificationMethod>>>,

    /// Specifies how the DID subject is expected to express claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<Kind<VerificationMethod>>>,

    /// Specifies how an entity can generate encryption material for
    /// confidential communication with the DID subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<Kind<VerificationMethod>>>,

    /// Specifies a method the DID subject may use to invoke a cryptographic
    /// capability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<Kind<VerificationMethod>>>,

    /// Specifies a method the DID subject may use to delegate a
    /// cryptographic capability to another party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,

    /// A set of services, that express ways of communicating with the DID
    /// subject or related entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,
}

impl Document {
    /// Retrieve a verification method by its ID.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.as_ref()?.iter().find(|vm| vm.id == id)
    }

    /// The relationship entries for a role, if any.
    pub(crate) fn role_methods(
        &self, purpose: KeyPurpose,
    ) -> Option<&Vec<Kind<VerificationMethod>>> {
        match purpose {
            KeyPurpose::Authentication => self.authentication.as_ref(),
            KeyPurpose::AssertionMethod => self.assertion_method.as_ref(),
            KeyPurpose::KeyAgreement => self.key_agreement.as_ref(),
            KeyPurpose::CapabilityInvocation => self.capability_invocation.as_ref(),
            KeyPurpose::CapabilityDelegation => self.capability_delegation.as_ref(),
        }
    }

    /// Whether the method with `vm_id` appears in the relationship entries
    /// for `purpose`, embedded or by reference.
    pub(crate) fn authorized(&self, purpose: KeyPurpose, vm_id: &str) -> bool {
        let Some(entries) = self.role_methods(purpose) else {
            return false;
        };
        entries.iter().any(|entry| match entry {
            Kind::Object(vm) => vm.id == vm_id,
            Kind::String(id) => id == vm_id,
        })
    }

    /// Find the method in the `purpose` relationship holding the given
    /// multibase public key, resolving references through
    /// `verificationMethod`.
    pub(crate) fn role_method_by_key(
        &self, purpose: KeyPurpose, key: &str,
    ) -> Option<&VerificationMethod> {
        let entries = self.role_methods(purpose)?;
        entries.iter().find_map(|entry| match entry {
            Kind::Object(vm) => (vm.public_key_multibase == key).then_some(vm),
            Kind::String(id) => {
                self.verification_method(id).filter(|vm| vm.public_key_multibase == key)
            }
        })
    }

    /// A document with no authentication material is terminal: the DID is
    /// deactivated and its log cannot be extended.
    #[must_use]
    pub fn is_deactivated(&self) -> bool {
        self.authentication.as_ref().is_none_or(Vec::is_empty)
    }

    /// Check every context named by the document against the static
    /// registry.
    ///
    /// # Errors
    ///
    /// Will return [`Error::ContextResolution`] for an unregistered
    /// context URL.
    pub(crate) fn validate_contexts(&self) -> Result<()> {
        for context in &self.context {
            if let Kind::String(url) = context {
                crate::context::ensure_registered(url)?;
            }
        }
        Ok(())
    }
}

/// DID document metadata, emitted alongside a resolved document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Timestamp of the genesis entry.
    pub created: DateTime<Utc>,

    /// Timestamp of the last applied entry.
    pub updated: DateTime<Utc>,

    /// Version number of the resolved document.
    pub version_id: u64,

    /// Timestamp of the resolved version.
    pub version_time: DateTime<Utc>,

    /// Set when the resolved document has no authentication material.
    pub deactivated: bool,
}

/// DID Document builder.
///
/// Assembles a document from verification methods, services, contexts,
/// controllers, and `alsoKnownAs` entries. Use [`DocumentBuilder::from`] to
/// carry an existing document's content forward into a new version.
#[derive(Clone, Debug, Default)]
pub struct DocumentBuilder {
    base: Option<Document>,
    context: Vec<Kind<Value>>,
    controllers: Vec<String>,
    also_known_as: Vec<String>,
    methods: Vec<VerificationMethodBuilder>,
    derived_agreements: Vec<String>,
    services: Vec<ServiceBuilder>,
}

impl DocumentBuilder {
    /// Creates a new, empty `DocumentBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `DocumentBuilder` from an existing `Document`.
    ///
    /// The existing document's content is carried forward. When the build
    /// target DID differs from the document's (a domain move), locally
    /// controlled method ids, references, and service ids are requalified
    /// under the new DID.
    #[must_use]
    pub fn from(document: Document) -> Self {
        Self {
            base: Some(document),
            ..Self::default()
        }
    }

    /// Add a context.
    ///
    /// Chain to add multiple contexts.
    #[must_use]
    pub fn context(mut self, context: impl Into<Kind<Value>>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a controller.
    ///
    /// Chain to add multiple controllers.
    #[must_use]
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controllers.push(controller.into());
        self
    }

    /// Add an also-known-as identifier.
    #[must_use]
    pub fn also_known_as(mut self, aka: impl Into<String>) -> Self {
        self.also_known_as.push(aka.into());
        self
    }

    /// Add a verification method.
    ///
    /// Chain to add multiple verification methods.
    #[must_use]
    pub fn verification_method(mut self, builder: VerificationMethodBuilder) -> Self {
        self.methods.push(builder);
        self
    }

    /// Derive an X25519 key-agreement method from an Ed25519 signing key
    /// already added to the document.
    #[must_use]
    pub fn derive_key_agreement(mut self, ed25519_key: impl Into<String>) -> Self {
        self.derived_agreements.push(ed25519_key.into());
        self
    }

    /// Add a service endpoint.
    ///
    /// Chain to add multiple service endpoints.
    #[must_use]
    pub fn service(mut self, service: ServiceBuilder) -> Self {
        self.services.push(service);
        self
    }

    /// Build the DID Document for the given DID.
    ///
    /// # Errors
    ///
    /// Will fail if a verification method or service is malformed, or if a
    /// named context is not registered.
    pub(crate) fn build(self, did: &str) -> Result<Document> {
        let mut document = match self.base {
            Some(base) => requalify(base, did),
            None => Document {
                context: vec![Kind::String(DID_CONTEXT.to_string())],
                id: did.to_string(),
                ..Document::default()
            },
        };

        for builder in self.methods {
            let (vm, purpose) = builder.build(did)?;
            attach_method(&mut document, vm, purpose);
        }
        for ed25519_key in self.derived_agreements {
            let (vm, purpose) = verification::derive_key_agreement(did, &ed25519_key)?;
            attach_method(&mut document, vm, purpose);
        }

        for builder in self.services {
            let service = builder.build(did)?;
            document.service.get_or_insert(vec![]).push(service);
        }

        for aka in self.also_known_as {
            let entries = document.also_known_as.get_or_insert(vec![]);
            if !entries.contains(&aka) {
                entries.push(aka);
            }
        }

        for controller in self.controllers {
            attach_controller(&mut document, controller);
        }

        for context in self.context {
            if !document.context.contains(&context) {
                document.context.push(context);
            }
        }

        document.validate_contexts()?;
        Ok(document)
    }
}

/// Add a method to `verificationMethod` (deduplicated by id) and to its
/// relationship field. Locally controlled methods are embedded; methods
/// with an external controller are referenced by id and their controller is
/// surfaced on the document.
fn attach_method(document: &mut Document, vm: VerificationMethod, purpose: KeyPurpose) {
    let methods = document.verification_method.get_or_insert(vec![]);
    if !methods.iter().any(|m| m.id == vm.id) {
        methods.push(vm.clone());
    }

    let local = vm.controller == document.id;
    if !local {
        attach_controller(document, vm.controller.clone());
    }

    if document.authorized(purpose, &vm.id) {
        return;
    }
    let entry = if local {
        Kind::Object(vm)
    } else {
        Kind::String(vm.id)
    };
    match purpose {
        KeyPurpose::Authentication => &mut document.authentication,
        KeyPurpose::AssertionMethod => &mut document.assertion_method,
        KeyPurpose::KeyAgreement => &mut document.key_agreement,
        KeyPurpose::CapabilityInvocation => &mut document.capability_invocation,
        KeyPurpose::CapabilityDelegation => &mut document.capability_delegation,
    }
    .get_or_insert(vec![])
    .push(entry);
}

fn attach_controller(document: &mut Document, controller: String) {
    if controller == document.id {
        return;
    }
    match &mut document.controller {
        Some(controllers) => {
            if !controllers.contains(&controller) {
                controllers.add(controller);
            }
        }
        None => document.controller = Some(OneMany::Many(vec![controller])),
    }
}

/// Requalify a document's locally controlled identifiers under a new DID.
/// Methods and services controlled elsewhere are untouched.
fn requalify(mut document: Document, did: &str) -> Document {
    let old_did = document.id.clone();
    if old_did == did {
        return document;
    }

    let swap = |id: &str| -> String {
        id.strip_prefix(old_did.as_str())
            .map_or_else(|| id.to_string(), |rest| format!("{did}{rest}"))
    };
    let swap_vm = |vm: &mut VerificationMethod| {
        if vm.controller == old_did {
            vm.controller = did.to_string();
        }
        vm.id = swap(&vm.id);
    };
    if let Some(methods) = &mut document.verification_method {
        for vm in methods {
            swap_vm(vm);
        }
    }
    for entries in [
        &mut document.authentication,
        &mut document.assertion_method,
        &mut document.key_agreement,
        &mut document.capability_invocation,
        &mut document.capability_delegation,
    ] {
        for entry in entries.iter_mut().flatten() {
            match entry {
                Kind::Object(vm) => swap_vm(vm),
                Kind::String(id) => *id = swap(id),
            }
        }
    }

    if let Some(services) = &mut document.service {
        for service in services {
            service.id = swap(&service.id);
        }
    }
    if let Some(controllers) = &document.controller {
        let remaining: Vec<String> =
            controllers.to_vec().into_iter().filter(|c| *c != old_did && c != did).collect();
        document.controller =
            if remaining.is_empty() { None } else { Some(OneMany::Many(remaining)) };
    }

    document.id = did.to_string();
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::verification::ED25519_CODEC;

    fn multikey(seed: u8) -> String {
        let mut bytes = ED25519_CODEC.to_vec();
        bytes.extend_from_slice(&[seed; 32]);
        crate::canonical::multibase_encode(&bytes)
    }

    #[test]
    fn role_entries_resolve_into_method_set() {
        let local = multikey(1);
        let external = multikey(2);
        let document = DocumentBuilder::new()
            .verification_method(
                VerificationMethod::build().key(local).purpose(KeyPurpose::Authentication),
            )
            .verification_method(
                VerificationMethod::build()
                    .key(external)
                    .purpose(KeyPurpose::AssertionMethod)
                    .controller("did:key:z6MkOther"),
            )
            .build("did:tdw:abc:example.com")
            .expect("should build");

        let methods = document.verification_method.as_ref().expect("should have methods");
        assert_eq!(methods.len(), 2);

        // embedded local method, referenced external method
        let auth = document.authentication.as_ref().expect("should have authentication");
        assert!(matches!(&auth[0], Kind::Object(vm) if vm.controller == document.id));
        let assertion = document.assertion_method.as_ref().expect("should have assertion");
        let Kind::String(reference) = &assertion[0] else {
            panic!("external method should be referenced");
        };
        assert!(document.verification_method(reference).is_some());

        // external controller surfaced on the document
        let controllers = document.controller.as_ref().expect("should have controllers");
        assert!(controllers.contains(&"did:key:z6MkOther".to_string()));
    }

    #[test]
    fn duplicate_methods_collapse() {
        let key = multikey(3);
        let document = DocumentBuilder::new()
            .verification_method(
                VerificationMethod::build().key(key.clone()).purpose(KeyPurpose::Authentication),
            )
            .verification_method(
                VerificationMethod::build().key(key).purpose(KeyPurpose::Authentication),
            )
            .build("did:tdw:abc")
            .expect("should build");

        assert_eq!(document.verification_method.as_ref().map(Vec::len), Some(1));
        assert_eq!(document.authentication.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn requalify_moves_local_identifiers() {
        let key = multikey(4);
        let document = DocumentBuilder::new()
            .verification_method(
                VerificationMethod::build().key(key).purpose(KeyPurpose::Authentication),
            )
            .service(
                Service::build()
                    .id("whois")
                    .service_type("LinkedVerifiablePresentation")
                    .endpoint("https://example.com/whois"),
            )
            .context(Kind::<Value>::String(
                "https://identity.foundation/linked-vp/contexts/v1".to_string(),
            ))
            .build("did:tdw:abc:example.com")
            .expect("should build");

        let moved = DocumentBuilder::from(document)
            .build("did:tdw:abc:migrated.example.com")
            .expect("should rebuild");

        assert_eq!(moved.id, "did:tdw:abc:migrated.example.com");
        let vm = &moved.verification_method.as_ref().expect("methods")[0];
        assert!(vm.id.starts_with("did:tdw:abc:migrated.example.com#"));
        assert_eq!(vm.controller, "did:tdw:abc:migrated.example.com");
        let service = &moved.service.as_ref().expect("services")[0];
        assert_eq!(service.id, "did:tdw:abc:migrated.example.com#whois");
    }

    #[test]
    fn derives_key_agreement_from_signing_key() {
        // a real Ed25519 public key; derivation rejects invalid points
        const SIGNING_KEY: &str = "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";

        let document = DocumentBuilder::new()
            .verification_method(
                VerificationMethod::build().key(SIGNING_KEY).purpose(KeyPurpose::Authentication),
            )
            .derive_key_agreement(SIGNING_KEY)
            .build("did:tdw:abc")
            .expect("should build");

        let agreement = document.key_agreement.as_ref().expect("should have key agreement");
        assert_eq!(agreement.len(), 1);
        let Kind::Object(vm) = &agreement[0] else {
            panic!("derived method should be embedded");
        };
        // X25519 multikeys carry the 0xec01 multicodec prefix
        assert!(vm.public_key_multibase.starts_with("z6LS"));
    }

    #[test]
    fn unknown_context_is_rejected() {
        let err = DocumentBuilder::new()
            .verification_method(
                VerificationMethod::build().key(multikey(5)).purpose(KeyPurpose::Authentication),
            )
            .context(Kind::<Value>::String("https://example.com/unknown/v9".to_string()))
            .build("did:tdw:abc")
            .unwrap_err();
        assert!(matches!(err, Error::ContextResolution(_)));
    }
}
