//! # Service
//!
//! Services express ways of communicating with the DID subject or
//! associated entities, from discovery endpoints to encrypted messaging.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Kind, OneMany};
use crate::error::Result;

/// A Service is used to express a way of communicating with the DID subject
/// or associated entities.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// A URI unique to the service.
    pub id: String,

    /// The service type. SHOULD be registered in the DID Specification
    /// Registries.
    #[serde(rename = "type")]
    pub type_: String,

    /// One or more endpoints for the service.
    #[allow(clippy::struct_field_names)]
    pub service_endpoint: OneMany<Kind<Value>>,
}

impl Service {
    /// Create a new `ServiceBuilder` to build a service.
    #[must_use]
    pub fn build() -> ServiceBuilder {
        ServiceBuilder::default()
    }
}

/// Service builder
#[derive(Clone, Debug, Default)]
pub struct ServiceBuilder {
    id: Option<String>,
    service_type: Option<String>,
    endpoint: Option<Vec<Kind<Value>>>,
}

impl ServiceBuilder {
    /// Specify the service ID (fragment portion; qualified with the DID on
    /// build).
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Specify the service type.
    #[must_use]
    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    /// Add a service endpoint.
    ///
    /// Chain to add multiple endpoints.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<Kind<Value>>) -> Self {
        self.endpoint.get_or_insert(vec![]).push(endpoint.into());
        self
    }

    /// Build the service.
    pub(crate) fn build(self, did: &str) -> Result<Service> {
        let Some(id) = self.id else {
            return Err(anyhow!("no service id specified").into());
        };
        let Some(service_type) = self.service_type else {
            return Err(anyhow!("no service type specified").into());
        };
        let Some(endpoint) = self.endpoint else {
            return Err(anyhow!("no service endpoint specified").into());
        };
        let endpoint = if endpoint.len() == 1 {
            OneMany::One(endpoint[0].clone())
        } else {
            OneMany::Many(endpoint)
        };

        Ok(Service {
            id: format!("{did}#{id}"),
            type_: service_type,
            service_endpoint: endpoint,
        })
    }
}
