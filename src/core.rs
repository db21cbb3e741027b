//! Serde shapes shared across the document model.
//!
//! Several DID document fields are written in two interchangeable wire
//! forms: role arrays hold an embedded verification method or a bare id
//! reference, `@context` holds a URL or an inline definition, and
//! `controller` and `serviceEndpoint` hold one value or a set. These
//! types keep the wire form flexible while the rest of the crate works
//! against a single shape.

use serde::{Deserialize, Serialize};

/// A value written as a bare string or as a full object.
///
/// Role arrays use the string form to reference a method declared in
/// `verificationMethod` and the object form to embed one directly.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// A string reference, such as a method id or a context URL.
    String(String),

    /// An embedded object.
    Object(T),
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> From<&str> for Kind<T> {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A field holding a single value or a set of values.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// A single value.
    One(T),

    /// A set of values.
    Many(Vec<T>),
}

impl<T> Default for OneMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneMany<T> {
    /// Append a value, widening a single value into a set.
    pub fn add(&mut self, value: T) {
        match std::mem::take(self) {
            Self::One(one) => *self = Self::Many(vec![one, value]),
            Self::Many(mut many) => {
                many.push(value);
                *self = Self::Many(many);
            }
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(many) => many.len(),
        }
    }

    /// Whether the field holds no values.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Many(many) if many.is_empty())
    }
}

impl<T: Clone> OneMany<T> {
    /// The values as a vector.
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value.clone()],
            Self::Many(values) => values.clone(),
        }
    }
}

impl<T: PartialEq> OneMany<T> {
    /// Whether the value is present.
    pub fn contains(&self, value: &T) -> bool {
        match self {
            Self::One(one) => one == value,
            Self::Many(many) => many.contains(value),
        }
    }
}
