//! Unsigned API requests and their query parameters.
//!
//! # Design
//! The remote API has no notion of "leave this field alone" other than
//! omitting the query parameter, while an empty value clears the field. A
//! plain `Option<String>` cannot tell those apart from a deliberate empty
//! string, so every parameter is a `Field`: `Unchanged` is never serialized,
//! `Clear` goes out as `name=`, and `Set` carries the value.

use std::collections::BTreeMap;

use crate::http::HttpMethod;

/// A parameter value with distinct omit and clear states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    /// Not sent. The server keeps its current value.
    #[default]
    Unchanged,
    /// Sent as an empty string. The server clears the field.
    Clear,
    /// Sent with the given value.
    Set(T),
}

impl<T> Field<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Field::Unchanged)
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Unchanged => Field::Unchanged,
            Field::Clear => Field::Clear,
            Field::Set(v) => Field::Set(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Unchanged => Field::Unchanged,
            Field::Clear => Field::Clear,
            Field::Set(v) => Field::Set(f(v)),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    /// `None` means "not supplied".
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Unchanged, Field::Set)
    }
}

/// Query parameters keyed by name. A name appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, Field<String>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: Field<String>) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Field<String>> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Name/value pairs that go on the wire, skipping `Unchanged` entries.
    pub fn wire_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(name, field)| match field {
            Field::Unchanged => None,
            Field::Clear => Some((name.as_str(), "")),
            Field::Set(v) => Some((name.as_str(), v.as_str())),
        })
    }
}

/// A request against a resource path, before credentials are attached.
///
/// `resource` is joined to the base URL as written. `segments` (usually ids)
/// are appended after it one path segment each, percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub resource: String,
    pub segments: Vec<String>,
    pub params: Params,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            segments: Vec::new(),
            params: Params::new(),
        }
    }

    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, resource)
    }

    pub fn post(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, resource)
    }

    pub fn put(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, resource)
    }

    pub fn delete(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, resource)
    }

    /// Append one encoded path segment after `resource`.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    pub fn field(mut self, name: &str, value: Field<String>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Send `name=value`, empty values included.
    pub fn set(self, name: &str, value: impl Into<String>) -> Self {
        self.field(name, Field::Set(value.into()))
    }

    /// Send `name=value` when present, omit the parameter otherwise.
    pub fn optional(self, name: &str, value: Option<&str>) -> Self {
        self.field(name, value.map(str::to_string).into())
    }
}
