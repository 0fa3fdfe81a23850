//! Request target descriptors.
//!
//! # Design
//! A `Resource<T>` names one endpoint call: the URL, the JSON parameters sent
//! as the body of POST/PUT requests, and the headers copied onto every
//! request. `T` is the shape the response body decodes into; it has no
//! runtime representation. Nothing is validated here: a bad URL surfaces as
//! `RestError::MalformedUrl` when the resource is dispatched.
//!
//! Parameters are ignored for GET. Query strings must be encoded into the URL
//! by the caller.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};

/// Immutable descriptor of a single request target whose response decodes
/// into `T`.
///
/// A resource carries no network state and can be dispatched any number of
/// times, from any number of tasks.
pub struct Resource<T> {
    url_string: String,
    parameters: Map<String, Value>,
    headers: BTreeMap<String, String>,
    response: PhantomData<fn() -> T>,
}

impl<T> Resource<T> {
    pub fn new(
        url_string: impl Into<String>,
        parameters: Map<String, Value>,
        headers: BTreeMap<String, String>,
    ) -> Self {
        Self {
            url_string: url_string.into(),
            parameters,
            headers,
            response: PhantomData,
        }
    }

    /// A resource with no parameters and no headers.
    pub fn from_url(url_string: impl Into<String>) -> Self {
        Self::new(url_string, Map::new(), BTreeMap::new())
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add or replace a body parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn url_string(&self) -> &str {
        &self.url_string
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            url_string: self.url_string.clone(),
            parameters: self.parameters.clone(),
            headers: self.headers.clone(),
            response: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("url_string", &self.url_string)
            .field("parameters", &self.parameters)
            .field("headers", &self.headers)
            .field("response", &std::any::type_name::<T>())
            .finish()
    }
}
