//! Snapshot of the four request input bags a check can read from.

use serde_json::{Map, Value};

use super::rules::InputSource;

/// Header names are stored lower-cased; lookups through [`RequestInputs::get`]
/// lower-case the key for the header bag, matching HTTP semantics.
#[derive(Debug, Clone, Default)]
pub struct RequestInputs {
    headers: Map<String, Value>,
    body: Map<String, Value>,
    query: Map<String, Value>,
    path: Map<String, Value>,
}

impl RequestInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .insert(name.to_ascii_lowercase(), Value::String(value.into()));
    }

    /// Use a JSON body. Non-object bodies leave the body bag empty.
    pub fn with_body(mut self, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.body = map;
        }
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), Value::String(value.into()));
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), Value::String(value.into()));
        self
    }

    pub fn bag(&self, source: InputSource) -> &Map<String, Value> {
        match source {
            InputSource::Header => &self.headers,
            InputSource::Body => &self.body,
            InputSource::Query => &self.query,
            InputSource::Path => &self.path,
        }
    }

    pub fn get(&self, source: InputSource, key: &str) -> Option<&Value> {
        match source {
            InputSource::Header => self.headers.get(&key.to_ascii_lowercase()),
            _ => self.bag(source).get(key),
        }
    }
}
