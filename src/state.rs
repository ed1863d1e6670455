//! Shared request/response state behind the endpoint
//!
//! One lock guards both the last recorded request and the configured response,
//! so readers never see a partially written value.

use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use axum::http::{header, StatusCode};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Canned response served for every request until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: String,
    pub headers: BTreeMap<String, Vec<String>>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl MockResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: String::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Serializes `value` as the body and sets `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(value)?;
        Ok(Self::new(status)
            .with_body(body)
            .with_header(header::CONTENT_TYPE.as_str(), "application/json"))
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Appends a value; repeated calls with the same name produce a
    /// multi-valued header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

#[derive(Debug, Default)]
struct Shared {
    last_request: RecordedRequest,
    response: Arc<MockResponse>,
}

#[derive(Debug, Clone, Default)]
pub struct EndpointState {
    inner: Arc<RwLock<Shared>>,
}

impl EndpointState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, request: RecordedRequest) {
        let mut shared = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        shared.last_request = request;
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.read(|shared| shared.last_request.clone())
    }

    pub fn last_method(&self) -> String {
        self.read(|shared| shared.last_request.method.clone())
    }

    pub fn last_path(&self) -> String {
        self.read(|shared| shared.last_request.path.clone())
    }

    pub fn last_body(&self) -> String {
        self.read(|shared| shared.last_request.body.clone())
    }

    /// Replaces the configured response wholesale. Requests already holding a
    /// snapshot keep serving the old one.
    pub fn set_response(&self, response: MockResponse) {
        let response = Arc::new(response);
        let mut shared = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        shared.response = response;
    }

    pub fn response(&self) -> Arc<MockResponse> {
        self.read(|shared| Arc::clone(&shared.response))
    }

    fn read<T>(&self, f: impl FnOnce(&Shared) -> T) -> T {
        let shared = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&shared)
    }
}
