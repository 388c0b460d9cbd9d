//! Transport capability consumed by listings
//!
//! Listings never talk to the network directly. They go through a
//! [`Transport`], which owns authentication, retries and rate limiting.
//! [`crate::http::HttpClient`] is the production implementation; tests plug
//! in scripted ones.

use crate::error::Result;
use crate::types::{JsonValue, Query};
use crate::wire::RawObject;
use async_trait::async_trait;

/// Asynchronous, fallible access to the remote API
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` with `query`, returning the decoded JSON body
    async fn get_json(&self, path: &str, query: &Query) -> Result<JsonValue>;

    /// POST `body` to `path`, returning the decoded JSON body
    async fn post_json(&self, path: &str, body: &JsonValue) -> Result<JsonValue>;

    /// GET an endpoint that answers with a single tagged object
    async fn get(&self, path: &str, query: &Query) -> Result<RawObject> {
        let body = self.get_json(path, query).await?;
        RawObject::from_value(body)
    }

    /// POST to an endpoint that answers with a single tagged object
    async fn post(&self, path: &str, body: &JsonValue) -> Result<RawObject> {
        let body = self.post_json(path, body).await?;
        RawObject::from_value(body)
    }
}
