//! Request context shared by every node of a listing chain

use crate::transport::Transport;
use crate::types::Query;
use std::fmt;
use std::sync::Arc;

/// How to re-issue the paginated request behind a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Endpoint path, relative to the transport's base URL
    pub url: String,
    /// Base query parameters; these win over the pager's defaults
    pub query: Query,
}

impl RequestDescriptor {
    /// Create a descriptor for an endpoint with no base query
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Query::new(),
        }
    }

    /// Add a base query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// Immutable bundle handed to every fetch
///
/// Built once per listing and shared as `Arc<Context>` by all of its pages.
#[derive(Clone)]
pub struct Context {
    transport: Arc<dyn Transport>,
    post: Option<String>,
    req: Option<RequestDescriptor>,
}

impl Context {
    /// Create a context with only a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            post: None,
            req: None,
        }
    }

    /// Attach the request a cursor pager should re-issue
    #[must_use]
    pub fn with_request(mut self, req: RequestDescriptor) -> Self {
        self.req = Some(req);
        self
    }

    /// Attach the fullname of the post a comment tree belongs to
    #[must_use]
    pub fn with_post(mut self, post: impl Into<String>) -> Self {
        self.post = Some(post.into());
        self
    }

    /// Wrap in an `Arc` for sharing across a listing chain
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn post(&self) -> Option<&str> {
        self.post.as_deref()
    }

    pub fn req(&self) -> Option<&RequestDescriptor> {
        self.req.as_ref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("post", &self.post)
            .field("req", &self.req)
            .finish_non_exhaustive()
    }
}
