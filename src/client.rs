//! Entry points for reading Reddit listings
//!
//! Flat feeds come back as listings that have not fetched anything yet; the
//! first page is requested when the caller starts traversing. Comment trees
//! are not cursor paged, so [`Client::comments`] fetches the tree up front
//! and only the `more` stubs inside it are lazy.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::listing::{Context, CursorFetcher, Listing, RequestDescriptor};
use crate::objects::{comment_tree_from_response, Comment, Post};
use crate::transport::Transport;
use crate::types::{Query, Sort};
use crate::wire::{strip_kind, Kind};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Read-only Reddit client
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Build a client backed by [`HttpClient`]
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::with_auth(config.to_http_config(), config.auth_config())?;
        Ok(Self::with_transport(Arc::new(http)))
    }

    /// Build a client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Posts of a subreddit in the given order
    pub fn subreddit_posts(&self, subreddit: &str, sort: Sort) -> Listing<Post> {
        let mut req = RequestDescriptor::new(format!("r/{subreddit}/{}", sort.as_path()));
        if let Some(range) = sort.time_range() {
            req = req.with_query("t", range.as_str());
        }
        self.cursor_listing(req)
    }

    /// Submissions of a user, newest first
    pub fn user_posts(&self, username: &str) -> Listing<Post> {
        self.cursor_listing(RequestDescriptor::new(format!("user/{username}/submitted")))
    }

    /// Posts of a subreddit matching `query`
    pub fn search(&self, subreddit: &str, query: &str) -> Listing<Post> {
        let req = RequestDescriptor::new(format!("r/{subreddit}/search"))
            .with_query("q", query)
            .with_query("restrict_sr", "on");
        self.cursor_listing(req)
    }

    /// Comment tree of a post
    ///
    /// `post_id` may be bare (`abc`) or a fullname (`t3_abc`).
    pub async fn comments(&self, post_id: &str) -> Result<Listing<Comment>> {
        let id = strip_kind(post_id);
        let ctx = Context::new(Arc::clone(&self.transport))
            .with_post(Kind::Post.fullname(id))
            .shared();

        debug!(post = id, "Fetching comment tree");
        let body = self
            .transport
            .get_json(&format!("comments/{id}"), &Query::new())
            .await?;
        comment_tree_from_response(&ctx, body)
    }

    fn cursor_listing(&self, req: RequestDescriptor) -> Listing<Post> {
        let ctx = Context::new(Arc::clone(&self.transport))
            .with_request(req)
            .shared();
        Listing::with_fetcher(ctx, Vec::new(), CursorFetcher::start())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
