//! Reply-tree continuation
//!
//! Comment trees are not cursor paged. Instead Reddit cuts them off with
//! `more` stubs listing the ids it did not send, which are then resolved
//! through `api/morechildren` in batches.

use super::context::Context;
use super::fetcher::Fetcher;
use super::lazy::Listing;
use crate::error::{Error, Result};
use crate::objects::{build_tree, comment_tree_from_response, Comment};
use crate::types::{JsonValue, Query};
use crate::wire::{strip_kind, RawMore, RawObject};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Most ids `api/morechildren` accepts per request
pub const MORE_CHILDREN_CHUNK: usize = 100;

/// Fetches the comments hidden behind a `more` stub
#[derive(Debug, Clone)]
pub struct MoreChildren {
    more: RawMore,
}

impl MoreChildren {
    pub fn new(more: RawMore) -> Self {
        Self { more }
    }

    pub fn stub(&self) -> &RawMore {
        &self.more
    }

    /// "Continue this thread" stubs carry no ids; the subtree has to be
    /// loaded from the comment's own page instead.
    pub fn is_thread_continuation(&self) -> bool {
        self.more.children.is_empty()
    }

    /// Load the replies of the stub's parent from its permalink page
    async fn fetch_thread(&self, ctx: &Arc<Context>) -> Result<Listing<Comment>> {
        let post = ctx
            .post()
            .ok_or_else(|| Error::missing_context("origin post"))?;
        let parent = strip_kind(&self.more.parent_id);

        let mut query = Query::new();
        query.insert("comment".to_string(), parent.to_string());

        debug!(post, parent, "Fetching continued comment thread");
        let body = ctx
            .transport()
            .get_json(&format!("comments/{}", strip_kind(post)), &query)
            .await?;

        let tree = comment_tree_from_response(ctx, body)?;
        match tree.into_items().into_iter().next() {
            Some(comment) => Ok(comment.replies),
            None => Ok(Listing::empty(Arc::clone(ctx))),
        }
    }

    /// Resolve the next batch of hidden ids
    async fn fetch_children(&self, ctx: &Arc<Context>) -> Result<Listing<Comment>> {
        let post = ctx
            .post()
            .ok_or_else(|| Error::missing_context("origin post"))?;

        let split = self.more.children.len().min(MORE_CHILDREN_CHUNK);
        let (batch, rest) = self.more.children.split_at(split);

        let mut query = Query::new();
        query.insert("api_type".to_string(), "json".to_string());
        query.insert("link_id".to_string(), post.to_string());
        query.insert("children".to_string(), batch.join(","));
        query.insert("limit_children".to_string(), "false".to_string());

        debug!(
            post,
            parent = %self.more.parent_id,
            batch = batch.len(),
            remaining = rest.len(),
            "Fetching more children"
        );
        let body = ctx.transport().get_json("api/morechildren", &query).await?;
        let things = extract_things(body)?;

        let (comments, more) = build_tree(ctx, things, &self.more.parent_id)?;

        let mut remaining = rest.to_vec();
        if let Some(more) = more {
            remaining.extend(more.children);
        }

        let fetcher = if remaining.is_empty() {
            None
        } else {
            let stub = RawMore {
                count: remaining.len() as u64,
                children: remaining,
                ..self.more.clone()
            };
            Some(Box::new(MoreChildren::new(stub)) as Box<dyn Fetcher<Comment>>)
        };

        Ok(Listing::new(Arc::clone(ctx), comments, fetcher))
    }
}

#[async_trait]
impl Fetcher<Comment> for MoreChildren {
    async fn fetch(&self, ctx: &Arc<Context>) -> Result<Listing<Comment>> {
        if self.is_thread_continuation() {
            self.fetch_thread(ctx).await
        } else {
            self.fetch_children(ctx).await
        }
    }
}

/// Pull `json.data.things` out of a `morechildren` response
fn extract_things(mut body: JsonValue) -> Result<Vec<RawObject>> {
    if let Some(errors) = body.pointer("/json/errors").and_then(JsonValue::as_array) {
        if !errors.is_empty() {
            return Err(Error::decode(format!(
                "morechildren returned errors: {}",
                JsonValue::Array(errors.clone())
            )));
        }
    }

    let things = body
        .pointer_mut("/json/data/things")
        .map(JsonValue::take)
        .ok_or_else(|| Error::decode("morechildren response has no 'json.data.things'"))?;

    serde_json::from_value(things).map_err(|e| Error::decode(format!("Malformed things: {e}")))
}
