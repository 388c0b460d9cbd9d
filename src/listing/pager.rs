//! Cursor-based paging
//!
//! Reddit listings are paged by an opaque `after` token. A [`CursorPager`]
//! holds one such token and performs the validated fetch of the page it
//! points at; [`CursorFetcher`] turns that page into typed items and chains
//! a pager for the page after it.

use super::context::{Context, RequestDescriptor};
use super::fetcher::{Fetcher, FromObject};
use super::lazy::Listing;
use crate::error::{Error, Result};
use crate::types::{OptionStringExt, Query};
use crate::wire::{Kind, RawPage};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Page size requested unless the base query overrides it
pub const PAGE_LIMIT: &str = "100";

/// A single `after` cursor
///
/// An empty cursor means "start of the listing". Pagers advanced from one
/// another share the set of cursors already requested along the chain.
#[derive(Debug, Clone, Default)]
pub struct CursorPager {
    after: String,
    requested: Arc<Mutex<HashSet<String>>>,
}

impl CursorPager {
    /// Create a pager resuming after `after`
    pub fn new(after: impl Into<String>) -> Self {
        Self {
            after: after.into(),
            requested: Arc::default(),
        }
    }

    /// Create a pager at the start of the listing
    pub fn start() -> Self {
        Self::default()
    }

    pub fn after(&self) -> &str {
        &self.after
    }

    /// Build the outgoing query: defaults first, then the caller's base query
    pub fn query(&self, req: &RequestDescriptor) -> Query {
        let mut query = Query::new();
        query.insert("limit".to_string(), PAGE_LIMIT.to_string());
        query.insert("after".to_string(), self.after.clone());
        query.extend(req.query.iter().map(|(k, v)| (k.clone(), v.clone())));
        query
    }

    /// Fetch and validate the page this cursor points at
    pub async fn next_page(&self, ctx: &Context) -> Result<RawPage> {
        let req = ctx
            .req()
            .ok_or_else(|| Error::missing_context("request descriptor"))?;
        let query = self.query(req);

        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.after.clone());

        debug!(url = %req.url, after = %self.after, "Fetching listing page");
        let res = ctx.transport().get(&req.url, &query).await?;
        res.into_data(Kind::Listing)
    }

    /// Pager for the page following `page`, or `None` at the end
    ///
    /// A trailing cursor that was already requested in this chain would
    /// loop forever and is treated as the end of the listing.
    pub fn advance(&self, page: &RawPage) -> Option<CursorPager> {
        let next = page.after.clone().none_if_empty()?;
        let repeated = next == self.after
            || self
                .requested
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&next);
        if repeated {
            warn!(after = %next, "Listing cursor repeated, stopping");
            return None;
        }
        Some(Self {
            after: next,
            requested: Arc::clone(&self.requested),
        })
    }
}

/// Fetches flat listing pages of `T`
pub struct CursorFetcher<T> {
    pager: CursorPager,
    _item: PhantomData<fn() -> T>,
}

impl<T> CursorFetcher<T> {
    /// Create a fetcher resuming after `after`
    pub fn new(after: impl Into<String>) -> Self {
        Self::from_pager(CursorPager::new(after))
    }

    /// Create a fetcher at the start of the listing
    pub fn start() -> Self {
        Self::from_pager(CursorPager::start())
    }

    pub fn from_pager(pager: CursorPager) -> Self {
        Self {
            pager,
            _item: PhantomData,
        }
    }

    pub fn pager(&self) -> &CursorPager {
        &self.pager
    }
}

impl<T> fmt::Debug for CursorFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorFetcher")
            .field("after", &self.pager.after)
            .finish()
    }
}

#[async_trait]
impl<T: FromObject> Fetcher<T> for CursorFetcher<T> {
    async fn fetch(&self, ctx: &Arc<Context>) -> Result<Listing<T>> {
        let page = self.pager.next_page(ctx).await?;
        let next = self.pager.advance(&page);

        let items = page
            .children
            .into_iter()
            .map(|child| T::from_object(child, ctx))
            .collect::<Result<Vec<_>>>()?;

        let fetcher = next.map(|pager| Box::new(Self::from_pager(pager)) as Box<dyn Fetcher<T>>);
        Ok(Listing::new(Arc::clone(ctx), items, fetcher))
    }
}
