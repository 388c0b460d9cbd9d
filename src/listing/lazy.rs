//! The lazy listing itself

use super::context::Context;
use super::fetcher::Fetcher;
use crate::error::{Error, Result};
use futures::stream::{self, Stream, TryStreamExt};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Outcome of a traversal visitor
///
/// `()` and `true` keep going; `false` and `ControlFlow::Break` stop the
/// traversal without fetching anything further.
pub trait Visit {
    fn should_continue(self) -> bool;
}

impl Visit for () {
    fn should_continue(self) -> bool {
        true
    }
}

impl Visit for bool {
    fn should_continue(self) -> bool {
        self
    }
}

impl Visit for ControlFlow<()> {
    fn should_continue(self) -> bool {
        self.is_continue()
    }
}

/// A possibly unbounded, lazily fetched sequence of `T`
///
/// Each node holds one page of items. Traversal moves to the next node
/// through a continuation that is fetched at most once and then cached, so
/// walking the same listing twice only hits the network the first time.
///
/// A listing without a fetcher is terminal and never performs I/O.
pub struct Listing<T> {
    ctx: Arc<Context>,
    items: Vec<T>,
    fetcher: Option<Box<dyn Fetcher<T>>>,
    next: OnceCell<Box<Listing<T>>>,
}

impl<T> Listing<T> {
    /// Create a listing node
    pub fn new(ctx: Arc<Context>, items: Vec<T>, fetcher: Option<Box<dyn Fetcher<T>>>) -> Self {
        Self {
            ctx,
            items,
            fetcher,
            next: OnceCell::new(),
        }
    }

    /// Create a node whose following page comes from `fetcher`
    pub fn with_fetcher(ctx: Arc<Context>, items: Vec<T>, fetcher: impl Fetcher<T> + 'static) -> Self {
        Self::new(ctx, items, Some(Box::new(fetcher)))
    }

    /// Create a terminal node holding `items`
    pub fn terminal(ctx: Arc<Context>, items: Vec<T>) -> Self {
        Self::new(ctx, items, None)
    }

    /// Create a terminal node with no items
    pub fn empty(ctx: Arc<Context>) -> Self {
        Self::terminal(ctx, Vec::new())
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Items materialized in this node, excluding any later pages
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Take this node's items, dropping the rest of the chain
    pub fn into_items(mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    /// Whether this listing could issue a request for more items
    ///
    /// `false` guarantees no request will ever be made. `true` only means
    /// there *might* be more items.
    pub fn can_fetch_more(&self) -> bool {
        self.fetcher.is_some()
    }

    /// The following node, if it has already been fetched
    pub fn cached_continuation(&self) -> Option<&Listing<T>> {
        self.next.get().map(AsRef::as_ref)
    }

    /// Whether the listing holds no items
    ///
    /// Answers from memory when possible. Otherwise performs a single
    /// lookahead fetch, which is cached and reused by later traversal.
    pub async fn is_empty(&self) -> Result<bool> {
        if !self.items.is_empty() {
            return Ok(false);
        }

        match self.continuation().await? {
            Some(next) => Ok(next.items.is_empty()),
            None => Ok(true),
        }
    }

    /// The following node, fetching it if needed
    ///
    /// Concurrent callers share one in-flight fetch. A failed fetch leaves
    /// nothing cached, so the next call tries again.
    pub async fn continuation(&self) -> Result<Option<&Listing<T>>> {
        let Some(fetcher) = self.fetcher.as_deref() else {
            return Ok(None);
        };

        let next = self
            .next
            .get_or_try_init(|| async {
                let page = fetcher.fetch(&self.ctx).await?;
                debug!(
                    items = page.items.len(),
                    more = page.can_fetch_more(),
                    "Fetched listing page"
                );
                Ok::<_, Error>(Box::new(page))
            })
            .await?;

        Ok(Some(next.as_ref()))
    }

    /// Call `visit` on each page, in order, until it stops or pages run out
    pub async fn for_each_page<F, R>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&[T]) -> R,
        R: Visit,
    {
        let mut page = self;
        loop {
            if !visit(&page.items).should_continue() {
                return Ok(());
            }
            match page.continuation().await? {
                Some(next) => page = next,
                None => return Ok(()),
            }
        }
    }

    /// Call `visit` on each item, in order, until it stops or items run out
    pub async fn for_each<F, R>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&T) -> R,
        R: Visit,
    {
        self.for_each_page(|page| page.iter().all(|item| visit(item).should_continue()))
            .await
    }

    /// Whether `predicate` holds for any item; stops at the first match
    pub async fn some<F>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        let mut found = false;
        self.for_each(|item| {
            found = predicate(item);
            !found
        })
        .await?;
        Ok(found)
    }

    /// Pages as a stream
    ///
    /// The page after the current one is fetched only once the consumer
    /// polls past it.
    pub fn pages(&self) -> impl Stream<Item = Result<&[T]>> + '_ {
        stream::try_unfold(PageCursor::Start(self), PageCursor::step)
    }

    /// Items as a stream, fetching pages as they are reached
    pub fn stream(&self) -> impl Stream<Item = Result<&T>> + '_ {
        self.pages()
            .map_ok(|page| stream::iter(page.iter().map(Ok::<&T, Error>)))
            .try_flatten()
    }
}

/// Position of a page stream
enum PageCursor<'a, T> {
    /// Nothing yielded yet
    Start(&'a Listing<T>),
    /// This node's items were yielded
    After(&'a Listing<T>),
}

impl<'a, T> PageCursor<'a, T> {
    async fn step(self) -> Result<Option<(&'a [T], PageCursor<'a, T>)>> {
        let page = match self {
            PageCursor::Start(page) => page,
            PageCursor::After(prev) => match prev.continuation().await? {
                Some(next) => next,
                None => return Ok(None),
            },
        };
        Ok(Some((page.items(), PageCursor::After(page))))
    }
}

// Unlink the chain iteratively; the default drop recurses once per page.
impl<T> Drop for Listing<T> {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Listing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listing")
            .field("items", &self.items)
            .field("can_fetch_more", &self.can_fetch_more())
            .field("next", &self.next.get())
            .finish()
    }
}
