//! Lazy listings module
//!
//! Supports: flat cursor pages, reply-tree continuation stubs
//!
//! # Overview
//!
//! A [`Listing`] holds the items fetched so far and, optionally, a
//! [`Fetcher`] that knows how to obtain the next page. Pages are fetched on
//! demand while traversing, cached in the chain, and never fetched twice.
//!
//! ```text
//! Listing ──next──▶ Listing ──next──▶ Listing (terminal)
//!   items             items             items
//!   fetcher           fetcher           -
//! ```

mod context;
mod fetcher;
mod lazy;
mod more;
mod pager;

pub use context::{Context, RequestDescriptor};
pub use fetcher::{Fetcher, FromObject};
pub use lazy::{Listing, Visit};
pub use more::{MoreChildren, MORE_CHILDREN_CHUNK};
pub use pager::{CursorFetcher, CursorPager, PAGE_LIMIT};

#[cfg(test)]
mod tests;
