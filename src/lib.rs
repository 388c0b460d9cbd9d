// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # redpage
//!
//! Lazy, cursor-paged listings over the Reddit API.
//!
//! A [`Listing`] holds one page of items and knows how to fetch the page
//! after it. Pages are requested only when traversal reaches them, cached
//! once fetched, and traversal can stop at any item or page boundary.
//!
//! ## Features
//!
//! - **Lazy paging**: nothing is fetched until a listing is traversed
//! - **Early exit**: visitors return `false` or `ControlFlow::Break` to stop
//! - **Streams**: `pages()` and `stream()` for async consumers
//! - **Comment trees**: `more` stubs are resolved through `api/morechildren`
//! - **HTTP transport**: OAuth2, retries with backoff and client-side rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use redpage::{Client, ClientConfig, Sort};
//!
//! #[tokio::main]
//! async fn main() -> redpage::Result<()> {
//!     let client = Client::new(&ClientConfig::default().apply_env())?;
//!
//!     let mut seen = 0;
//!     client
//!         .subreddit_posts("rust", Sort::New)
//!         .for_each(|post| {
//!             println!("{}", post.title);
//!             seen += 1;
//!             seen < 250
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Client   subreddit_posts / user_posts / search / comments│
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴─────────┬──────────────────┐
//! │   Listing    │       Fetchers        │     Objects      │
//! ├──────────────┼───────────────────────┼──────────────────┤
//! │ is_empty     │ CursorFetcher (after) │ Post (t3)        │
//! │ for_each     │ MoreChildren (more)   │ Comment (t1)     │
//! │ some/stream  │                       │ Thing dispatch   │
//! └──────────────┴───────────────────────┴──────────────────┘
//!                              │
//!                   Transport (HttpClient)
//!              auth · retry · rate limit · backoff
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tagged wire objects
pub mod wire;

/// Transport trait consumed by listings
pub mod transport;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Lazy paginated listings
pub mod listing;

/// Posts, comments and kind dispatch
pub mod objects;

/// Listing entry points
pub mod client;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::Client;
pub use config::{ClientConfig, Credentials};
pub use error::{Error, Result};
pub use listing::{Context, Fetcher, FromObject, Listing, Visit};
pub use objects::{Comment, CommentData, Post, Thing};
pub use transport::Transport;
pub use types::*;
pub use wire::Kind;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
