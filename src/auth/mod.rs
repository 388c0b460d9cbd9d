//! Authentication module
//!
//! Supports: Bearer, OAuth2 client credentials (app-only), OAuth2 password (script apps)
//!
//! The `Authenticator` applies auth to outgoing requests and caches the
//! access token for the OAuth2 flows until it is about to expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, DEFAULT_TOKEN_URL};
