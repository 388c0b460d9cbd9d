//! Posts (`t3`)

use super::timestamp;
use crate::error::{Error, Result};
use crate::listing::{Context, FromObject};
use crate::types::JsonValue;
use crate::wire::Kind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Bare id, e.g. `abc123`
    pub id: String,
    /// Fullname, e.g. `t3_abc123`
    pub name: String,
    pub title: String,
    /// `[deleted]` when the account is gone
    #[serde(default)]
    pub author: String,
    pub subreddit: String,

    /// Text body; empty for link posts
    #[serde(rename = "selftext", default)]
    pub body: String,
    #[serde(rename = "selftext_html", default)]
    pub body_html: Option<String>,

    /// Link target, or the post's own URL for self posts
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub score: i64,
    /// Share of upvotes, in `[0, 1]`
    #[serde(default)]
    pub upvote_ratio: f64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub num_crossposts: u64,

    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(rename = "stickied", default)]
    pub pinned: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub contest_mode: bool,

    #[serde(rename = "created_utc", with = "timestamp")]
    pub created: DateTime<Utc>,
}

impl FromObject for Post {
    const KIND: Kind = Kind::Post;

    fn from_data(data: JsonValue, _ctx: &Arc<Context>) -> Result<Self> {
        serde_json::from_value(data).map_err(|e| Error::decode(format!("Malformed post: {e}")))
    }
}
