//! Comments (`t1`) and comment trees

use super::{timestamp, Thing};
use crate::error::{Error, Result};
use crate::listing::{Context, Fetcher, FromObject, Listing, MoreChildren};
use crate::types::JsonValue;
use crate::wire::{Kind, RawMore, RawObject, RawPage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The fields of a comment, without its replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub score: i64,
    /// Fullname of the parent comment, or of the post for top-level comments
    pub parent_id: String,
    /// Fullname of the post this comment belongs to
    #[serde(default)]
    pub link_id: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub is_submitter: bool,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub distinguished: Option<String>,
    #[serde(rename = "created_utc", with = "timestamp")]
    pub created: DateTime<Utc>,
}

impl CommentData {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.starts_with("t3_")
    }
}

/// A comment and its (lazily fetched) replies
#[derive(Debug)]
pub struct Comment {
    pub data: CommentData,
    pub replies: Listing<Comment>,
}

impl FromObject for Comment {
    const KIND: Kind = Kind::Comment;

    fn from_data(mut data: JsonValue, ctx: &Arc<Context>) -> Result<Self> {
        let replies = data.as_object_mut().and_then(|obj| obj.remove("replies"));
        let data: CommentData = serde_json::from_value(data)
            .map_err(|e| Error::decode(format!("Malformed comment: {e}")))?;

        let replies = match replies {
            Some(value @ JsonValue::Object(_)) => {
                let page: RawPage = RawObject::from_value(value)?.into_data(Kind::Listing)?;
                comment_listing(ctx, page.children)?
            }
            // Reddit sends "" for a comment without replies
            _ => Listing::empty(Arc::clone(ctx)),
        };

        Ok(Self { data, replies })
    }
}

/// Read a listing page of comments, turning a trailing `more` stub into
/// the listing's continuation
pub(crate) fn comment_listing(
    ctx: &Arc<Context>,
    children: Vec<RawObject>,
) -> Result<Listing<Comment>> {
    let mut comments = Vec::with_capacity(children.len());
    let mut more = None;

    for child in children {
        match Thing::from_object(child, ctx)? {
            Thing::Comment(comment) => comments.push(*comment),
            Thing::More(stub) => more = Some(merge_more(more, stub)),
            other => return Err(Error::invalid_kind("t1 or more", other.kind().as_str())),
        }
    }

    Ok(listing_with_more(ctx, comments, more))
}

/// Read the comment tree out of a `comments/{id}` response
///
/// The endpoint answers with `[post listing, comment listing]`.
pub(crate) fn comment_tree_from_response(
    ctx: &Arc<Context>,
    body: JsonValue,
) -> Result<Listing<Comment>> {
    let listing = match body {
        JsonValue::Array(mut parts) if parts.len() >= 2 => parts.swap_remove(1),
        _ => return Err(Error::decode("Expected a [post, comments] response")),
    };

    let page: RawPage = RawObject::from_value(listing)?.into_data(Kind::Listing)?;
    comment_listing(ctx, page.children)
}

/// Rebuild a flat batch of comments into a tree under `root`
///
/// Comments whose parent is in the batch become that parent's replies.
/// Everything else, including comments whose parent is unknown, is placed
/// directly under `root`. Returns the top-level comments and the merged
/// top-level `more` stub, if any.
pub(crate) fn build_tree(
    ctx: &Arc<Context>,
    things: Vec<RawObject>,
    root: &str,
) -> Result<(Vec<Comment>, Option<RawMore>)> {
    let names: HashSet<String> = things
        .iter()
        .filter_map(|thing| thing.data.get("name").and_then(JsonValue::as_str))
        .map(String::from)
        .collect();

    let mut groups: HashMap<String, Vec<RawObject>> = HashMap::new();
    for thing in things {
        let parent = match thing.data.get("parent_id").and_then(JsonValue::as_str) {
            Some(parent) if names.contains(parent) => parent.to_string(),
            _ => root.to_string(),
        };
        groups.entry(parent).or_default().push(thing);
    }

    attach(ctx, &mut groups, root)
}

fn attach(
    ctx: &Arc<Context>,
    groups: &mut HashMap<String, Vec<RawObject>>,
    parent: &str,
) -> Result<(Vec<Comment>, Option<RawMore>)> {
    let mut comments = Vec::new();
    let mut more = None;

    for child in groups.remove(parent).unwrap_or_default() {
        match Thing::from_object(child, ctx)? {
            Thing::Comment(comment) => {
                let mut comment = *comment;
                let (replies, stub) = attach(ctx, groups, &comment.data.name)?;
                if !replies.is_empty() || stub.is_some() {
                    comment.replies = listing_with_more(ctx, replies, stub);
                }
                comments.push(comment);
            }
            Thing::More(stub) => more = Some(merge_more(more, stub)),
            other => return Err(Error::invalid_kind("t1 or more", other.kind().as_str())),
        }
    }

    Ok((comments, more))
}

fn listing_with_more(
    ctx: &Arc<Context>,
    comments: Vec<Comment>,
    more: Option<RawMore>,
) -> Listing<Comment> {
    let fetcher = more.map(|stub| Box::new(MoreChildren::new(stub)) as Box<dyn Fetcher<Comment>>);
    Listing::new(Arc::clone(ctx), comments, fetcher)
}

fn merge_more(acc: Option<RawMore>, stub: RawMore) -> RawMore {
    match acc {
        None => stub,
        Some(mut acc) => {
            acc.count += stub.count;
            acc.children.extend(stub.children);
            acc
        }
    }
}
