//! Typed entities read from listings
//!
//! Only the read side is modelled: posts and comments as they appear in
//! listings, plus [`Thing`] for dispatching on a wire discriminator.

mod comment;
mod post;

pub use comment::{Comment, CommentData};
pub use post::Post;

pub(crate) use comment::{build_tree, comment_tree_from_response};

use crate::error::Result;
use crate::listing::{Context, FromObject};
use crate::wire::{Kind, RawMore, RawObject, RawPage};
use std::sync::Arc;

/// Any object this crate can read, selected by its discriminator
#[derive(Debug)]
pub enum Thing {
    Listing(RawPage),
    Comment(Box<Comment>),
    Post(Box<Post>),
    More(RawMore),
}

impl Thing {
    /// Dispatch on `obj.kind`; unknown kinds are an error
    pub fn from_object(obj: RawObject, ctx: &Arc<Context>) -> Result<Self> {
        let thing = match obj.kind.parse::<Kind>()? {
            Kind::Listing => Thing::Listing(obj.into_data(Kind::Listing)?),
            Kind::Comment => Thing::Comment(Box::new(Comment::from_object(obj, ctx)?)),
            Kind::Post => Thing::Post(Box::new(Post::from_object(obj, ctx)?)),
            Kind::More => Thing::More(obj.into_data(Kind::More)?),
        };
        Ok(thing)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Thing::Listing(_) => Kind::Listing,
            Thing::Comment(_) => Kind::Comment,
            Thing::Post(_) => Kind::Post,
            Thing::More(_) => Kind::More,
        }
    }
}

/// Reddit timestamps are float seconds since the epoch
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        let nanos = (secs.fract() * 1e9) as u32;
        DateTime::from_timestamp(secs.trunc() as i64, nanos)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {secs}")))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp())
    }
}
