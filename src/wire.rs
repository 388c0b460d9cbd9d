//! Wire-level shapes returned by the Reddit API
//!
//! Every object Reddit returns is wrapped as `{ "kind": ..., "data": ... }`.
//! The discriminator decides how `data` is read; a mismatch is always an error.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Kind
// ============================================================================

/// The discriminators this crate knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A page of other objects
    Listing,
    /// A comment (`t1`)
    Comment,
    /// A post, called a "link" by the API (`t3`)
    Post,
    /// A stub naming comment ids that were not sent (`more`)
    More,
}

impl Kind {
    /// Wire tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Listing => "Listing",
            Kind::Comment => "t1",
            Kind::Post => "t3",
            Kind::More => "more",
        }
    }

    /// Prefix an id with this kind's tag (`abc` -> `t3_abc`)
    pub fn fullname(&self, id: &str) -> String {
        let prefix = format!("{}_", self.as_str());
        if id.starts_with(&prefix) {
            id.to_string()
        } else {
            format!("{prefix}{id}")
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Listing" => Ok(Kind::Listing),
            "t1" => Ok(Kind::Comment),
            "t3" => Ok(Kind::Post),
            "more" => Ok(Kind::More),
            other => Err(Error::invalid_kind("one of Listing, t1, t3, more", other)),
        }
    }
}

/// Strip a `tN_` prefix from a fullname, leaving the bare id
pub fn strip_kind(fullname: &str) -> &str {
    match fullname.split_once('_') {
        Some((prefix, id)) if prefix.starts_with('t') && prefix.len() == 2 => id,
        _ => fullname,
    }
}

// ============================================================================
// Raw objects
// ============================================================================

/// A tagged object as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObject {
    /// Discriminator
    pub kind: String,
    /// Payload, interpreted according to `kind`
    #[serde(default)]
    pub data: JsonValue,
}

impl RawObject {
    /// Create a raw object
    pub fn new(kind: impl Into<String>, data: JsonValue) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Read a tagged object out of an arbitrary JSON body
    pub fn from_value(value: JsonValue) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("Expected a tagged object: {e}")))
    }

    /// Fail unless this object carries the expected discriminator
    pub fn assert_kind(&self, expected: Kind) -> Result<()> {
        assert_kind(expected, self)
    }

    /// Check the discriminator, then deserialize the payload
    pub fn into_data<T: DeserializeOwned>(self, expected: Kind) -> Result<T> {
        self.assert_kind(expected)?;
        serde_json::from_value(self.data)
            .map_err(|e| Error::decode(format!("Malformed '{expected}' payload: {e}")))
    }
}

/// Fail with `InvalidKind` unless `obj.kind` equals `expected`
pub fn assert_kind(expected: Kind, obj: &RawObject) -> Result<()> {
    if obj.kind == expected.as_str() {
        Ok(())
    } else {
        Err(Error::invalid_kind(expected.as_str(), obj.kind.clone()))
    }
}

/// Payload of a `Listing` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Cursor for the following page
    #[serde(default)]
    pub after: Option<String>,
    /// Cursor for the preceding page
    #[serde(default)]
    pub before: Option<String>,
    /// Items of this page, in server order
    #[serde(default)]
    pub children: Vec<RawObject>,
    /// Number of children, as reported by the server
    #[serde(default)]
    pub dist: Option<u64>,
    #[serde(default)]
    pub modhash: Option<String>,
}

/// Payload of a `more` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMore {
    /// Total number of comments hidden behind this stub
    #[serde(default)]
    pub count: u64,
    /// Fullname of the stub itself (`t1__` for "continue this thread")
    pub name: String,
    pub id: String,
    /// Fullname of the comment (or post) the hidden ids reply to
    pub parent_id: String,
    #[serde(default)]
    pub depth: u32,
    /// Bare ids of the hidden comments
    #[serde(default)]
    pub children: Vec<String>,
}
