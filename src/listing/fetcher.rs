//! Page-fetch strategy and item parsing traits

use super::context::Context;
use super::lazy::Listing;
use crate::error::Result;
use crate::types::JsonValue;
use crate::wire::{Kind, RawObject};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the next page of a listing
///
/// Implementations carry whatever position they need (a cursor, a list of
/// ids) and must not depend on being called in any particular order.
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    /// Fetch the page this strategy points at
    ///
    /// The returned listing carries its own strategy for the page after it,
    /// or none if the server reported the end.
    async fn fetch(&self, ctx: &Arc<Context>) -> Result<Listing<T>>;
}

/// Builds a typed item out of a tagged wire object
pub trait FromObject: Sized + Send + Sync + 'static {
    /// Discriminator this type is read from
    const KIND: Kind;

    /// Build the item from an already kind-checked payload
    fn from_data(data: JsonValue, ctx: &Arc<Context>) -> Result<Self>;

    /// Check the discriminator, then build the item
    fn from_object(obj: RawObject, ctx: &Arc<Context>) -> Result<Self> {
        obj.assert_kind(Self::KIND)?;
        Self::from_data(obj.data, ctx)
    }
}
