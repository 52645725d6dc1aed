//! Item stores.
//!
//! [`ItemStore`] is the seam between the key layer and the managed
//! database. [`DynamoStore`] talks to DynamoDB; [`MemoryStore`] keeps the
//! same observable behavior in process.

mod dynamo;
mod memory;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

use crate::{Cursor, Error, Index, Item, KeyCondition, Page, PrimaryKey, Result};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert or replace the item addressed by its `pk`/`sk` attributes.
    async fn put(&self, item: Item) -> Result<()>;

    async fn get(&self, key: &PrimaryKey) -> Result<Option<Item>>;

    /// Remove one item, returning it if it existed.
    async fn delete(&self, key: &PrimaryKey) -> Result<Option<Item>>;

    /// One page of items matching `condition`, resuming after `cursor`.
    async fn query(&self, condition: &KeyCondition, cursor: Option<&Cursor>)
    -> Result<Page<Item>>;
}

/// Table key of an item about to be written.
pub(crate) fn item_key(item: &Item) -> Result<PrimaryKey> {
    let attribute = |name: &str| {
        item.get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::key(format!("item has no string `{name}` attribute")))
    };

    Ok(PrimaryKey {
        pk: attribute(Index::Primary.partition_attribute())?,
        sk: attribute(Index::Primary.sort_attribute())?,
    })
}
