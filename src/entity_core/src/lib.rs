//! Single-table key layer.
//!
//! Entities derive their partition, sort and secondary-index attributes
//! from their own fields (see `entity_macros::Entity`). Reads go through
//! named [`AccessPattern`]s, each answered by one index query, and are
//! paginated with an opaque [`Cursor`].

mod access;
mod cursor;
mod error;
pub mod key;
mod ksuid;
mod repository;
mod schema;
pub mod store;

pub use access::{
    AccessPattern, Index, KeyCondition, KeyTemplate, ScanOrder, SegmentTemplate, SortCondition,
    SortPredicate,
};
pub use cursor::{Cursor, Page};
pub use error::{Error, Result};
pub use key::{Case, KEY_DELIMITER, PrimaryKey};
pub use ksuid::Ksuid;
pub use repository::{CreateBuilder, QueryBuilder, Repository, UpdateBuilder};
pub use schema::{AttributeValue, CompositeAttributeValue, KeyDef, Schema, Segment};
pub use store::ItemStore;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// One stored item: attribute name to value.
pub type Item = serde_json::Map<String, Value>;

//
// ─── ENTITY TRAIT ───────────────────────────────────────────────────────────────
//
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn schema() -> Schema;

    fn primary_key(&self) -> PrimaryKey;

    /// Partition and sort key plus every derived non-key attribute
    /// (secondary-index projections). Sparse attributes are left out.
    fn key_attributes(&self) -> Item;

    fn to_item(&self) -> Result<Item> {
        let Value::Object(mut item) = serde_json::to_value(self)? else {
            return Err(Error::serialization(format!(
                "{} does not serialize to a map",
                Self::schema().entity_name
            )));
        };
        item.extend(self.key_attributes());

        Ok(item)
    }

    fn from_item(item: Item) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(item))?)
    }
}
