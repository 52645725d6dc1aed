use super::{ItemStore, item_key};
use crate::{Cursor, Error, Index, Item, KeyCondition, Page, PrimaryKey, Result, ScanOrder};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::{cmp::Ordering, collections::BTreeMap};

///
/// MemoryStore
///
/// In-process table with DynamoDB query semantics: items are ordered by
/// the queried index's sort attribute (byte order), items missing an
/// index attribute are absent from that index, and the cursor is the last
/// returned item's table key plus its index key.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<PrimaryKey, Item>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

/// Position of an item in an index: sort value, then table key as a
/// deterministic tie-break.
type Position<'a> = (&'a str, &'a str, &'a str);

fn cursor_position<'a>(cursor: &'a Cursor, index: Index) -> Result<Position<'a>> {
    let sort = cursor
        .attribute(index.sort_attribute())
        .ok_or(Error::InvalidCursor)?;
    let pk = cursor
        .attribute(Index::Primary.partition_attribute())
        .ok_or(Error::InvalidCursor)?;
    let sk = cursor
        .attribute(Index::Primary.sort_attribute())
        .ok_or(Error::InvalidCursor)?;

    Ok((sort, pk, sk))
}

fn cursor_for(index: Index, item: &Item) -> Option<Cursor> {
    let mut key = Item::new();
    for attribute in [
        Index::Primary.partition_attribute(),
        Index::Primary.sort_attribute(),
        index.partition_attribute(),
        index.sort_attribute(),
    ] {
        if let Some(value) = item.get(attribute) {
            key.insert(attribute.to_owned(), value.clone());
        }
    }

    Cursor::from_key(key)
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn put(&self, item: Item) -> Result<()> {
        let key = item_key(&item)?;
        self.items.write().insert(key, item);

        Ok(())
    }

    async fn get(&self, key: &PrimaryKey) -> Result<Option<Item>> {
        Ok(self.items.read().get(key).cloned())
    }

    async fn delete(&self, key: &PrimaryKey) -> Result<Option<Item>> {
        Ok(self.items.write().remove(key))
    }

    async fn query(
        &self,
        condition: &KeyCondition,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Item>> {
        let index = condition.index;
        let partition_attribute = index.partition_attribute();
        let sort_attribute = index.sort_attribute();
        let items = self.items.read();

        let mut matches: Vec<(Position<'_>, &Item)> = items
            .iter()
            .filter_map(|(key, item)| {
                let partition = item.get(partition_attribute).and_then(Value::as_str)?;
                let sort = item.get(sort_attribute).and_then(Value::as_str)?;
                if partition != condition.partition {
                    return None;
                }
                if let Some(predicate) = &condition.sort
                    && !predicate.matches(sort)
                {
                    return None;
                }

                Some(((sort, key.pk.as_str(), key.sk.as_str()), item))
            })
            .collect();

        matches.sort_by(|a, b| a.0.cmp(&b.0));
        if condition.order == ScanOrder::Reverse {
            matches.reverse();
        }

        let start = match cursor {
            None => 0,
            Some(cursor) => {
                let after = cursor_position(cursor, index)?;
                let past = match condition.order {
                    ScanOrder::Forward => Ordering::Greater,
                    ScanOrder::Reverse => Ordering::Less,
                };
                matches
                    .iter()
                    .position(|(position, _)| position.cmp(&after) == past)
                    .unwrap_or(matches.len())
            }
        };

        let limit = usize::from(condition.limit.max(1));
        let end = (start + limit).min(matches.len());
        let page: Vec<Item> = matches[start..end]
            .iter()
            .map(|(_, item)| (*item).clone())
            .collect();

        let cursor = if end < matches.len() {
            page.last().and_then(|item| cursor_for(index, item))
        } else {
            None
        };

        Ok(Page {
            items: page,
            cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SortPredicate, store::ItemStore};
    use serde_json::json;

    fn item(value: Value) -> Item {
        let Value::Object(map) = value else {
            unreachable!()
        };
        map
    }

    fn condition(index: Index, partition: &str, order: ScanOrder, limit: u16) -> KeyCondition {
        KeyCondition {
            pattern: "test",
            index,
            partition: partition.to_owned(),
            sort: None,
            order,
            limit,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (pk, sk, gsi) in [
            ("EV#1", "b", Some("PM#x")),
            ("EV#1", "a", None),
            ("EV#1", "c", Some("PM#x")),
            ("EV#2", "a", Some("PM#x")),
        ] {
            let mut value = json!({ "pk": pk, "sk": sk, "n": 1 });
            if let Some(gsi) = gsi {
                value["GSI1PK"] = json!(gsi);
                value["GSI1SK"] = json!(format!("STATUS#{sk}"));
            }
            store.put(item(value)).await.unwrap();
        }
        store
    }

    fn sort_keys(page: &Page<Item>) -> Vec<&str> {
        page.items
            .iter()
            .map(|item| item["sk"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn put_requires_table_key() {
        let store = MemoryStore::new();
        let err = store.put(item(json!({ "pk": "a" }))).await.unwrap_err();
        assert!(matches!(err, Error::Key(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn put_replaces_same_key() {
        let store = MemoryStore::new();
        store.put(item(json!({ "pk": "a", "sk": "b", "v": 1 }))).await.unwrap();
        store.put(item(json!({ "pk": "a", "sk": "b", "v": 2 }))).await.unwrap();
        assert_eq!(store.len(), 1);
        let got = store.get(&PrimaryKey::new("a", "b")).await.unwrap().unwrap();
        assert_eq!(got["v"], json!(2));
    }

    #[tokio::test]
    async fn primary_query_orders_by_sort_key() {
        let store = seeded().await;
        let page = store
            .query(&condition(Index::Primary, "EV#1", ScanOrder::Forward, 10), None)
            .await
            .unwrap();
        assert_eq!(sort_keys(&page), ["a", "b", "c"]);
        assert!(page.cursor.is_none());

        let page = store
            .query(&condition(Index::Primary, "EV#1", ScanOrder::Reverse, 10), None)
            .await
            .unwrap();
        assert_eq!(sort_keys(&page), ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn secondary_index_is_sparse() {
        let store = seeded().await;
        let page = store
            .query(&condition(Index::Gsi1, "PM#x", ScanOrder::Forward, 10), None)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.items.iter().all(|i| i["GSI1PK"] == json!("PM#x")));
    }

    #[tokio::test]
    async fn sort_predicate_filters() {
        let store = seeded().await;
        let mut cond = condition(Index::Gsi1, "PM#x", ScanOrder::Forward, 10);
        cond.sort = Some(SortPredicate::Equals("STATUS#c".to_owned()));
        let page = store.query(&cond, None).await.unwrap();
        assert_eq!(sort_keys(&page), ["c"]);

        cond.sort = Some(SortPredicate::BeginsWith("TENANT#".to_owned()));
        assert!(store.query(&cond, None).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn cursor_resumes_after_last_item() {
        let store = seeded().await;
        let cond = condition(Index::Primary, "EV#1", ScanOrder::Reverse, 2);

        let first = store.query(&cond, None).await.unwrap();
        assert_eq!(sort_keys(&first), ["c", "b"]);
        let cursor = first.cursor.expect("more pages");

        let token = cursor.encode();
        let cursor = Cursor::decode(&token).unwrap();
        let second = store.query(&cond, Some(&cursor)).await.unwrap();
        assert_eq!(sort_keys(&second), ["a"]);
        assert!(second.cursor.is_none());
    }

    #[tokio::test]
    async fn gsi_cursor_breaks_ties_on_table_key() {
        let store = MemoryStore::new();
        for pk in ["WO#1", "WO#2", "WO#3"] {
            store
                .put(item(json!({
                    "pk": pk, "sk": "STATUS#TO_DO",
                    "GSI1PK": "PM#x", "GSI1SK": "STATUS#TO_DO",
                })))
                .await
                .unwrap();
        }

        let cond = condition(Index::Gsi1, "PM#x", ScanOrder::Forward, 1);
        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = store.query(&cond, cursor.as_ref()).await.unwrap();
            seen.extend(page.items.iter().map(|i| i["pk"].as_str().unwrap().to_owned()));
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(seen, ["WO#1", "WO#2", "WO#3"]);
    }

    #[tokio::test]
    async fn cursor_missing_index_key_is_invalid() {
        let store = seeded().await;
        let cursor = Cursor::decode(r#"{"pk":"EV#1","sk":"a"}"#).unwrap();
        let err = store
            .query(
                &condition(Index::Gsi1, "PM#x", ScanOrder::Forward, 1),
                Some(&cursor),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCursor));
    }

    #[tokio::test]
    async fn delete_returns_removed_item() {
        let store = seeded().await;
        let key = PrimaryKey::new("EV#1", "a");
        assert!(store.delete(&key).await.unwrap().is_some());
        assert!(store.delete(&key).await.unwrap().is_none());
        assert_eq!(store.len(), 3);
    }
}
