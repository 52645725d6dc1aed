use crate::{AccessPattern, Cursor, Entity, ItemStore, Page, PrimaryKey, Result};
use std::{marker::PhantomData, sync::Arc};
use tracing::debug;

///
/// Repository
///
/// Create / get / query / update / delete for one entity type over a
/// shared store.
///

pub struct Repository<T> {
    store: Arc<dyn ItemStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn create(&self, entity: T) -> CreateBuilder<'_, T> {
        CreateBuilder {
            entity,
            store: self.store.as_ref(),
        }
    }

    /// Exact-key read. A missing item is `Ok(None)`.
    pub async fn get(&self, key: &PrimaryKey) -> Result<Option<T>> {
        debug!(%key, "get");
        self.store.get(key).await?.map(T::from_item).transpose()
    }

    pub fn query<'a>(&'a self, pattern: &'a AccessPattern) -> QueryBuilder<'a, T> {
        QueryBuilder {
            store: self.store.as_ref(),
            pattern,
            partition: Vec::new(),
            sort: Vec::new(),
            cursor: None,
            limit: None,
            _marker: PhantomData,
        }
    }

    pub fn update(&self, key: PrimaryKey) -> UpdateBuilder<'_, T> {
        UpdateBuilder {
            store: self.store.as_ref(),
            key,
            updates: Vec::new(),
        }
    }

    /// Remove exactly one item. Items sharing its partition are untouched.
    pub async fn delete(&self, key: &PrimaryKey) -> Result<Option<T>> {
        debug!(%key, "delete");
        self.store.delete(key).await?.map(T::from_item).transpose()
    }
}

//
// ─── CREATE BUILDER ─────────────────────────────────────────────────────────────
//
pub struct CreateBuilder<'a, T> {
    entity: T,
    store: &'a dyn ItemStore,
}

impl<T: Entity> CreateBuilder<'_, T> {
    /// Upsert by the entity's computed key; returns what was written.
    pub async fn send(self) -> Result<T> {
        let item = self.entity.to_item()?;
        debug!(key = %self.entity.primary_key(), "put");
        self.store.put(item).await?;

        Ok(self.entity)
    }
}

//
// ─── QUERY BUILDER ──────────────────────────────────────────────────────────────
//
pub struct QueryBuilder<'a, T> {
    store: &'a dyn ItemStore,
    pattern: &'a AccessPattern,
    partition: Vec<String>,
    sort: Vec<String>,
    cursor: Option<Cursor>,
    limit: Option<u16>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> QueryBuilder<'_, T> {
    #[must_use]
    pub fn partition<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn sort<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Override the pattern's page size.
    #[must_use]
    pub fn limit(mut self, limit: u16) -> Self {
        self.limit = Some(limit);
        self
    }

    fn condition(&self) -> Result<crate::KeyCondition> {
        let partition: Vec<&str> = self.partition.iter().map(String::as_str).collect();
        let sort: Vec<&str> = self.sort.iter().map(String::as_str).collect();
        let condition = self.pattern.resolve(&partition, &sort)?;

        Ok(match self.limit {
            Some(limit) => condition.with_limit(limit),
            None => condition,
        })
    }

    /// One page.
    pub async fn send(self) -> Result<Page<T>> {
        let condition = self.condition()?;
        debug!(
            pattern = condition.pattern,
            partition = %condition.partition,
            resumed = self.cursor.is_some(),
            "query"
        );

        self.store
            .query(&condition, self.cursor.as_ref())
            .await?
            .try_map(T::from_item)
    }

    /// Every remaining page, fetched one after another.
    pub async fn send_all(self) -> Result<Vec<T>> {
        let condition = self.condition()?;
        let mut cursor = self.cursor;
        let mut items = Vec::new();
        let mut pages = 0usize;

        loop {
            let page = self.store.query(&condition, cursor.as_ref()).await?;
            pages += 1;
            for item in page.items {
                items.push(T::from_item(item)?);
            }

            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        debug!(
            pattern = condition.pattern,
            partition = %condition.partition,
            pages,
            items = items.len(),
            "query all"
        );

        Ok(items)
    }
}

//
// ─── UPDATE BUILDER ─────────────────────────────────────────────────────────────
//
pub struct UpdateBuilder<'a, T> {
    store: &'a dyn ItemStore,
    key: PrimaryKey,
    updates: Vec<Box<dyn FnOnce(&mut T) + Send + 'a>>,
}

impl<'a, T: Entity> UpdateBuilder<'a, T> {
    /// Queue a mutation. Generated `set_<field>` setters go through here.
    #[must_use]
    pub fn set(mut self, update: impl FnOnce(&mut T) + Send + 'a) -> Self {
        self.updates.push(Box::new(update));
        self
    }

    /// Load, apply queued mutations, write back. `Ok(None)` if the item
    /// does not exist.
    ///
    /// When a mutation changes a key field the item moves: the new item is
    /// written first, then the old key is deleted. The two writes are not
    /// atomic.
    pub async fn send(self) -> Result<Option<T>> {
        let Some(item) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "update target missing");
            return Ok(None);
        };

        let mut entity = T::from_item(item)?;
        let count = self.updates.len();
        for update in self.updates {
            update(&mut entity);
        }

        let new_key = entity.primary_key();
        self.store.put(entity.to_item()?).await?;
        if new_key != self.key {
            debug!(from = %self.key, to = %new_key, "key moved by update");
            self.store.delete(&self.key).await?;
        }
        debug!(key = %new_key, updates = count, "updated");

        Ok(Some(entity))
    }
}
