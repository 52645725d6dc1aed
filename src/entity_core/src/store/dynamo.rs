use super::{ItemStore, item_key};
use crate::{Cursor, Error, Index, Item, KeyCondition, Page, PrimaryKey, Result, ScanOrder, SortPredicate};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::DisplayErrorContext,
    types::{
        AttributeDefinition, AttributeValue, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
        KeyType, Projection, ProjectionType, ReturnValue, ScalarAttributeType,
    },
};
use std::{collections::HashMap, fmt};
use tracing::{debug, info};

type DynamoItem = HashMap<String, AttributeValue>;

///
/// DynamoStore
///
/// One DynamoDB table with `pk`/`sk` and four GSIs (`GSI1`..`GSI4`), each
/// keyed by `GSInPK`/`GSInSK`.
///

#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl fmt::Debug for DynamoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamoStore")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

fn sdk_error(operation: &'static str, err: &(impl std::error::Error + 'static)) -> Error {
    Error::persistence(operation, DisplayErrorContext(err).to_string())
}

fn key_item(key: &PrimaryKey) -> DynamoItem {
    HashMap::from([
        (
            Index::Primary.partition_attribute().to_owned(),
            AttributeValue::S(key.pk.clone()),
        ),
        (
            Index::Primary.sort_attribute().to_owned(),
            AttributeValue::S(key.sk.clone()),
        ),
    ])
}

/// `KeyConditionExpression` with its attribute names and values.
fn key_condition(
    condition: &KeyCondition,
) -> (String, HashMap<String, String>, HashMap<String, AttributeValue>) {
    let mut names = HashMap::from([(
        "#pk".to_owned(),
        condition.index.partition_attribute().to_owned(),
    )]);
    let mut values = HashMap::from([(
        ":pk".to_owned(),
        AttributeValue::S(condition.partition.clone()),
    )]);

    let expression = match &condition.sort {
        None => "#pk = :pk".to_owned(),
        Some(predicate) => {
            names.insert(
                "#sk".to_owned(),
                condition.index.sort_attribute().to_owned(),
            );
            let (expression, value) = match predicate {
                SortPredicate::Equals(value) => ("#pk = :pk AND #sk = :sk", value),
                SortPredicate::BeginsWith(value) => {
                    ("#pk = :pk AND begins_with(#sk, :sk)", value)
                }
            };
            values.insert(":sk".to_owned(), AttributeValue::S(value.clone()));
            expression.to_owned()
        }
    };

    (expression, names, values)
}

impl DynamoStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the table and its indexes if it does not exist yet.
    ///
    /// Intended for local DynamoDB and tests; production tables are
    /// provisioned out of band.
    pub async fn ensure_table(&self) -> Result<()> {
        let build = |e: aws_sdk_dynamodb::error::BuildError| {
            Error::persistence("CreateTable", e.to_string())
        };
        let key_schema = |partition: &str, sort: &str| -> Result<Vec<KeySchemaElement>> {
            Ok(vec![
                KeySchemaElement::builder()
                    .attribute_name(partition)
                    .key_type(KeyType::Hash)
                    .build()
                    .map_err(build)?,
                KeySchemaElement::builder()
                    .attribute_name(sort)
                    .key_type(KeyType::Range)
                    .build()
                    .map_err(build)?,
            ])
        };

        let all = [Index::Primary]
            .into_iter()
            .chain(Index::SECONDARY)
            .collect::<Vec<_>>();

        let mut definitions = Vec::new();
        for index in &all {
            for attribute in [index.partition_attribute(), index.sort_attribute()] {
                definitions.push(
                    AttributeDefinition::builder()
                        .attribute_name(attribute)
                        .attribute_type(ScalarAttributeType::S)
                        .build()
                        .map_err(build)?,
                );
            }
        }

        let mut indexes = Vec::new();
        for index in Index::SECONDARY {
            let Some(name) = index.name() else { continue };
            indexes.push(
                GlobalSecondaryIndex::builder()
                    .index_name(name)
                    .set_key_schema(Some(key_schema(
                        index.partition_attribute(),
                        index.sort_attribute(),
                    )?))
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::All)
                            .build(),
                    )
                    .build()
                    .map_err(build)?,
            );
        }

        let result = self
            .client
            .create_table()
            .table_name(&self.table_name)
            .set_key_schema(Some(key_schema(
                Index::Primary.partition_attribute(),
                Index::Primary.sort_attribute(),
            )?))
            .set_attribute_definitions(Some(definitions))
            .set_global_secondary_indexes(Some(indexes))
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await;

        match result {
            Ok(_) => info!(table = %self.table_name, "created table"),
            Err(err) => {
                let service_err = err.into_service_error();
                if !service_err.is_resource_in_use_exception() {
                    return Err(sdk_error("CreateTable", &service_err));
                }
                debug!(table = %self.table_name, "table already exists");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ItemStore for DynamoStore {
    async fn put(&self, item: Item) -> Result<()> {
        // fail before the network call, like the service would
        item_key(&item)?;
        let item: DynamoItem = serde_dynamo::to_item(item)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| sdk_error("PutItem", &e))?;

        Ok(())
    }

    async fn get(&self, key: &PrimaryKey) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_item(key)))
            .send()
            .await
            .map_err(|e| sdk_error("GetItem", &e))?;

        output
            .item
            .map(|item| serde_dynamo::from_item(item).map_err(Error::from))
            .transpose()
    }

    async fn delete(&self, key: &PrimaryKey) -> Result<Option<Item>> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_item(key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteItem", &e))?;

        match output.attributes {
            Some(item) if !item.is_empty() => Ok(Some(serde_dynamo::from_item(item)?)),
            _ => Ok(None),
        }
    }

    async fn query(
        &self,
        condition: &KeyCondition,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Item>> {
        let (expression, names, values) = key_condition(condition);
        let start_key: Option<DynamoItem> = match cursor {
            Some(cursor) => Some(serde_dynamo::to_item(cursor.key())?),
            None => None,
        };

        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .set_index_name(condition.index.name().map(str::to_owned))
            .key_condition_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .scan_index_forward(condition.order == ScanOrder::Forward)
            .limit(i32::from(condition.limit.max(1)))
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|e| sdk_error("Query", &e))?;

        let items = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| serde_dynamo::from_item(item).map_err(Error::from))
            .collect::<Result<Vec<Item>>>()?;

        let cursor = match output.last_evaluated_key {
            Some(key) if !key.is_empty() => Cursor::from_key(serde_dynamo::from_item(key)?),
            _ => None,
        };
        debug!(
            pattern = condition.pattern,
            count = items.len(),
            more = cursor.is_some(),
            "dynamo query"
        );

        Ok(Page { items, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(index: Index, sort: Option<SortPredicate>) -> KeyCondition {
        KeyCondition {
            pattern: "test",
            index,
            partition: "PM#a@b.c".to_owned(),
            sort,
            order: ScanOrder::Forward,
            limit: 10,
        }
    }

    #[test]
    fn partition_only_expression() {
        let (expression, names, values) = key_condition(&condition(Index::Primary, None));
        assert_eq!(expression, "#pk = :pk");
        assert_eq!(names["#pk"], "pk");
        assert!(!names.contains_key("#sk"));
        assert_eq!(values[":pk"], AttributeValue::S("PM#a@b.c".to_owned()));
    }

    #[test]
    fn begins_with_targets_index_attributes() {
        let (expression, names, values) = key_condition(&condition(
            Index::Gsi2,
            Some(SortPredicate::BeginsWith("STATUS#".to_owned())),
        ));
        assert_eq!(expression, "#pk = :pk AND begins_with(#sk, :sk)");
        assert_eq!(names["#pk"], "GSI2PK");
        assert_eq!(names["#sk"], "GSI2SK");
        assert_eq!(values[":sk"], AttributeValue::S("STATUS#".to_owned()));
    }

    #[test]
    fn exact_sort_expression() {
        let (expression, _, values) = key_condition(&condition(
            Index::Primary,
            Some(SortPredicate::Equals("STATUS#TO_DO".to_owned())),
        ));
        assert_eq!(expression, "#pk = :pk AND #sk = :sk");
        assert_eq!(values[":sk"], AttributeValue::S("STATUS#TO_DO".to_owned()));
    }

    #[test]
    fn key_item_has_both_attributes() {
        let key = key_item(&PrimaryKey::new("ORG#1", "ORG#1"));
        assert_eq!(key.len(), 2);
        assert_eq!(key["pk"], AttributeValue::S("ORG#1".to_owned()));
    }
}
