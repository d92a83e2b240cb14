use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::{scan_all, Item};
use crate::error::DatabaseError;
use crate::logbook::Logbook;

/// Write a logbook, replacing any existing item with the same id
///
/// Measurements are stored inline as a list of maps, so replacing the item
/// also replaces its measurements.
///
/// # Arguments
/// * `client` - DynamoDB client
/// * `table_name` - Name of the logbooks table (partition key `id`)
/// * `logbook` - Logbook to write
pub async fn put_logbook(
    client: &DynamoDbClient,
    table_name: &str,
    logbook: &Logbook,
) -> Result<(), DatabaseError> {
    let item = logbook_to_item(logbook)?;

    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(item))
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    Ok(())
}

pub async fn get_logbook(
    client: &DynamoDbClient,
    table_name: &str,
    id: &str,
) -> Result<Option<Logbook>, DatabaseError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("id", AttributeValue::S(id.to_string()))
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    match result.item {
        Some(item) => Ok(Some(item_to_logbook(item)?)),
        None => Ok(None),
    }
}

/// Every logbook in the table, in no particular order
pub async fn list_logbooks(
    client: &DynamoDbClient,
    table_name: &str,
) -> Result<Vec<Logbook>, DatabaseError> {
    scan_all(client, table_name)
        .await?
        .into_iter()
        .map(item_to_logbook)
        .collect()
}

/// Delete a logbook and, with it, its measurements
///
/// # Returns
/// * `Ok(true)` - Logbook existed and was removed
/// * `Ok(false)` - No logbook had that id
pub async fn delete_logbook(
    client: &DynamoDbClient,
    table_name: &str,
    id: &str,
) -> Result<bool, DatabaseError> {
    let result = client
        .delete_item()
        .table_name(table_name)
        .key("id", AttributeValue::S(id.to_string()))
        .return_values(ReturnValue::AllOld)
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    Ok(result.attributes.is_some_and(|attrs| !attrs.is_empty()))
}

fn logbook_to_item(logbook: &Logbook) -> Result<Item, DatabaseError> {
    Ok(serde_dynamo::to_item(logbook)?)
}

fn item_to_logbook(item: Item) -> Result<Logbook, DatabaseError> {
    Ok(serde_dynamo::from_item(item)?)
}
