use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;

use super::string_attribute;
use crate::error::DatabaseError;

/// Settings key holding the id of the logbook selected last
pub const LAST_SELECTED_LOGBOOK_KEY: &str = "last_selected_logbook";

/// Settings key holding the direct-mode filters as JSON
pub const DIRECT_FILTERS_KEY: &str = "direct_filters";

/// Read a setting value by key
///
/// # Arguments
/// * `client` - DynamoDB client
/// * `table_name` - Name of the settings table (partition key `setting_key`)
/// * `key` - Setting key
///
/// # Returns
/// * `Ok(Some(value))` - Setting present
/// * `Ok(None)` - Setting never written or cleared
pub async fn get_setting(
    client: &DynamoDbClient,
    table_name: &str,
    key: &str,
) -> Result<Option<String>, DatabaseError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("setting_key", AttributeValue::S(key.to_string()))
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    match result.item {
        Some(item) => Ok(Some(string_attribute(&item, "value")?)),
        None => Ok(None),
    }
}

pub async fn put_setting(
    client: &DynamoDbClient,
    table_name: &str,
    key: &str,
    value: &str,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    let mut item = HashMap::new();
    item.insert("setting_key".to_string(), AttributeValue::S(key.to_string()));
    item.insert("value".to_string(), AttributeValue::S(value.to_string()));
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(updated_at.to_string()),
    );

    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(item))
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    Ok(())
}

/// Remove a setting. Deleting an absent key succeeds.
pub async fn delete_setting(
    client: &DynamoDbClient,
    table_name: &str,
    key: &str,
) -> Result<(), DatabaseError> {
    client
        .delete_item()
        .table_name(table_name)
        .key("setting_key", AttributeValue::S(key.to_string()))
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    Ok(())
}
