//! Item-level DynamoDB access for the persisted stores.
//!
//! Each function takes the client and table name explicitly and maps SDK
//! failures to [`crate::error::DatabaseError`].

pub mod favorites;
pub mod logbooks;
pub mod settings;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;

use crate::error::DatabaseError;

pub type Item = HashMap<String, AttributeValue>;

/// Read every item in a table, following `LastEvaluatedKey` until exhausted
pub(crate) async fn scan_all(
    client: &DynamoDbClient,
    table_name: &str,
) -> Result<Vec<Item>, DatabaseError> {
    let mut items = Vec::new();
    let mut start_key: Option<Item> = None;

    loop {
        let result = client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(start_key.take())
            .send()
            .await
            .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

        items.extend(result.items.unwrap_or_default());

        match result.last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(items)
}

/// Read a string attribute, failing when it is absent or of another type
pub(crate) fn string_attribute(item: &Item, name: &str) -> Result<String, DatabaseError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| DatabaseError::Serialization(format!("Missing string attribute '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_attribute() {
        let mut item = Item::new();
        item.insert("id".to_string(), AttributeValue::S("kitchen".to_string()));
        item.insert("count".to_string(), AttributeValue::N("3".to_string()));

        assert_eq!(string_attribute(&item, "id").unwrap(), "kitchen");
        assert!(matches!(
            string_attribute(&item, "count"),
            Err(DatabaseError::Serialization(_))
        ));
        assert!(string_attribute(&item, "missing").is_err());
    }
}
