use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::{scan_all, Item};
use crate::catalog::PlantRecord;
use crate::error::DatabaseError;

/// Attribute recording when the favorite was added, used for display order
const ADDED_AT: &str = "added_at";

/// Insert a favorite unless one with the same name exists
///
/// # Arguments
/// * `client` - DynamoDB client
/// * `table_name` - Name of the favorites table (partition key `name`)
/// * `plant` - Plant to store
/// * `added_at` - RFC3339 insertion time
///
/// # Returns
/// * `Ok(true)` - Favorite written
/// * `Ok(false)` - A favorite with that name already existed
/// * `Err(DatabaseError)` - DynamoDB error occurred
pub async fn put_favorite_if_absent(
    client: &DynamoDbClient,
    table_name: &str,
    plant: &PlantRecord,
    added_at: &str,
) -> Result<bool, DatabaseError> {
    let item = plant_to_item(plant, added_at)?;

    let result = client
        .put_item()
        .table_name(table_name)
        .set_item(Some(item))
        .condition_expression("attribute_not_exists(#name)")
        .expression_attribute_names("#name", "name")
        .send()
        .await;

    match result {
        Ok(_) => Ok(true),
        Err(err) if is_conditional_check_failed(&err) => Ok(false),
        Err(err) => Err(DatabaseError::DynamoDb(format!("{:?}", err))),
    }
}

/// Get a favorite by plant name
pub async fn get_favorite(
    client: &DynamoDbClient,
    table_name: &str,
    name: &str,
) -> Result<Option<PlantRecord>, DatabaseError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("name", AttributeValue::S(name.to_string()))
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    match result.item {
        Some(item) => Ok(Some(serde_dynamo::from_item(item)?)),
        None => Ok(None),
    }
}

/// All favorites ordered by insertion time
pub async fn list_favorites(
    client: &DynamoDbClient,
    table_name: &str,
) -> Result<Vec<PlantRecord>, DatabaseError> {
    let items = scan_all(client, table_name).await?;
    items_to_ordered_plants(items)
}

/// Delete a favorite by plant name
///
/// # Returns
/// * `Ok(true)` - Favorite existed and was removed
/// * `Ok(false)` - No favorite had that name
pub async fn delete_favorite(
    client: &DynamoDbClient,
    table_name: &str,
    name: &str,
) -> Result<bool, DatabaseError> {
    let result = client
        .delete_item()
        .table_name(table_name)
        .key("name", AttributeValue::S(name.to_string()))
        .return_values(ReturnValue::AllOld)
        .send()
        .await
        .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

    Ok(result.attributes.is_some_and(|attrs| !attrs.is_empty()))
}

fn plant_to_item(plant: &PlantRecord, added_at: &str) -> Result<Item, DatabaseError> {
    let mut item: Item = serde_dynamo::to_item(plant)?;
    item.insert(ADDED_AT.to_string(), AttributeValue::S(added_at.to_string()));
    Ok(item)
}

fn items_to_ordered_plants(items: Vec<Item>) -> Result<Vec<PlantRecord>, DatabaseError> {
    let mut stamped = items
        .into_iter()
        .map(|item| {
            let added_at = item
                .get(ADDED_AT)
                .and_then(|v| v.as_s().ok())
                .cloned()
                .unwrap_or_default();
            let plant: PlantRecord = serde_dynamo::from_item(item)?;
            Ok((added_at, plant))
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    stamped.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(stamped.into_iter().map(|(_, plant)| plant).collect())
}

fn is_conditional_check_failed(err: &SdkError<PutItemError>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => {
            matches!(
                service_err.err(),
                PutItemError::ConditionalCheckFailedException(_)
            )
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::plant;

    #[test]
    fn test_plant_item_shape() {
        let mut fern = plant("Fern", 500, 2000, 200);
        fern.survives_min_lux = Some(100);

        let item = plant_to_item(&fern, "2024-01-15T09:00:00.000Z").unwrap();

        assert_eq!(item.get("name").unwrap().as_s().unwrap(), "Fern");
        assert_eq!(item.get("thrivesMinLux").unwrap().as_n().unwrap(), "500");
        assert_eq!(item.get("survivesMinLux").unwrap().as_n().unwrap(), "100");
        assert_eq!(
            item.get(ADDED_AT).unwrap().as_s().unwrap(),
            "2024-01-15T09:00:00.000Z"
        );
        assert!(!item.contains_key("survivalNote"));
    }

    #[test]
    fn test_items_ordered_by_added_at() {
        let items = vec![
            plant_to_item(&plant("B", 500, 2000, 200), "2024-01-15T10:00:00.000Z").unwrap(),
            plant_to_item(&plant("A", 500, 2000, 200), "2024-01-15T09:00:00.000Z").unwrap(),
            plant_to_item(&plant("C", 500, 2000, 200), "2024-01-15T11:00:00.000Z").unwrap(),
        ];

        let plants = items_to_ordered_plants(items).unwrap();
        let names: Vec<&str> = plants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_item_round_trip_preserves_record() {
        let fern = plant("Fern", 500, 2000, 200);
        let item = plant_to_item(&fern, "2024-01-15T09:00:00.000Z").unwrap();

        let back: PlantRecord = serde_dynamo::from_item(item).unwrap();
        assert_eq!(back, fern);
    }
}
