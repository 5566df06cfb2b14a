use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use todo_core::{StorageError, TodoItem, NOT_DONE};

/// Hash key attribute of the table.
pub const ID: &str = "ID";
const TITLE: &str = "Title";
const DESCRIPTION: &str = "Description";
const INSERTION_TIMESTAMP: &str = "InsertionTimestamp";
const DONE_TIMESTAMP: &str = "DoneTimestamp";
const DONE: &str = "Done";

pub type Attributes = HashMap<String, AttributeValue>;

pub fn key(id: &str) -> AttributeValue {
    AttributeValue::S(id.to_string())
}

pub fn to_attributes(item: &TodoItem) -> Attributes {
    let mut attrs = HashMap::with_capacity(6);
    attrs.insert(ID.to_string(), key(&item.id));
    attrs.insert(TITLE.to_string(), AttributeValue::S(item.title.clone()));
    attrs.insert(
        DESCRIPTION.to_string(),
        AttributeValue::S(item.description.clone()),
    );
    attrs.insert(
        INSERTION_TIMESTAMP.to_string(),
        AttributeValue::N(item.insertion_timestamp.to_string()),
    );
    attrs.insert(
        DONE_TIMESTAMP.to_string(),
        AttributeValue::N(item.done_timestamp.to_string()),
    );
    attrs.insert(DONE.to_string(), AttributeValue::Bool(item.done));
    attrs
}

/// Decode a stored row.
///
/// `ID` is mandatory. Other attributes fall back to their zero value when
/// absent, except `DoneTimestamp` which falls back to "not done".
pub fn from_attributes(attrs: &Attributes) -> Result<TodoItem, StorageError> {
    let id = string(attrs, ID)?
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StorageError::Serialization("row is missing its ID".to_string()))?;

    Ok(TodoItem {
        id,
        title: string(attrs, TITLE)?.unwrap_or_default(),
        description: string(attrs, DESCRIPTION)?.unwrap_or_default(),
        insertion_timestamp: number(attrs, INSERTION_TIMESTAMP)?.unwrap_or_default(),
        done_timestamp: number(attrs, DONE_TIMESTAMP)?.unwrap_or(NOT_DONE),
        done: boolean(attrs, DONE)?.unwrap_or_default(),
    })
}

fn string(attrs: &Attributes, name: &str) -> Result<Option<String>, StorageError> {
    attrs
        .get(name)
        .map(|value| {
            value
                .as_s()
                .cloned()
                .map_err(|_| type_mismatch(name, "S", value))
        })
        .transpose()
}

fn number(attrs: &Attributes, name: &str) -> Result<Option<i64>, StorageError> {
    attrs
        .get(name)
        .map(|value| {
            let raw = value.as_n().map_err(|_| type_mismatch(name, "N", value))?;
            raw.parse::<i64>().map_err(|e| {
                StorageError::Serialization(format!(
                    "attribute {} is not an integer ({}): {}",
                    name, raw, e
                ))
            })
        })
        .transpose()
}

fn boolean(attrs: &Attributes, name: &str) -> Result<Option<bool>, StorageError> {
    attrs
        .get(name)
        .map(|value| {
            value
                .as_bool()
                .copied()
                .map_err(|_| type_mismatch(name, "BOOL", value))
        })
        .transpose()
}

fn type_mismatch(name: &str, expected: &str, value: &AttributeValue) -> StorageError {
    StorageError::Serialization(format!(
        "attribute {} has unexpected type (expected {}): {:?}",
        name, expected, value
    ))
}
