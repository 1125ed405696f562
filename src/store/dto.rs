use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Firestore REST document body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FirestoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
    #[serde(default, rename = "updateTime", skip_serializing)]
    pub update_time: Option<String>,
}

impl FirestoreDocument {
    /// Last path segment of `name`, which is the document key.
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(Value),
    BooleanValue(bool),
    /// Firestore encodes 64-bit integers as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    StringValue(String),
    TimestampValue(String),
    ReferenceValue(String),
    BytesValue(String),
    GeoPointValue(Value),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

impl From<&Value> for FirestoreValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FirestoreValue::NullValue(Value::String("NULL_VALUE".to_string())),
            Value::Bool(b) => FirestoreValue::BooleanValue(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FirestoreValue::IntegerValue(i.to_string()),
                None => FirestoreValue::DoubleValue(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => FirestoreValue::StringValue(s.clone()),
            Value::Array(items) => FirestoreValue::ArrayValue(ArrayValue {
                values: items.iter().map(FirestoreValue::from).collect(),
            }),
            Value::Object(map) => FirestoreValue::MapValue(MapValue {
                fields: encode_fields(map),
            }),
        }
    }
}

impl From<FirestoreValue> for Value {
    fn from(value: FirestoreValue) -> Self {
        match value {
            FirestoreValue::NullValue(_) => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            FirestoreValue::IntegerValue(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(s)),
            FirestoreValue::DoubleValue(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            FirestoreValue::StringValue(s)
            | FirestoreValue::TimestampValue(s)
            | FirestoreValue::ReferenceValue(s)
            | FirestoreValue::BytesValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(v) => v,
            FirestoreValue::MapValue(m) => Value::Object(decode_fields(m.fields)),
            FirestoreValue::ArrayValue(a) => Value::Array(a.values.into_iter().map(Value::from).collect()),
        }
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> BTreeMap<String, FirestoreValue> {
    map.iter()
        .map(|(k, v)| (k.clone(), FirestoreValue::from(v)))
        .collect()
}

pub fn decode_fields(fields: BTreeMap<String, FirestoreValue>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(k, v)| (k, Value::from(v)))
        .collect()
}
