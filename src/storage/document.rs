//! Firestore document codec.
//!
//! Firestore's REST API wraps every value in a type tag:
//!
//! ```text
//! "hello"            <-> {"stringValue": "hello"}
//! 3                  <-> {"integerValue": "3"}
//! 2.5                <-> {"doubleValue": 2.5}
//! ["a"]              <-> {"arrayValue": {"values": [{"stringValue": "a"}]}}
//! {"k": true}        <-> {"mapValue": {"fields": {"k": {"booleanValue": true}}}}
//! "2025-01-01T..Z"   <-> {"timestampValue": "2025-01-01T..Z"}   (createdAt, updatedAt)
//! ```

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::models::{CREATED_AT, Document, UPDATED_AT};

/// Top-level fields stored as Firestore timestamps.
const TIMESTAMP_FIELDS: [&str; 2] = [CREATED_AT, UPDATED_AT];

/// A document as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    /// Full resource name, ending in `/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl FirestoreDocument {
    /// Document id (the last path segment of the name).
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    /// Plain JSON body with the document id folded in as `id`.
    pub fn into_plain(self) -> Document {
        let id = self.id().to_string();
        let mut doc = decode_fields(&self.fields);
        doc.insert("id".to_string(), Value::String(id));
        doc
    }
}

/// Page of a collection listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One element of a `runQuery` response stream.
#[derive(Debug, Deserialize)]
pub struct RunQueryItem {
    #[serde(default)]
    pub document: Option<FirestoreDocument>,
}

/// Encode a plain JSON object as Firestore `fields`.
pub fn encode_fields(doc: &Document) -> Map<String, Value> {
    doc.iter()
        .map(|(key, value)| {
            let encoded = match value {
                Value::String(s) if TIMESTAMP_FIELDS.contains(&key.as_str()) => {
                    json!({ "timestampValue": s })
                }
                other => encode_value(other),
            };
            (key.clone(), encoded)
        })
        .collect()
}

/// Encode one JSON value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            if values.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => {
            let fields: Map<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode Firestore `fields` into a plain JSON object.
pub fn decode_fields(fields: &Map<String, Value>) -> Document {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Decode one typed value. Unknown tags decode to `null`.
pub fn decode_value(value: &Value) -> Value {
    let Some((tag, inner)) = value.as_object().and_then(|m| m.iter().next()) else {
        return Value::Null;
    };

    match tag.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .or_else(|| inner.as_i64().map(Value::from))
            .unwrap_or(Value::Null),
        "doubleValue" => inner
            .as_f64()
            .map(Value::from)
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        other => {
            log::debug!("Unsupported Firestore value type: {}", other);
            Value::Null
        }
    }
}
