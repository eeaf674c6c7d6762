use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Declared type of a gallery attribute. Declarative only: image attribute
/// values are never coerced or rejected based on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Text,
    Number,
    Date,
    Tags,
}

/// One field in a gallery's schema. The `name` doubles as the lookup key
/// into each image's attribute bag; renaming a definition does not migrate
/// values stored under the old name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub is_visible: bool,
}

/// Ordered attribute schema of a gallery, stored as a JSON column.
/// Insertion order is significant (it defines column order in the grid),
/// which is why this is a sequence and never a keyed map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct AttributeSchema(pub Vec<AttributeDefinition>);

impl AttributeSchema {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-image attribute bag, stored as a JSON column. Deliberately untyped:
/// any scalar or array value is accepted regardless of the gallery schema,
/// and technical keys (`dimensions`, `size`, `originalName`, `mimeType`)
/// share the namespace with user-defined keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct AttributeBag(#[schema(value_type = Object)] pub Map<String, Value>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Shallow merge: every key in `update` overwrites the same key here,
    /// keys not present in `update` are left untouched. No validation
    /// against any schema, no deep merging of nested values.
    pub fn merge(&mut self, update: Map<String, Value>) {
        for (key, value) in update {
            self.0.insert(key, value);
        }
    }

    /// String form of the value under `key`; missing or null values read as
    /// the empty string. This is the comparison form used by the query
    /// engine for filtering and sorting.
    pub fn coerced(&self, key: &str) -> String {
        self.0.get(key).map(coerce_value).unwrap_or_default()
    }

    /// All values in the bag coerced to strings and space-joined. Search
    /// matches against this, so technical attributes like the mime type are
    /// searchable too.
    pub fn search_haystack(&self) -> String {
        self.0
            .values()
            .map(coerce_value)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Shallow merge producing a new bag. `merged(e, u)[k] == u[k]` for every
/// `k` in `u`, and `== e[k]` for every `k` only in `e`.
pub fn merge_attributes(existing: &AttributeBag, update: &Map<String, Value>) -> AttributeBag {
    let mut merged = existing.clone();
    merged.merge(update.clone());
    merged
}

/// Render an attribute value the way the grid displays it: strings as-is,
/// numbers in display form, tag arrays comma-joined, null as empty.
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(coerce_value).collect::<Vec<_>>().join(","),
        object @ Value::Object(_) => object.to_string(),
    }
}
