//! Structured parameter schemas for function declarations.
//!
//! The model API accepts a restricted subset of OpenAPI 3.0 schema objects:
//! upper-case type names, `nullable` instead of `"null"` union members, and no
//! `$schema` / `additionalProperties` keys. [`StructuredSchema`] is that subset,
//! parsed from a tool's raw JSON Schema bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Failure to turn raw JSON Schema bytes into a [`StructuredSchema`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaParseError {
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema node at {path} must be a JSON object, found {found}")]
    NotAnObject { path: String, found: &'static str },

    #[error("unsupported type {type_name} at {path}")]
    UnsupportedType { path: String, type_name: String },
}

/// Data type of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// Map a JSON Schema type name (any case) to a schema type.
    /// `"null"` is not a type here; it is expressed through `nullable`.
    pub fn from_json_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            _ => None,
        }
    }
}

/// A parsed schema tree in the model API's function-parameter format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<StructuredSchema>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, StructuredSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<StructuredSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl StructuredSchema {
    /// Parse raw JSON Schema bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SchemaParseError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(&value)
    }

    /// Parse an already decoded JSON Schema document.
    pub fn from_value(value: &Value) -> Result<Self, SchemaParseError> {
        Self::parse_node(value, "$")
    }

    fn parse_node(value: &Value, path: &str) -> Result<Self, SchemaParseError> {
        let obj = value.as_object().ok_or_else(|| SchemaParseError::NotAnObject {
            path: path.to_string(),
            found: json_kind(value),
        })?;

        let mut schema = StructuredSchema::default();

        match obj.get("type") {
            None => {}
            Some(Value::String(name)) => {
                if name.eq_ignore_ascii_case("null") {
                    schema.nullable = true;
                } else {
                    schema.schema_type = Some(parse_type_name(name, path)?);
                }
            }
            // JSON Schema unions such as ["string", "null"]: first concrete member wins.
            Some(Value::Array(names)) => {
                for name in names {
                    let name = name.as_str().ok_or_else(|| SchemaParseError::UnsupportedType {
                        path: path.to_string(),
                        type_name: name.to_string(),
                    })?;
                    if name.eq_ignore_ascii_case("null") {
                        schema.nullable = true;
                    } else if schema.schema_type.is_none() {
                        schema.schema_type = Some(parse_type_name(name, path)?);
                    }
                }
            }
            Some(other) => {
                return Err(SchemaParseError::UnsupportedType {
                    path: path.to_string(),
                    type_name: other.to_string(),
                })
            }
        }

        schema.format = string_field(obj, "format");
        schema.title = string_field(obj, "title");
        schema.description = string_field(obj, "description");
        if obj.get("nullable").and_then(Value::as_bool) == Some(true) {
            schema.nullable = true;
        }

        if let Some(values) = obj.get("enum").and_then(Value::as_array) {
            schema.enum_values = values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
        }

        match obj.get("items") {
            Some(items @ Value::Object(_)) => {
                schema.items = Self::parse_child(items, &format!("{}.items", path)).map(Box::new);
            }
            // Tuple form: the API only models homogeneous arrays.
            Some(Value::Array(items)) => {
                if let Some(first) = items.first() {
                    schema.items =
                        Self::parse_child(first, &format!("{}.items[0]", path)).map(Box::new);
                }
            }
            _ => {}
        }

        let mut dropped = BTreeSet::new();
        if let Some(props) = obj.get("properties").and_then(Value::as_object) {
            for (name, node) in props {
                match Self::parse_child(node, &format!("{}.properties.{}", path, name)) {
                    Some(child) => {
                        schema.properties.insert(name.clone(), child);
                    }
                    None => {
                        dropped.insert(name.as_str());
                    }
                }
            }
        }

        if let Some(required) = obj.get("required").and_then(Value::as_array) {
            schema.required = required
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| !dropped.contains(name))
                .map(String::from)
                .collect();
        }

        schema.minimum = obj.get("minimum").and_then(Value::as_f64);
        schema.maximum = obj.get("maximum").and_then(Value::as_f64);
        schema.min_items = obj.get("minItems").and_then(Value::as_u64);
        schema.max_items = obj.get("maxItems").and_then(Value::as_u64);

        let variants = obj
            .get("anyOf")
            .or_else(|| obj.get("oneOf"))
            .and_then(Value::as_array);
        if let Some(variants) = variants {
            schema.any_of = variants
                .iter()
                .enumerate()
                .filter_map(|(i, node)| Self::parse_child(node, &format!("{}.anyOf[{}]", path, i)))
                .collect();
        }

        schema.default = obj.get("default").cloned();

        if schema.schema_type.is_none() && !schema.properties.is_empty() {
            schema.schema_type = Some(SchemaType::Object);
        }

        Ok(schema)
    }

    /// Parse a nested node. Boolean schemas (`true`/`false`) have no
    /// counterpart in the API's subset and are skipped; a node that fails to
    /// parse is dropped on its own so the rest of the tree survives.
    fn parse_child(value: &Value, path: &str) -> Option<Self> {
        if value.is_boolean() {
            debug!(path, "skipping boolean subschema");
            return None;
        }
        match Self::parse_node(value, path) {
            Ok(child) => Some(child),
            Err(e) => {
                warn!(path, error = %e, "dropping unsupported schema node");
                None
            }
        }
    }

    /// Property names listed in `required`.
    pub fn required_fields(&self) -> BTreeSet<&str> {
        self.required.iter().map(String::as_str).collect()
    }

    /// Property names declared but not listed in `required`.
    pub fn optional_fields(&self) -> BTreeSet<&str> {
        let required = self.required_fields();
        self.properties
            .keys()
            .map(String::as_str)
            .filter(|name| !required.contains(name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == StructuredSchema::default()
    }
}

fn parse_type_name(name: &str, path: &str) -> Result<SchemaType, SchemaParseError> {
    SchemaType::from_json_name(name).ok_or_else(|| SchemaParseError::UnsupportedType {
        path: path.to_string(),
        type_name: name.to_string(),
    })
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
