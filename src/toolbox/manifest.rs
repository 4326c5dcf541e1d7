//! Toolbox manifest wire types and their JSON Schema rendering.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Body of `GET /api/toolset/{name}` and `GET /api/tool/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSchema {
    #[serde(default)]
    pub server_version: String,
    #[serde(default)]
    pub tools: BTreeMap<String, ToolSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
    /// Auth services the server requires before it will run the tool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auth_required: Vec<String>,
}

/// One tool parameter. `items` describes array elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,
    /// Parameters filled by the server from authenticated claims.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auth_sources: Vec<String>,
}

fn default_required() -> bool {
    true
}

impl ParameterSchema {
    /// Server-bound parameters are hidden from the model.
    pub fn is_model_facing(&self) -> bool {
        self.auth_sources.is_empty()
    }

    /// JSON Schema type name for this parameter's Toolbox type.
    pub fn json_type(&self) -> &str {
        match self.param_type.as_str() {
            "float" => "number",
            "map" => "object",
            "int" => "integer",
            "bool" => "boolean",
            other => other,
        }
    }

    fn property(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), Value::String(self.json_type().to_string()));
        if !self.description.is_empty() {
            prop.insert("description".into(), Value::String(self.description.clone()));
        }
        if let Some(items) = &self.items {
            prop.insert("items".into(), items.property());
        }
        Value::Object(prop)
    }
}

impl ToolSchema {
    /// Render the parameter list as a JSON Schema object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in self.parameters.iter().filter(|p| p.is_model_facing()) {
            properties.insert(param.name.clone(), param.property());
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOTEL_MANIFEST: &str = r#"{
        "serverVersion": "0.7.0",
        "tools": {
            "search-hotels-by-name": {
                "description": "Search for hotels based on name.",
                "parameters": [
                    {"name": "name", "type": "string", "description": "The name of the hotel."},
                    {"name": "country", "type": "string", "description": "Country filter.", "required": false},
                    {"name": "tags", "type": "array", "description": "Tags.", "required": false,
                     "items": {"name": "tag", "type": "string", "description": "A tag."}},
                    {"name": "user_id", "type": "string", "description": "Caller.", "authSources": ["google"]}
                ]
            }
        }
    }"#;

    #[test]
    fn test_manifest_to_json_schema() {
        let manifest: ManifestSchema = serde_json::from_str(HOTEL_MANIFEST).unwrap();
        assert_eq!(manifest.server_version, "0.7.0");
        let tool = &manifest.tools["search-hotels-by-name"];
        let schema = tool.input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["properties"]["name"]["type"], "string");
        assert_eq!(schema["properties"]["tags"]["items"]["type"], "string");
        assert!(schema["properties"].get("user_id").is_none());
    }

    #[test]
    fn test_rendered_schema_parses() {
        let manifest: ManifestSchema = serde_json::from_str(HOTEL_MANIFEST).unwrap();
        let schema = manifest.tools["search-hotels-by-name"].input_schema();
        let parsed = crate::schema::StructuredSchema::from_value(&schema).unwrap();
        assert_eq!(parsed.required_fields().into_iter().collect::<Vec<_>>(), vec!["name"]);
        assert!(parsed.optional_fields().contains("country"));
    }

    #[test]
    fn test_float_and_map_parameters_keep_schema() {
        let manifest: ManifestSchema = serde_json::from_value(json!({
            "serverVersion": "0.7.0",
            "tools": {
                "search-hotels-by-price": {
                    "description": "Search hotels under a price.",
                    "parameters": [
                        {"name": "max_price", "type": "float", "description": "Upper bound."},
                        {"name": "filters", "type": "map", "description": "Extra filters.", "required": false},
                        {"name": "prices", "type": "array", "description": "Bands.", "required": false,
                         "items": {"name": "band", "type": "float", "description": "A band."}}
                    ]
                }
            }
        }))
        .unwrap();
        let tool = &manifest.tools["search-hotels-by-price"];
        let schema = tool.input_schema();
        assert_eq!(schema["properties"]["max_price"]["type"], "number");
        assert_eq!(schema["properties"]["filters"]["type"], "object");
        assert_eq!(schema["properties"]["prices"]["items"]["type"], "number");

        let parsed = crate::schema::StructuredSchema::from_value(&schema).unwrap();
        assert_eq!(
            parsed.required_fields().into_iter().collect::<Vec<_>>(),
            vec!["max_price"]
        );
        assert!(parsed.optional_fields().contains("filters"));
    }
}
