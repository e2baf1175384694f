//! JSON Schema generation (schemars) and validation (jsonschema) for tool payloads.

use anyhow::{anyhow, Result};
use jsonschema::Validator;
use schemars::{generate::SchemaSettings, JsonSchema};
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

/// Root schema for `T` with all sub schemas inlined, so that every property
/// schema can be validated on its own.
pub fn schema_object_for<T: JsonSchema>() -> Result<JsonObject> {
    let generator = SchemaSettings::draft2020_12()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();
    match serde_json::to_value(&schema)? {
        Value::Object(mut obj) => {
            // MCP requires object-typed tool schemas
            if obj.get("type").and_then(Value::as_str) != Some("object") {
                return Err(anyhow!(
                    "schema for {} is not an object schema",
                    std::any::type_name::<T>()
                ));
            }
            obj.remove("$schema");
            Ok(obj)
        }
        other => Err(anyhow!(
            "schema for {} is not an object: {other}",
            std::any::type_name::<T>()
        )),
    }
}

pub fn compile(schema: &JsonObject) -> Result<Validator> {
    jsonschema::draft202012::new(&Value::Object(schema.clone()))
        .map_err(|e| anyhow!("invalid schema: {e}"))
}

/// Collects every violation message, or `None` when `instance` is valid.
pub fn violations(validator: &Validator, instance: &Value) -> Option<Vec<String>> {
    let messages: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| e.to_string())
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}

/// Names the top level property responsible for a validation failure:
/// the first missing required property, else the first provided property that
/// is unknown (when additional properties are forbidden) or fails its own schema.
pub fn offending_field(schema: &JsonObject, instance: &Value) -> Option<String> {
    let obj = instance.as_object()?;
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        if let Some(missing) = required
            .iter()
            .filter_map(Value::as_str)
            .find(|name| !obj.contains_key(*name))
        {
            return Some(missing.to_string());
        }
    }
    let empty = JsonObject::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));
    obj.iter()
        .find(|(name, value)| match properties.get(name.as_str()) {
            Some(sub) => jsonschema::draft202012::new(sub)
                .map(|v| !v.is_valid(value))
                .unwrap_or(false),
            None => closed,
        })
        .map(|(name, _)| name.clone())
}
