//! Check parsed function arguments against the function's parameter schema.
//!
//! Only the top level of the schema is enforced: object shape, required
//! properties, property types and string enums. A violation is reported back
//! to the model as a function-role message so it can correct itself.

use serde_json::Value;

/// Returns a description of the first schema violation found.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), String> {
    if schema.get("type").and_then(Value::as_str) == Some("object") && !args.is_object() {
        return Err(format!("expected an object, got {}", type_name(args)));
    }

    let Some(fields) = args.as_object() else {
        return Ok(());
    };

    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    for name in required {
        if !fields.contains_key(name) {
            return Err(format!("missing required argument '{name}'"));
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, value) in fields {
        let Some(property) = properties.get(key) else {
            continue;
        };
        if let Some(expected) = property.get("type").and_then(Value::as_str) {
            if !matches_type(value, expected) {
                return Err(format!(
                    "argument '{key}' should be {expected}, got {}",
                    type_name(value)
                ));
            }
        }
        if let Some(allowed) = property.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(format!("argument '{key}' must be one of {}", Value::Array(allowed.clone())));
            }
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
