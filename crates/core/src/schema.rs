//! Structural validation of tool arguments against a declared JSON schema.
//!
//! Covers the schema subset the tools actually declare: a top-level object
//! with typed properties and a `required` list. The registry runs this before
//! every execution — it is the only input-sanity boundary before a network
//! mutation, so it is not optional and not bypassable per tool.

use crate::error::ToolError;
use serde_json::Value;

/// Validate `arguments` against `schema`.
///
/// Checks, in order:
/// 1. the arguments form a JSON object;
/// 2. every `required` property is present;
/// 3. every supplied property with a declared `type` matches it.
///
/// Properties the schema does not declare are allowed through, matching the
/// JSON Schema default of `additionalProperties: true`.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Result<(), ToolError> {
    let Some(args) = arguments.as_object() else {
        return Err(ToolError::InvalidArguments(format!(
            "expected a JSON object, got {}",
            type_name(arguments)
        )));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(key) {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required argument '{key}'"
                )));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (key, value) in args {
        let Some(declared) = properties.get(key).and_then(|p| p.get("type")) else {
            continue;
        };
        let Some(expected) = declared.as_str() else {
            continue;
        };
        if !matches_type(expected, value) {
            return Err(ToolError::InvalidArguments(format!(
                "argument '{key}' should be {expected}, got {}",
                type_name(value)
            )));
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // null or an unknown type keyword: let the tool decide
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "title": { "type": "string" },
                "labels": { "type": "array", "items": { "type": "string" } },
                "number": { "type": "integer" }
            },
            "required": ["repo", "title"]
        })
    }

    #[test]
    fn accepts_valid_arguments() {
        let args = json!({"repo": "demo", "title": "bug", "labels": ["a"]});
        assert!(validate_arguments(&issue_schema(), &args).is_ok());
    }

    #[test]
    fn rejects_non_object() {
        let err = validate_arguments(&issue_schema(), &json!("not an object")).unwrap_err();
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn rejects_missing_required() {
        let err = validate_arguments(&issue_schema(), &json!({"repo": "demo"})).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn rejects_wrong_type() {
        let args = json!({"repo": "demo", "title": "bug", "number": "three"});
        let err = validate_arguments(&issue_schema(), &args).unwrap_err();
        assert!(err.to_string().contains("number"));
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn allows_undeclared_properties() {
        let args = json!({"repo": "demo", "title": "bug", "extra": 1});
        assert!(validate_arguments(&issue_schema(), &args).is_ok());
    }

    #[test]
    fn empty_schema_only_requires_an_object() {
        let schema = json!({"type": "object"});
        assert!(validate_arguments(&schema, &json!({"anything": true})).is_ok());
        assert!(validate_arguments(&schema, &json!(42)).is_err());
    }
}
