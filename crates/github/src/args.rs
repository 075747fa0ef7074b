//! Argument extraction helpers shared by the static tools.
//!
//! The registry has already validated the arguments against each tool's
//! schema; these helpers do the final typed extraction and double as the
//! safety net for tools invoked directly in tests.

use crate::transport::GithubRequest;
use octoagent_core::ToolError;
use serde_json::Value;

/// Apply the standard pagination arguments to a request.
pub(crate) fn page_params(request: GithubRequest, args: &Value) -> GithubRequest {
    request
        .maybe_query("page", optional_u64(args, "page"))
        .maybe_query("per_page", optional_u64(args, "perPage"))
}

pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing required argument '{key}'")))
}

pub(crate) fn required_u64(args: &Value, key: &str) -> Result<u64, ToolError> {
    args.get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing required argument '{key}'")))
}

pub(crate) fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub(crate) fn optional_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

pub(crate) fn optional_bool(args: &Value, key: &str) -> Option<bool> {
    args.get(key).and_then(Value::as_bool)
}

/// A non-empty string array, or None when absent or empty (absent optional
/// collections never reach the request body).
pub(crate) fn optional_str_array(args: &Value, key: &str) -> Option<Vec<String>> {
    let items = args.get(key)?.as_array()?;
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_str_present_and_missing() {
        let args = json!({"repo": "demo"});
        assert_eq!(required_str(&args, "repo").unwrap(), "demo");
        let err = required_str(&args, "title").unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn empty_array_is_absent() {
        let args = json!({"labels": []});
        assert!(optional_str_array(&args, "labels").is_none());
        let args = json!({"labels": ["bug", "p1"]});
        assert_eq!(optional_str_array(&args, "labels").unwrap(), vec!["bug", "p1"]);
    }
}
