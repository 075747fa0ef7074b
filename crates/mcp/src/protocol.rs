//! Wire envelopes for the line-delimited JSON-RPC tool protocol.
//!
//! One request object per line on the child's stdin, one response object per
//! line on its stdout. Responses carry either `result` or `error`; both
//! absent means the server broke the contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The protocol tag sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Handshake method; must precede all others.
pub const METHOD_INITIALIZE: &str = "initialize";
/// Catalog method; returns `{"tools": [...]}`.
pub const METHOD_LIST_TOOLS: &str = "tools/list";
/// Execution method; params are `{"toolId": ..., "params": {...}}`.
pub const METHOD_INVOKE_TOOL: &str = "tools/invoke";

/// An outbound request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: i64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: i64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// An inbound response envelope.
///
/// The id is kept as a raw value rather than an integer: a non-conforming
/// server is exactly the case the desync check exists for, and we want to
/// report what it actually sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl RpcResponse {
    /// A synthetic failure envelope for transport-level problems, so the
    /// caller observes protocol errors as structured failures instead of
    /// exceptions.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            id: None,
            result: None,
            error: Some(Value::String(message.into())),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Render the error payload for an observation.
    pub fn error_text(&self) -> String {
        match &self.error {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "unknown error".into(),
        }
    }
}

/// One tool as described by the remote catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Parameter schema; servers differ on the field name.
    #[serde(default, alias = "inputSchema")]
    pub parameters: Option<Value>,
}

impl ToolDescriptor {
    /// The identifier passed to the execution method.
    pub fn tool_id(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }

    /// The name shown to the reasoning engine; falls back to `tool_<id>`.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("tool_{}", self.tool_id()))
    }

    pub fn describe(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| "No description provided".into())
    }

    /// The declared schema, or an unconstrained object when absent.
    pub fn schema(&self) -> Value {
        self.parameters
            .clone()
            .unwrap_or_else(|| serde_json::json!({"type": "object"}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_roundtrip() {
        let req = RpcRequest::new(3, METHOD_LIST_TOOLS, json!({}));
        let line = serde_json::to_string(&req).unwrap();
        assert!(line.contains(r#""jsonrpc":"2.0""#));
        assert!(line.contains(r#""id":3"#));
        let back: RpcRequest = serde_json::from_str(&line).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn response_roundtrip_result_only() {
        let resp = RpcResponse {
            id: Some(json!(1)),
            result: Some(json!({"tools": []})),
            error: None,
        };
        let line = serde_json::to_string(&resp).unwrap();
        assert!(!line.contains("error"));
        let back: RpcResponse = serde_json::from_str(&line).unwrap();
        assert_eq!(back, resp);
    }

    #[test]
    fn response_roundtrip_error_only() {
        let resp = RpcResponse {
            id: Some(json!(2)),
            result: None,
            error: Some(json!({"code": -32601, "message": "method not found"})),
        };
        let line = serde_json::to_string(&resp).unwrap();
        assert!(!line.contains("result"));
        let back: RpcResponse = serde_json::from_str(&line).unwrap();
        assert_eq!(back, resp);
        assert!(back.is_error());
        assert!(back.error_text().contains("method not found"));
    }

    #[test]
    fn response_tolerates_absent_fields() {
        let back: RpcResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(back, RpcResponse::default());
        assert!(!back.is_error());
    }

    #[test]
    fn descriptor_defaults() {
        let desc: ToolDescriptor = serde_json::from_value(json!({"id": "42"})).unwrap();
        assert_eq!(desc.tool_id(), "42");
        assert_eq!(desc.display_name(), "tool_42");
        assert_eq!(desc.describe(), "No description provided");
        assert_eq!(desc.schema(), json!({"type": "object"}));
    }

    #[test]
    fn descriptor_input_schema_alias() {
        let desc: ToolDescriptor = serde_json::from_value(json!({
            "name": "create_issue",
            "inputSchema": {"type": "object", "required": ["title"]}
        }))
        .unwrap();
        assert_eq!(desc.tool_id(), "create_issue");
        assert_eq!(desc.schema()["required"][0], "title");
    }
}
