//! Tool trait and registry — the abstraction over agent capabilities.
//!
//! A tool is anything with a name, a description, a parameter schema, and an
//! `execute`: a statically-defined GitHub operation, a tool discovered from a
//! remote catalog, or an entire nested agent. The registry is the single
//! merge point and the place where argument validation happens.

use crate::error::{RegistryError, ToolError};
use crate::provider::ToolDefinition;
use crate::schema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the engine's tool_call id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content fed back to the reasoning engine
    pub output: String,

    /// Optional structured payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// A successful result carrying a structured payload.
    pub fn ok(payload: serde_json::Value) -> Self {
        let output = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
        Self {
            success: true,
            output,
            data: Some(payload),
        }
    }

    /// A failed result with a message describing what went wrong.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            data: None,
        }
    }
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "create_issue").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the reasoning engine).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for the reasoning engine.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Where a registered tool came from. Used to report name collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOrigin {
    /// Discovered from the remote tool server catalog
    Remote,
    /// Statically declared GitHub REST operation
    Github,
    /// A nested agent wrapped as a tool
    Agent,
}

impl std::fmt::Display for ToolOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote catalog"),
            Self::Github => write!(f, "github"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

struct Registered {
    tool: Box<dyn Tool>,
    origin: ToolOrigin,
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the reasoning engine
/// 2. Validate and execute tool calls the engine requests
///
/// Names must be unique across the merged set; a collision is an error that
/// names both sources rather than a silent last-wins overwrite.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Registered>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, rejecting duplicates.
    pub fn register(
        &mut self,
        tool: Box<dyn Tool>,
        origin: ToolOrigin,
    ) -> std::result::Result<(), RegistryError> {
        let name = tool.name().to_string();
        if let Some(existing) = self.tools.get(&name) {
            return Err(RegistryError::Duplicate {
                name,
                existing: existing.origin.to_string(),
                incoming: origin.to_string(),
            });
        }
        self.tools.insert(name, Registered { tool, origin });
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|r| r.tool.as_ref())
    }

    /// Get all tool definitions (for the reasoning engine), in name order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|r| r.tool.to_definition()).collect()
    }

    /// Execute a tool call.
    ///
    /// The arguments are validated against the tool's declared schema before
    /// the tool runs; a tool never sees arguments its schema rejects.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let registered = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        schema::validate_arguments(&registered.tool.parameters_schema(), &call.arguments)?;
        registered.tool.execute(call.arguments.clone()).await
    }

    /// List all registered tool names, in name order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
