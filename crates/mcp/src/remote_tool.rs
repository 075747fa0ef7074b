//! Adapter from a remote catalog entry to a locally invokable [`Tool`].

use crate::client::McpClient;
use crate::protocol::ToolDescriptor;
use async_trait::async_trait;
use octoagent_core::{Tool, ToolError, ToolResult};
use std::sync::Arc;

/// One remotely-described tool, callable through the shared client.
pub struct RemoteTool {
    client: Arc<McpClient>,
    id: String,
    name: String,
    description: String,
    schema: serde_json::Value,
}

impl RemoteTool {
    pub fn new(client: Arc<McpClient>, descriptor: &ToolDescriptor) -> Self {
        Self {
            client,
            id: descriptor.tool_id(),
            name: descriptor.display_name(),
            description: descriptor.describe(),
            schema: descriptor.schema(),
        }
    }
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.schema.clone()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        // Remote failures arrive as failed results, not errors: the loop
        // feeds them back as observations either way.
        Ok(self.client.invoke_tool(&self.id, arguments).await)
    }
}

/// Build one adapter per catalog entry.
///
/// The catalog is fetched (and cached) through the client; name collisions
/// are caught later when the adapters are registered.
pub async fn build_remote_tools(client: &Arc<McpClient>) -> Result<Vec<RemoteTool>, octoagent_core::McpError> {
    let descriptors = client.list_tools().await?;
    Ok(descriptors
        .iter()
        .map(|d| RemoteTool::new(client.clone(), d))
        .collect())
}
