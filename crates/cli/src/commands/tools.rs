//! The tools command: print the catalog the agent would see.

use octoagent_config::AppConfig;
use octoagent_mcp::McpClient;
use std::path::Path;

pub async fn run(remote: bool, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path)?;

    if remote {
        let client = McpClient::new(super::server_command(&config));
        client.start().await?;
        let catalog = client.list_tools().await?;

        println!("{} tools available from the tool server:", catalog.len());
        for descriptor in &catalog {
            println!("  {} — {}", descriptor.display_name(), descriptor.describe());
        }
        client.stop().await;
    } else {
        let ctx = super::github_context(&config)?;
        let registry = octoagent_github::registry(&ctx)?;

        println!(
            "{} built-in tools, scoped to {}:",
            registry.len(),
            config.github.username
        );
        for definition in registry.definitions() {
            println!("  {} — {}", definition.name, definition.description);
        }
    }

    Ok(())
}
