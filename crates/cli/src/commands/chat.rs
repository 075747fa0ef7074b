//! The chat command: single-shot queries and the interactive console.

use octoagent_agent::{AgentLoop, build_supervisor};
use octoagent_config::AppConfig;
use octoagent_core::message::Conversation;
use octoagent_core::provider::Provider;
use octoagent_core::tool::{ToolOrigin, ToolRegistry};
use octoagent_mcp::{McpClient, build_remote_tools};
use octoagent_providers::OpenAiCompatProvider;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

pub async fn run(
    message: Option<String>,
    remote: bool,
    multi: bool,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path)?;

    let provider: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::new(
        "openrouter",
        &config.llm.base_url,
        &config.llm.api_key,
    )?);

    // Held so the server can be shut down in order on the way out.
    let mut mcp_client: Option<Arc<McpClient>> = None;

    let mut agent = if multi {
        let ctx = super::github_context(&config)?;
        build_supervisor(provider, &config.llm.model, &ctx, &config.agent)?
    } else if remote {
        let client = Arc::new(McpClient::new(super::server_command(&config)));
        // Startup failure is fatal here, at the outermost boundary.
        client.start().await?;

        let mut registry = ToolRegistry::new();
        for tool in build_remote_tools(&client).await? {
            registry.register(Box::new(tool), ToolOrigin::Remote)?;
        }
        println!("Using {} tools from the tool server.", registry.len());
        mcp_client = Some(client);

        AgentLoop::new(provider, &config.llm.model, Arc::new(registry))
            .with_max_steps(config.agent.max_steps)
    } else {
        let ctx = super::github_context(&config)?;
        let registry = octoagent_github::registry(&ctx)?;
        println!(
            "Using {} built-in tools, scoped to {}.",
            registry.len(),
            config.github.username
        );
        AgentLoop::new(provider, &config.llm.model, Arc::new(registry))
            .with_max_steps(config.agent.max_steps)
    };

    agent = agent.with_temperature(config.llm.temperature);
    if let Some(max_tokens) = config.llm.max_tokens {
        agent = agent.with_max_tokens(max_tokens);
    }

    match message {
        Some(text) => {
            let mut conversation = Conversation::new();
            let result = agent.run(&text, &mut conversation).await;
            println!("{}", result.answer);
        }
        None => interactive(&agent).await?,
    }

    if let Some(client) = &mcp_client {
        client.stop().await;
    }
    Ok(())
}

/// The console loop. A Ctrl-C lands here, not mid-turn: the loop exits and
/// the caller shuts the tool server down before the process ends.
async fn interactive(agent: &AgentLoop) -> std::io::Result<()> {
    println!("\n=== octoagent ===");
    println!("Type 'exit' to quit, 'help' for commands.");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut conversation = Conversation::new();

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nInterrupted.");
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else { break };
        let input = line.trim();

        match input {
            "" => continue,
            "exit" | "quit" => break,
            "help" => {
                println!("\nCommands:");
                println!("  help        Show this message");
                println!("  clear       Clear the screen");
                println!("  exit, quit  Leave the console");
                println!("  anything else is sent to the agent");
            }
            "clear" => {
                print!("\x1b[2J\x1b[1;1H");
                std::io::stdout().flush()?;
            }
            _ => {
                println!("\nAgent is thinking...");
                let result = agent.run(input, &mut conversation).await;
                println!("\nAgent: {}", result.answer);
            }
        }
    }

    Ok(())
}
