pub mod chat;
pub mod tools;

use octoagent_config::AppConfig;
use octoagent_github::{GithubContext, HttpTransport, ScopeGuard};
use octoagent_mcp::ServerCommand;
use std::sync::Arc;

/// Build the shared GitHub context from resolved configuration.
pub(crate) fn github_context(
    config: &AppConfig,
) -> Result<Arc<GithubContext>, octoagent_core::ToolError> {
    let transport = HttpTransport::new(&config.github.api_base, &config.github.token)?;
    Ok(GithubContext::new(
        Arc::new(transport),
        ScopeGuard::new(&config.github.username),
    ))
}

/// Build the tool server launch command from resolved configuration.
pub(crate) fn server_command(config: &AppConfig) -> ServerCommand {
    let mut command = ServerCommand::docker(&config.server.image, &config.github.token);
    command.program = config.server.program.clone();
    command
}
