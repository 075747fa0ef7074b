//! Statically-typed GitHub REST tools for octoagent.
//!
//! Nineteen operations across repositories, issues, and users, every one of
//! them bound to the single authenticated identity by the scope enforcer.
//! Registration is an explicit static list — no directory scanning, no
//! import-time side effects — so a name collision is caught the moment the
//! registry is built.

mod args;
pub mod issues;
pub mod repos;
pub mod scope;
pub mod transport;
pub mod users;

use octoagent_core::{RegistryError, Tool, ToolOrigin, ToolRegistry};
use std::sync::Arc;

pub use scope::ScopeGuard;
pub use transport::{GithubRequest, GithubTransport, HttpTransport, Method};

/// Shared state for every static tool: one transport, one identity.
pub struct GithubContext {
    pub transport: Arc<dyn GithubTransport>,
    pub scope: ScopeGuard,
}

impl GithubContext {
    pub fn new(transport: Arc<dyn GithubTransport>, scope: ScopeGuard) -> Arc<Self> {
        Arc::new(Self { transport, scope })
    }
}

/// The repository tool set.
pub fn repo_tools(ctx: &Arc<GithubContext>) -> Vec<Box<dyn Tool>> {
    repos::tools(ctx)
}

/// The issue tool set.
pub fn issue_tools(ctx: &Arc<GithubContext>) -> Vec<Box<dyn Tool>> {
    issues::tools(ctx)
}

/// The user tool set.
pub fn user_tools(ctx: &Arc<GithubContext>) -> Vec<Box<dyn Tool>> {
    users::tools(ctx)
}

/// Every static tool, in registration order.
pub fn all_tools(ctx: &Arc<GithubContext>) -> Vec<Box<dyn Tool>> {
    let mut tools = repos::tools(ctx);
    tools.extend(issues::tools(ctx));
    tools.extend(users::tools(ctx));
    tools
}

/// Build a registry holding the full static catalog.
pub fn registry(ctx: &Arc<GithubContext>) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    for tool in all_tools(ctx) {
        registry.register(tool, ToolOrigin::Github)?;
    }
    Ok(registry)
}
