//! Agents as tools.
//!
//! [`AgentTool`] wraps a whole loop behind the `Tool` trait: the argument
//! is a free-text request, the result is the sub-agent's answer. The
//! supervisor topology is three scoped loops (repositories, issues, users)
//! mounted as the only tools of a top-level loop — the same control
//! structure at both levels, which is exactly what the capability-style
//! `Tool` trait buys.

use crate::loop_runner::AgentLoop;
use async_trait::async_trait;
use octoagent_config::AgentSettings;
use octoagent_core::message::Conversation;
use octoagent_core::provider::Provider;
use octoagent_core::tool::{Tool, ToolOrigin, ToolRegistry};
use octoagent_core::{RegistryError, ToolError, ToolResult};
use octoagent_github::GithubContext;
use std::sync::Arc;
use tracing::debug;

/// A nested agent, callable like any other tool.
pub struct AgentTool {
    name: String,
    description: String,
    agent: AgentLoop,
}

impl AgentTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, agent: AgentLoop) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            agent,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": "The task for this agent, in plain language"
                }
            },
            "required": ["request"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let request = arguments
            .get("request")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                ToolError::InvalidArguments("missing required argument 'request'".into())
            })?;

        debug!(agent = %self.name, "Delegating sub-task");

        // Each delegation is a fresh single-turn conversation; sub-agents
        // carry no state between calls.
        let mut conversation = Conversation::new();
        let result = self.agent.run(request, &mut conversation).await;

        Ok(ToolResult {
            // A ceiling-limited sub-turn is a failed delegation: the parent
            // should see that rather than mistake the fallback for an answer.
            success: !result.reached_ceiling,
            output: result.answer,
            data: None,
        })
    }
}

fn scoped_prompt(domain: &str) -> String {
    format!(
        "You are a focused GitHub {domain} agent working on the authenticated \
         user's account only. Complete the requested task with your tools and \
         reply with a concise result."
    )
}

/// The three scoped sub-agents, registered as the tools of a supervisor.
pub fn supervisor_registry(
    provider: Arc<dyn Provider>,
    model: &str,
    ctx: &Arc<GithubContext>,
    settings: &AgentSettings,
) -> Result<ToolRegistry, RegistryError> {
    let scoped: [(&str, &str, Vec<Box<dyn Tool>>); 3] = [
        (
            "repository_agent",
            "Handles repository tasks: create repositories and branches, read, \
             write and delete files, fork, search. Pass the task as plain text.",
            octoagent_github::repo_tools(ctx),
        ),
        (
            "issue_agent",
            "Handles issue tasks: create, read, list, close, comment, search. \
             Pass the task as plain text.",
            octoagent_github::issue_tools(ctx),
        ),
        (
            "user_agent",
            "Handles account tasks: profile, followers, following, repository \
             listings. Pass the task as plain text.",
            octoagent_github::user_tools(ctx),
        ),
    ];

    let mut top = ToolRegistry::new();
    for (name, description, tools) in scoped {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool, ToolOrigin::Github)?;
        }
        let domain = name.trim_end_matches("_agent").replace('_', " ");
        let agent = AgentLoop::new(provider.clone(), model, Arc::new(registry))
            .with_system_prompt(scoped_prompt(&domain))
            .with_max_steps(settings.sub_agent_max_steps);
        top.register(Box::new(AgentTool::new(name, description, agent)), ToolOrigin::Agent)?;
    }

    Ok(top)
}

/// Build the delegation topology: three scoped sub-agents over the GitHub
/// tool sets, mounted as the only tools of one top-level loop.
pub fn build_supervisor(
    provider: Arc<dyn Provider>,
    model: &str,
    ctx: &Arc<GithubContext>,
    settings: &AgentSettings,
) -> Result<AgentLoop, RegistryError> {
    let top = supervisor_registry(provider.clone(), model, ctx, settings)?;

    Ok(AgentLoop::new(provider, model, Arc::new(top))
        .with_system_prompt(
            "You are octoagent, a coordinator for a single GitHub account. \
             Decompose the user's request and delegate each part to the \
             matching specialist agent, then combine their replies into one \
             answer.",
        )
        .with_max_steps(settings.max_steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loop_runner::test_support::ScriptedProvider;
    use octoagent_github::transport::{GithubRequest, GithubTransport};
    use octoagent_github::{GithubContext, ScopeGuard};
    use serde_json::json;

    struct NullTransport;

    #[async_trait]
    impl GithubTransport for NullTransport {
        async fn execute(&self, _request: GithubRequest) -> Result<serde_json::Value, ToolError> {
            Ok(json!({"ok": true}))
        }
    }

    fn github_ctx() -> Arc<GithubContext> {
        GithubContext::new(Arc::new(NullTransport), ScopeGuard::new("alice"))
    }

    #[tokio::test]
    async fn agent_tool_round_trip() {
        // Sub-agent: immediately answers.
        let sub_provider = Arc::new(ScriptedProvider::new(vec![ScriptedProvider::answer(
            "demo has 3 branches",
        )]));
        let sub = AgentLoop::new(sub_provider, "scripted", Arc::new(ToolRegistry::new()));
        let tool = AgentTool::new("repository_agent", "repo specialist", sub);

        let result = tool
            .execute(json!({"request": "how many branches does demo have?"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "demo has 3 branches");
    }

    #[tokio::test]
    async fn agent_tool_requires_a_request() {
        let sub = AgentLoop::new(
            Arc::new(ScriptedProvider::new(vec![])),
            "scripted",
            Arc::new(ToolRegistry::new()),
        );
        let tool = AgentTool::new("issue_agent", "issue specialist", sub);

        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn ceiling_limited_sub_turn_reports_failure() {
        use crate::loop_runner::test_support::LoopingProvider;

        // A sub-agent that loops forever on a probe-less registry: every
        // proposed call fails, and the sub-turn ends at its ceiling.
        let sub_provider = Arc::new(LoopingProvider {
            tool: "missing".into(),
        });
        let sub = AgentLoop::new(sub_provider, "scripted", Arc::new(ToolRegistry::new()))
            .with_max_steps(2);
        let tool = AgentTool::new("user_agent", "user specialist", sub);

        let result = tool.execute(json!({"request": "spin"})).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("couldn't complete"));
    }

    #[tokio::test]
    async fn supervisor_delegates_through_a_nested_loop() {
        // Script shared by the top loop and the sub-loops, in call order:
        // 1. top proposes a delegation to the issue agent
        // 2. the issue agent (same provider) proposes nothing and answers
        // 3. top combines and finishes
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::action(
                "c1",
                "issue_agent",
                r#"{"request": "list open issues in demo"}"#,
            ),
            ScriptedProvider::answer("demo has no open issues"),
            ScriptedProvider::answer("Nothing is open in demo."),
        ]));

        let supervisor = build_supervisor(
            provider,
            "scripted",
            &github_ctx(),
            &AgentSettings::default(),
        )
        .unwrap();

        let mut conv = Conversation::new();
        let result = supervisor.run("anything open in demo?", &mut conv).await;

        assert_eq!(result.answer, "Nothing is open in demo.");
        assert_eq!(result.tool_calls_made, 1);
        let observation = result.steps[0].observation.as_ref().unwrap();
        assert!(observation.contains("no open issues"));
    }

    #[test]
    fn supervisor_registry_is_exactly_the_three_agents() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let registry = supervisor_registry(
            provider,
            "scripted",
            &github_ctx(),
            &AgentSettings::default(),
        )
        .unwrap();
        assert_eq!(
            registry.names(),
            vec!["issue_agent", "repository_agent", "user_agent"]
        );
    }
}
