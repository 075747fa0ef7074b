//! The agent reasoning loop.
//!
//! A bounded think-act-observe cycle: the engine proposes either tool calls
//! or a final answer; tool calls are executed through the registry and their
//! results fed back as observations. Every failure mode inside the turn —
//! unknown tool, failed execution, malformed engine output, provider error,
//! exhausted step budget — resolves to an observation or a degraded final
//! answer. Nothing escapes the loop except by design: a turn always ends
//! with text for the user.
//!
//! Executed actions are not compensated. A tool that mutated remote state
//! before a later step failed stays executed; the trace records what
//! happened and the engine (or the user) decides what to do next.

use crate::step::{AgentStep, TurnResult};
use octoagent_core::message::{Conversation, Message, Role};
use octoagent_core::provider::{Provider, ProviderRequest};
use octoagent_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str = "You are octoagent, an assistant for a single GitHub account. \
     You have tools for repositories, issues, and user data. Every tool is \
     limited to the authenticated user's own account; do not attempt to \
     address other accounts. Use tools when they help, then answer concisely.";

/// The orchestration loop binding a reasoning engine to a tool set.
pub struct AgentLoop {
    /// The reasoning engine
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// System prompt injected as the first message
    system_prompt: String,

    /// Step ceiling per user turn
    max_steps: u32,
}

impl AgentLoop {
    /// Create a new loop with default settings.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            tools,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_steps: 10,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the step ceiling. Sub-agents get a lower one so they fail fast
    /// instead of consuming the parent's budget.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Run one user turn to completion.
    ///
    /// Always produces an answer; failure modes degrade, they do not
    /// propagate.
    pub async fn run(&self, user_message: &str, conversation: &mut Conversation) -> TurnResult {
        if conversation.messages.first().map(|m| m.role) != Some(Role::System) {
            conversation
                .messages
                .insert(0, Message::system(&self.system_prompt));
        }
        conversation.push(Message::user(user_message));

        let tool_definitions = self.tools.definitions();
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut tool_calls_made = 0usize;

        info!(
            conversation_id = %conversation.id,
            max_steps = self.max_steps,
            tools = tool_definitions.len(),
            "Agent turn starting"
        );

        for step_index in 0..self.max_steps {
            debug!(conversation_id = %conversation.id, step = step_index, "Thinking");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(conversation_id = %conversation.id, "Reasoning engine failed: {e}");
                    let answer = degraded_answer(&format!("the reasoning engine failed: {e}"));
                    conversation.push(Message::assistant(&answer));
                    steps.push(AgentStep::finished(&answer));
                    return TurnResult {
                        answer,
                        steps,
                        tool_calls_made,
                        reached_ceiling: false,
                    };
                }
            };

            let message = response.message;

            // No tool calls: the engine is done.
            if message.tool_calls.is_empty() {
                let answer = message.content.clone();
                conversation.push(message);
                steps.push(AgentStep::finished(&answer));
                info!(
                    conversation_id = %conversation.id,
                    steps = steps.len(),
                    tool_calls = tool_calls_made,
                    "Agent turn finished"
                );
                return TurnResult {
                    answer,
                    steps,
                    tool_calls_made,
                    reached_ceiling: false,
                };
            }

            let thought = message.content.clone();
            let proposed = message.tool_calls.clone();
            conversation.push(message);

            for tc in &proposed {
                // Arguments the engine emitted that are not valid JSON are a
                // reasoning-format failure: the turn cannot sensibly
                // continue on a half-understood action.
                let arguments: serde_json::Value = match serde_json::from_str(&tc.arguments) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(tool = %tc.name, "Engine emitted unparsable arguments: {e}");
                        let answer = degraded_answer(&format!(
                            "the reasoning engine produced malformed arguments for '{}'",
                            tc.name
                        ));
                        conversation.push(Message::assistant(&answer));
                        steps.push(AgentStep::finished(&answer));
                        return TurnResult {
                            answer,
                            steps,
                            tool_calls_made,
                            reached_ceiling: false,
                        };
                    }
                };

                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments,
                };

                tool_calls_made += 1;
                let observation = match self.tools.execute(&call).await {
                    Ok(result) if result.success => result.output,
                    Ok(result) => format!("Error: {}", result.output),
                    Err(e) => {
                        warn!(tool = %call.name, "Tool failed: {e}");
                        format!("Error: {e}")
                    }
                };

                conversation.push(Message::tool_result(&tc.id, &observation));
                steps.push(AgentStep::acted(&thought, call, observation));
            }
        }

        // Step ceiling reached without a final answer: last-resort reply
        // instead of a hang or an unanswered turn.
        warn!(
            conversation_id = %conversation.id,
            ceiling = self.max_steps,
            "Step ceiling reached without a final answer"
        );
        let answer = degraded_answer("I ran out of reasoning steps");
        conversation.push(Message::assistant(&answer));
        TurnResult {
            answer,
            steps,
            tool_calls_made,
            reached_ceiling: true,
        }
    }
}

fn degraded_answer(reason: &str) -> String {
    format!("I couldn't complete this request: {reason}. You can rephrase or try again.")
}


#[cfg(test)]
mod tests {
    use super::test_support::{LoopingProvider, ScriptedProvider};
    use super::*;
    use async_trait::async_trait;
    use octoagent_core::error::ToolError;
    use octoagent_core::tool::{Tool, ToolOrigin, ToolResult};

    struct CountingTool {
        calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "probe"
        }
        fn description(&self) -> &str {
            "Records invocations"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(ToolResult {
                success: true,
                output: "probed".into(),
                data: None,
            })
        }
    }

    fn registry_with_probe() -> (Arc<ToolRegistry>, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(CountingTool { calls: calls.clone() }), ToolOrigin::Github)
            .unwrap();
        (Arc::new(registry), calls)
    }

    #[tokio::test]
    async fn n_actions_then_final_runs_n_observation_cycles() {
        let (tools, calls) = registry_with_probe();
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::action("c1", "probe", "{}"),
            ScriptedProvider::action("c2", "probe", "{}"),
            ScriptedProvider::action("c3", "probe", "{}"),
            ScriptedProvider::answer("All checks passed."),
        ]));

        let agent = AgentLoop::new(provider, "scripted", tools);
        let mut conv = Conversation::new();
        let result = agent.run("run the checks", &mut conv).await;

        assert_eq!(result.answer, "All checks passed.");
        assert_eq!(result.tool_calls_made, 3);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
        assert!(!result.reached_ceiling);
        assert!(result.steps.last().unwrap().is_final);
        // 3 acted steps + 1 final
        assert_eq!(result.steps.len(), 4);
    }

    #[tokio::test]
    async fn engine_that_never_finishes_hits_the_ceiling() {
        let (tools, _calls) = registry_with_probe();
        let provider = Arc::new(LoopingProvider { tool: "probe".into() });

        let agent = AgentLoop::new(provider, "scripted", tools).with_max_steps(4);
        let mut conv = Conversation::new();
        let result = agent.run("loop forever", &mut conv).await;

        assert!(result.reached_ceiling);
        assert_eq!(result.tool_calls_made, 4);
        assert!(result.answer.contains("couldn't complete"));
        // The degraded answer still lands in the conversation.
        assert_eq!(conv.messages.last().unwrap().content, result.answer);
    }

    #[tokio::test]
    async fn unknown_tool_becomes_an_observation_and_the_loop_continues() {
        let (tools, _calls) = registry_with_probe();
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::action("c1", "no_such_tool", "{}"),
            ScriptedProvider::answer("Recovered."),
        ]));

        let agent = AgentLoop::new(provider, "scripted", tools);
        let mut conv = Conversation::new();
        let result = agent.run("try something", &mut conv).await;

        assert_eq!(result.answer, "Recovered.");
        let observation = result.steps[0].observation.as_ref().unwrap();
        assert!(observation.contains("Error"));
        assert!(observation.contains("no_such_tool"));
    }

    struct StrictTool;

    #[async_trait]
    impl Tool for StrictTool {
        fn name(&self) -> &str {
            "strict"
        }
        fn description(&self) -> &str {
            "Requires a text argument"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
        async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult {
                success: true,
                output: "ran".into(),
                data: None,
            })
        }
    }

    #[tokio::test]
    async fn schema_rejection_becomes_an_observation() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(StrictTool), ToolOrigin::Github)
            .unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            // Valid JSON, but the schema gate rejects the missing field.
            ScriptedProvider::action("c1", "strict", "{}"),
            ScriptedProvider::answer("Done."),
        ]));

        let agent = AgentLoop::new(provider, "scripted", Arc::new(registry));
        let mut conv = Conversation::new();
        let result = agent.run("go", &mut conv).await;

        assert_eq!(result.answer, "Done.");
        let observation = result.steps[0].observation.as_ref().unwrap();
        assert!(observation.contains("Error"));
        assert!(observation.contains("text"));
    }

    #[tokio::test]
    async fn malformed_argument_json_degrades_the_turn() {
        let (tools, calls) = registry_with_probe();
        let provider = Arc::new(ScriptedProvider::new(vec![ScriptedProvider::action(
            "c1",
            "probe",
            "{not json",
        )]));

        let agent = AgentLoop::new(provider, "scripted", tools);
        let mut conv = Conversation::new();
        let result = agent.run("go", &mut conv).await;

        assert!(result.answer.contains("malformed arguments"));
        assert!(!result.reached_ceiling);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(result.steps.last().unwrap().is_final);
    }

    #[tokio::test]
    async fn provider_error_degrades_the_turn() {
        let (tools, _calls) = registry_with_probe();
        let provider = Arc::new(ScriptedProvider::new(vec![]));

        let agent = AgentLoop::new(provider, "scripted", tools);
        let mut conv = Conversation::new();
        let result = agent.run("go", &mut conv).await;

        assert!(result.answer.contains("reasoning engine failed"));
        assert!(!result.reached_ceiling);
    }

    #[tokio::test]
    async fn system_prompt_is_inserted_once() {
        let (tools, _calls) = registry_with_probe();
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::answer("first"),
            ScriptedProvider::answer("second"),
        ]));

        let agent = AgentLoop::new(provider, "scripted", tools);
        let mut conv = Conversation::new();
        agent.run("one", &mut conv).await;
        agent.run("two", &mut conv).await;

        let system_count = conv
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .count();
        assert_eq!(system_count, 1);
        assert_eq!(conv.messages[0].role, Role::System);
    }
}
