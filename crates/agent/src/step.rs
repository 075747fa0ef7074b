//! The step trace: what the agent thought, did, and saw, per iteration.

use octoagent_core::ToolCall;
use serde::{Deserialize, Serialize};

/// One iteration of the loop. A step either proposes and observes an
/// action, or carries the final answer (`is_final`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    /// The engine's reasoning text accompanying this step (may be empty —
    /// engines often emit tool calls with no prose).
    pub thought: String,

    /// The proposed tool call, if this step acted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ToolCall>,

    /// What came back: tool output on success, a failure description
    /// otherwise. Always fed to the engine verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    /// Whether this step ended the turn.
    pub is_final: bool,
}

impl AgentStep {
    pub fn acted(thought: &str, action: ToolCall, observation: String) -> Self {
        Self {
            thought: thought.to_string(),
            action: Some(action),
            observation: Some(observation),
            is_final: false,
        }
    }

    pub fn finished(answer: &str) -> Self {
        Self {
            thought: answer.to_string(),
            action: None,
            observation: None,
            is_final: true,
        }
    }
}

/// The outcome of one user turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// The final answer — the engine's own, or a degraded fallback when
    /// the turn failed.
    pub answer: String,

    /// The full trace, in order.
    pub steps: Vec<AgentStep>,

    /// Tool executions performed during the turn.
    pub tool_calls_made: usize,

    /// True when the turn ended at the step ceiling instead of a final
    /// answer.
    pub reached_ceiling: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_constructors() {
        let step = AgentStep::finished("done");
        assert!(step.is_final);
        assert!(step.action.is_none());

        let call = ToolCall {
            id: "c1".into(),
            name: "get_user".into(),
            arguments: serde_json::json!({}),
        };
        let step = AgentStep::acted("checking the profile", call, "{}".into());
        assert!(!step.is_final);
        assert_eq!(step.action.as_ref().unwrap().name, "get_user");
    }
}
