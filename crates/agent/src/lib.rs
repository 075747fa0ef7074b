//! The think-act-observe loop for octoagent.
//!
//! [`AgentLoop`] binds a reasoning engine to a tool registry and runs one
//! user turn at a time: engine proposes, registry executes, observation
//! feeds back, until a final answer or the step ceiling. The delegation
//! layer in [`delegate`] nests whole loops as tools of a supervisor loop.

pub mod delegate;
pub mod loop_runner;
pub mod step;

pub use delegate::{AgentTool, build_supervisor, supervisor_registry};
pub use loop_runner::AgentLoop;
pub use step::{AgentStep, TurnResult};
