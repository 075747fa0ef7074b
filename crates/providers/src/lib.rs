//! Reasoning engine backends for octoagent.
//!
//! One implementation covers the field: most hosted engines (OpenRouter,
//! OpenAI, and their compatibles) expose the same chat-completions shape.
//! The loop consumes them through the [`octoagent_core::Provider`] trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
