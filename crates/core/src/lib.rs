//! # octoagent Core
//!
//! Domain types, traits, and error definitions for the octoagent GitHub
//! assistant. This crate has **zero framework dependencies** — it defines the
//! model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! The two seams of the system are traits defined here:
//! - [`Tool`] — a named, schema-bound capability. Remote MCP tools, static
//!   GitHub REST tools, and nested agents all implement it, which is what
//!   lets an agent be mounted as a tool inside another agent.
//! - [`Provider`] — the reasoning engine. Given a conversation and a tool
//!   catalog it proposes either a tool call or a final answer; everything
//!   behind that interface is a black box.

pub mod error;
pub mod message;
pub mod provider;
pub mod schema;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, McpError, ProviderError, RegistryError, Result, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolOrigin, ToolRegistry, ToolResult};
