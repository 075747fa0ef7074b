//! Remote tool protocol client for octoagent.
//!
//! Talks to a subprocess-hosted tool server over newline-delimited JSON-RPC
//! on stdio: spawn, handshake, catalog, invoke, stop. The catalog entries
//! become [`RemoteTool`] adapters so the agent loop calls remote and static
//! tools through one interface.
//!
//! The protocol assumes strict request/response alternation on a single
//! pipe. Every read is bounded by a deadline and every response id is
//! checked against the request in flight; a server that breaks the
//! discipline surfaces as a desync failure instead of a silent mismatch.

pub mod client;
pub mod pipe;
pub mod protocol;
pub mod remote_tool;

pub use client::{McpClient, ServerCommand};
pub use pipe::RpcPipe;
pub use protocol::{RpcRequest, RpcResponse, ToolDescriptor};
pub use remote_tool::{RemoteTool, build_remote_tools};
