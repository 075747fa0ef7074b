//! Error types for the octoagent domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own enum; the split keeps fatal-at-the-boundary conditions
//! (a tool server that never came up, missing configuration) apart from
//! recoverable per-call failures, which the agent loop turns into
//! observations instead of propagating.

use thiserror::Error;

/// The top-level error type for all octoagent operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Tool server error: {0}")]
    Mcp(#[from] McpError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the remote tool protocol client.
#[derive(Debug, Error)]
pub enum McpError {
    /// The child process could not be spawned, or never answered the
    /// handshake. Fatal to the client instance: the caller must not go on
    /// to list or invoke tools.
    #[error("tool server startup failed: {0}")]
    Startup(String),

    /// The decoded response id does not match the id of the request in
    /// flight. Strict request/response alternation is the protocol's only
    /// correlation mechanism, so a mismatch means the stream is no longer
    /// trustworthy.
    #[error("protocol desync: sent request id {sent}, received response id {received}")]
    Desync { sent: i64, received: String },

    /// I/O failure or deadline expiry on the pipe.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A response that decoded but did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Undecodable provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// The call addressed a resource outside the authenticated identity.
    /// Raised at the tool boundary, before any network traffic.
    #[error("scope violation: cannot access resources owned by '{owner}' (authenticated as '{identity}')")]
    ScopeViolation { owner: String, identity: String },

    /// Non-2xx REST response. Carries status and body so the reasoning
    /// engine can adapt to what actually went wrong.
    #[error("GitHub API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Tool execution failed: {tool} — {reason}")]
    ExecutionFailed { tool: String, reason: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two tools claimed the same name. The sources are named so the
    /// collision can be traced to the remote catalog, the static set, or a
    /// wrapped agent.
    #[error("duplicate tool name '{name}': already registered by {existing}, rejected from {incoming}")]
    Duplicate {
        name: String,
        existing: String,
        incoming: String,
    },
}
