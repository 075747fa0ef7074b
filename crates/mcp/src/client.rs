//! The tool server client: process lifecycle plus the RPC surface.
//!
//! Owns exactly one child process and one stdio pipe. All calls are
//! serialized through an internal mutex because correlation relies on
//! strict request/response alternation — two interleaved writers would
//! scramble it. Mid-call cancellation is unsupported: dropping a `call`
//! future mid-roundtrip leaves an unread response on the pipe.

use crate::pipe::{DEFAULT_READ_DEADLINE, RpcPipe};
use crate::protocol::{
    METHOD_INITIALIZE, METHOD_INVOKE_TOOL, METHOD_LIST_TOOLS, RpcRequest, RpcResponse,
    ToolDescriptor,
};
use octoagent_core::{McpError, ToolResult};
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Handshake bound: generous enough to cover a container image pull.
const HANDSHAKE_DEADLINE: Duration = Duration::from_secs(60);

/// How long `stop` waits for the child to exit after the kill signal.
const STOP_GRACE: Duration = Duration::from_secs(2);

/// How to launch the tool server process.
#[derive(Clone)]
pub struct ServerCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Environment entries set on the spawned process itself.
    pub env: Vec<(String, String)>,
}

impl ServerCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
        }
    }

    /// The standard recipe: run the containerized tool server with the
    /// access credential injected into the container environment. The
    /// published port is reserved for future use; the protocol itself runs
    /// on stdio.
    pub fn docker(image: &str, token: &str) -> Self {
        Self::new(
            "docker",
            vec![
                "run".into(),
                "-i".into(),
                "--rm".into(),
                "-p".into(),
                "3000:3000".into(),
                "-e".into(),
                format!("GITHUB_PERSONAL_ACCESS_TOKEN={token}"),
                image.into(),
            ],
        )
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

// The args may embed the access credential; keep it out of logs.
impl std::fmt::Debug for ServerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCommand")
            .field("program", &self.program)
            .field("args", &"[REDACTED]")
            .finish()
    }
}

struct Inner {
    child: Option<Child>,
    pipe: Option<RpcPipe>,
    next_id: i64,
}

/// Client for a tool server speaking the line-delimited JSON-RPC protocol
/// over subprocess stdio.
pub struct McpClient {
    command: ServerCommand,
    inner: Mutex<Inner>,
    /// Tool catalog, fetched at most once per client lifetime.
    catalog: Mutex<Option<Vec<ToolDescriptor>>>,
    read_deadline: Duration,
}

impl McpClient {
    pub fn new(command: ServerCommand) -> Self {
        Self {
            command,
            inner: Mutex::new(Inner {
                child: None,
                pipe: None,
                next_id: 0,
            }),
            catalog: Mutex::new(None),
            read_deadline: DEFAULT_READ_DEADLINE,
        }
    }

    /// Override the per-call response deadline.
    pub fn with_read_deadline(mut self, deadline: Duration) -> Self {
        self.read_deadline = deadline;
        self
    }

    /// Attach to an already-connected server pipe instead of spawning one.
    /// Used by tests and in-process servers; `start`/`stop` manage no child
    /// in this mode.
    pub fn connected(pipe: RpcPipe) -> Self {
        Self {
            command: ServerCommand::new("<connected>", Vec::new()),
            inner: Mutex::new(Inner {
                child: None,
                pipe: Some(pipe),
                next_id: 0,
            }),
            catalog: Mutex::new(None),
            read_deadline: DEFAULT_READ_DEADLINE,
        }
    }

    /// Launch the tool server and perform the `initialize` handshake.
    ///
    /// Idempotent: calling on a running instance logs and returns.
    pub async fn start(&self) -> Result<(), McpError> {
        let mut inner = self.inner.lock().await;
        self.start_locked(&mut inner).await
    }

    async fn start_locked(&self, inner: &mut Inner) -> Result<(), McpError> {
        if inner.pipe.is_some() {
            debug!("tool server already running");
            return Ok(());
        }

        info!(program = %self.command.program, "Starting tool server");
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.command.env {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::Startup(format!("failed to spawn {}: {e}", self.command.program)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Startup("child stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Startup("child stdout unavailable".into()))?;

        let mut pipe = RpcPipe::new(stdout, stdin).with_read_deadline(HANDSHAKE_DEADLINE);

        let id = inner.next_id;
        inner.next_id += 1;
        let handshake = RpcRequest::new(
            id,
            METHOD_INITIALIZE,
            json!({
                "clientInfo": {
                    "name": "octoagent",
                    "version": env!("CARGO_PKG_VERSION"),
                }
            }),
        );

        match pipe.roundtrip(&handshake).await {
            Ok(_) => {
                pipe.set_read_deadline(self.read_deadline);
                inner.pipe = Some(pipe);
                inner.child = Some(child);
                info!("tool server initialized");
                Ok(())
            }
            Err(e) => {
                let _ = child.start_kill();
                Err(McpError::Startup(format!("handshake failed: {e}")))
            }
        }
    }

    /// Terminate the tool server. Safe to call repeatedly; waits at most a
    /// short grace period for the child to exit.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        inner.pipe = None;
        if let Some(mut child) = inner.child.take() {
            info!("Stopping tool server");
            if let Err(e) = child.start_kill() {
                warn!("failed to signal tool server: {e}");
            }
            if tokio::time::timeout(STOP_GRACE, child.wait()).await.is_err() {
                warn!("tool server did not exit within grace period");
            }
        } else {
            debug!("tool server already stopped");
        }
    }

    /// Whether a child process handle is currently held.
    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.pipe.is_some()
    }

    /// Send one request and return its response envelope.
    ///
    /// Starts the server lazily. Transport and decode failures come back as
    /// an error-carrying envelope rather than an `Err`: the reasoning loop
    /// treats protocol breakage as an observation it can react to.
    pub async fn call(&self, method: &str, params: Value) -> RpcResponse {
        let mut inner = self.inner.lock().await;

        if inner.pipe.is_none() {
            if let Err(e) = self.start_locked(&mut inner).await {
                warn!(method, "tool server unavailable: {e}");
                return RpcResponse::failure(format!("tool server unavailable: {e}"));
            }
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let request = RpcRequest::new(id, method, params);

        let Some(pipe) = inner.pipe.as_mut() else {
            return RpcResponse::failure("tool server not connected");
        };

        match pipe.roundtrip(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(method, id, "rpc failed: {e}");
                RpcResponse::failure(e.to_string())
            }
        }
    }

    /// Fetch the tool catalog, at most once per client lifetime.
    ///
    /// The catalog is assumed static per server instance, so the first
    /// successful fetch is cached and never invalidated within a session.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        // Hold the catalog lock across the fetch so concurrent callers
        // cannot race a second catalog request.
        let mut catalog = self.catalog.lock().await;
        if let Some(tools) = catalog.as_ref() {
            return Ok(tools.clone());
        }

        let response = self.call(METHOD_LIST_TOOLS, json!({})).await;
        if response.is_error() {
            return Err(McpError::Protocol(format!(
                "tools/list failed: {}",
                response.error_text()
            )));
        }

        let tools_value = response
            .result
            .as_ref()
            .and_then(|r| r.get("tools"))
            .cloned()
            .ok_or_else(|| McpError::Protocol("tools/list result missing 'tools'".into()))?;

        let tools: Vec<ToolDescriptor> = serde_json::from_value(tools_value)
            .map_err(|e| McpError::Protocol(format!("undecodable tool catalog: {e}")))?;

        info!(count = tools.len(), "Fetched tool catalog");
        *catalog = Some(tools.clone());
        Ok(tools)
    }

    /// Execute one remote tool.
    pub async fn invoke_tool(&self, tool_id: &str, params: Value) -> ToolResult {
        let response = self
            .call(METHOD_INVOKE_TOOL, json!({"toolId": tool_id, "params": params}))
            .await;

        if response.is_error() {
            return ToolResult::failure(response.error_text());
        }
        match response.result {
            Some(result) => ToolResult::ok(result),
            None => ToolResult::failure("response carried neither result nor error"),
        }
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        // Last-resort cleanup; orderly shutdown goes through stop().
        if let Ok(mut inner) = self.inner.try_lock() {
            if let Some(child) = inner.child.as_mut() {
                let _ = child.start_kill();
            }
        }
    }
}
