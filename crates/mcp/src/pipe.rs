//! Line framing over the tool server's stdio.
//!
//! The protocol is strict request/response alternation over a single pipe:
//! write one line, flush, read one line. There is no message-length framing
//! and no concurrent reader, so correlation depends on the server never
//! emitting unsolicited output. The id check in [`RpcPipe::roundtrip`]
//! turns a violation of that assumption into a detectable desync instead of
//! silently mismatched answers.

use crate::protocol::{RpcRequest, RpcResponse};
use octoagent_core::McpError;
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Default bound on every response read. An unbounded read would turn a
/// malformed or wedged server into a hang.
pub const DEFAULT_READ_DEADLINE: Duration = Duration::from_secs(30);

type Reader = Box<dyn AsyncRead + Send + Unpin>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// One half-duplex JSON-RPC pipe: a buffered reader, a writer, and a read
/// deadline. Works over child-process stdio or an in-memory duplex stream.
pub struct RpcPipe {
    reader: BufReader<Reader>,
    writer: Writer,
    read_deadline: Duration,
}

impl RpcPipe {
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            reader: BufReader::new(Box::new(reader) as Reader),
            writer: Box::new(writer),
            read_deadline: DEFAULT_READ_DEADLINE,
        }
    }

    /// Override the per-read deadline (e.g., a longer handshake bound while
    /// a container image pulls and boots).
    pub fn with_read_deadline(mut self, deadline: Duration) -> Self {
        self.read_deadline = deadline;
        self
    }

    pub fn set_read_deadline(&mut self, deadline: Duration) {
        self.read_deadline = deadline;
    }

    /// Serialize and write one request line, then flush.
    pub async fn send(&mut self, request: &RpcRequest) -> Result<(), McpError> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| McpError::Protocol(format!("failed to encode request: {e}")))?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| McpError::Transport(format!("write failed: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| McpError::Transport(format!("flush failed: {e}")))?;
        Ok(())
    }

    /// Read exactly one response line within the deadline and decode it.
    pub async fn recv(&mut self) -> Result<RpcResponse, McpError> {
        let mut line = String::new();
        let read = tokio::time::timeout(self.read_deadline, self.reader.read_line(&mut line))
            .await
            .map_err(|_| {
                McpError::Transport(format!(
                    "no response within {}s",
                    self.read_deadline.as_secs()
                ))
            })?
            .map_err(|e| McpError::Transport(format!("read failed: {e}")))?;

        if read == 0 {
            return Err(McpError::Transport("server closed the pipe".into()));
        }
        if line.trim().is_empty() {
            return Err(McpError::Protocol("empty response line".into()));
        }
        serde_json::from_str(&line)
            .map_err(|e| McpError::Protocol(format!("undecodable response line: {e}")))
    }

    /// Send one request and read its response, enforcing id correlation.
    pub async fn roundtrip(&mut self, request: &RpcRequest) -> Result<RpcResponse, McpError> {
        self.send(request).await?;
        let response = self.recv().await?;
        match &response.id {
            Some(Value::Number(n)) if n.as_i64() == Some(request.id) => Ok(response),
            Some(other) => Err(McpError::Desync {
                sent: request.id,
                received: other.to_string(),
            }),
            None => Err(McpError::Desync {
                sent: request.id,
                received: "<absent>".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::METHOD_INITIALIZE;
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    /// Serve canned response lines over a duplex stream, returning the
    /// requests that arrived.
    fn fake_server(
        responses: Vec<String>,
    ) -> (RpcPipe, tokio::task::JoinHandle<Vec<RpcRequest>>) {
        let (client_side, server_side) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_side);
        let (client_read, client_write) = tokio::io::split(client_side);

        let handle = tokio::spawn(async move {
            let mut reader = BufReader::new(server_read);
            let mut writer = server_write;
            let mut seen = Vec::new();
            for response in responses {
                let mut line = String::new();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    break;
                }
                seen.push(serde_json::from_str(&line).expect("client sent invalid JSON"));
                writer.write_all(response.as_bytes()).await.unwrap();
                writer.write_all(b"\n").await.unwrap();
            }
            seen
        });

        (RpcPipe::new(client_read, client_write), handle)
    }

    #[tokio::test]
    async fn roundtrip_matches_ids() {
        let (mut pipe, server) = fake_server(vec![r#"{"id":0,"result":{"ok":true}}"#.into()]);
        let req = RpcRequest::new(0, METHOD_INITIALIZE, json!({}));
        let resp = pipe.roundtrip(&req).await.unwrap();
        assert_eq!(resp.result.unwrap()["ok"], true);

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, METHOD_INITIALIZE);
        assert_eq!(seen[0].jsonrpc, "2.0");
    }

    #[tokio::test]
    async fn roundtrip_detects_id_mismatch() {
        let (mut pipe, _server) = fake_server(vec![r#"{"id":9,"result":{}}"#.into()]);
        let req = RpcRequest::new(1, "tools/list", json!({}));
        let err = pipe.roundtrip(&req).await.unwrap_err();
        assert!(matches!(err, McpError::Desync { sent: 1, .. }));
        assert!(err.to_string().contains('9'));
    }

    #[tokio::test]
    async fn roundtrip_detects_absent_id() {
        let (mut pipe, _server) = fake_server(vec![r#"{"result":{}}"#.into()]);
        let req = RpcRequest::new(1, "tools/list", json!({}));
        let err = pipe.roundtrip(&req).await.unwrap_err();
        assert!(matches!(err, McpError::Desync { .. }));
    }

    #[tokio::test]
    async fn recv_rejects_garbage() {
        let (mut pipe, _server) = fake_server(vec!["not json at all".into()]);
        let req = RpcRequest::new(1, "tools/list", json!({}));
        pipe.send(&req).await.unwrap();
        let err = pipe.recv().await.unwrap_err();
        assert!(matches!(err, McpError::Protocol(_)));
    }

    #[tokio::test]
    async fn recv_times_out_on_silent_server() {
        let (client_side, _server_side) = tokio::io::duplex(1024);
        let (client_read, client_write) = tokio::io::split(client_side);
        let mut pipe = RpcPipe::new(client_read, client_write)
            .with_read_deadline(Duration::from_millis(50));

        let err = pipe.recv().await.unwrap_err();
        assert!(matches!(err, McpError::Transport(_)));
        assert!(err.to_string().contains("no response"));
    }

    #[tokio::test]
    async fn recv_reports_closed_pipe() {
        let (client_side, server_side) = tokio::io::duplex(1024);
        drop(server_side);
        let (client_read, client_write) = tokio::io::split(client_side);
        let mut pipe = RpcPipe::new(client_read, client_write);

        let err = pipe.recv().await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }
}
