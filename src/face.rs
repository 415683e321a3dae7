// Client for the face-authentication socket server.
//
// One JSON object out, one JSON object back per request. Replies are
// decoded through the same path extractor the HTTP client uses, so field
// order, escaping and nesting in the reply do not matter.

use crate::extract::extract;
use serde::Serialize;
use std::io::{Read, Write};
use std::net::TcpStream;
use thiserror::Error;
use tracing::debug;

/// The server answers each request with a single write of at most this size.
const REPLY_BUF: usize = 1024;

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Server closed the connection without replying")]
    Closed,
    #[error("Unrecognized reply: {0}")]
    Decode(String),
    #[error("A name is required to register")]
    MissingName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceCommand {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FaceCommand {
    pub fn ping() -> Self {
        FaceCommand { command: "ping", name: None }
    }

    pub fn authenticate() -> Self {
        FaceCommand {
            command: "authenticate",
            name: None,
        }
    }

    /// Register a face under `name`; a blank name is rejected.
    pub fn register(name: &str) -> Result<Self, FaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FaceError::MissingName);
        }
        Ok(FaceCommand {
            command: "register",
            name: Some(name.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceReply {
    pub status: String,
    pub message: String,
    pub user: Option<String>,
}

impl FaceReply {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Decode a raw reply. `status` and `message` are required.
    pub fn decode(raw: &str) -> Result<Self, FaceError> {
        let ex = extract(raw, &["status", "message", "user"]);
        match (ex.text("status"), ex.text("message")) {
            (Some(status), Some(message)) => Ok(FaceReply {
                status: status.to_string(),
                message: message.to_string(),
                user: ex.text("user").map(str::to_string),
            }),
            _ => Err(FaceError::Decode(raw.to_string())),
        }
    }
}

pub struct FaceClient {
    stream: TcpStream,
}

impl FaceClient {
    pub fn connect(host: &str, port: u16) -> Result<Self, FaceError> {
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&addr).map_err(|source| FaceError::Connect { addr, source })?;
        Ok(FaceClient { stream })
    }

    /// Send one command and wait for its reply.
    pub fn request(&mut self, command: &FaceCommand) -> Result<FaceReply, FaceError> {
        let body = serde_json::to_string(command).map_err(|e| FaceError::Decode(e.to_string()))?;
        debug!(%body, "sending face command");
        self.stream.write_all(body.as_bytes())?;
        self.stream.flush()?;

        let mut buf = [0u8; REPLY_BUF];
        let n = self.stream.read(&mut buf)?;
        if n == 0 {
            return Err(FaceError::Closed);
        }
        let raw = String::from_utf8_lossy(&buf[..n]);
        debug!(reply = %raw, "face server replied");
        FaceReply::decode(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_without_blank_name() {
        assert_eq!(serde_json::to_string(&FaceCommand::ping()).unwrap(), r#"{"command":"ping"}"#);
        assert_eq!(
            serde_json::to_string(&FaceCommand::register("Ann").unwrap()).unwrap(),
            r#"{"command":"register","name":"Ann"}"#
        );
        assert!(matches!(FaceCommand::register("  "), Err(FaceError::MissingName)));
    }

    #[test]
    fn decode_handles_reordered_and_escaped_fields() {
        let reply = FaceReply::decode(r#"{"user":"Ann \"A\"","message":"ok","status":"success"}"#).unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.user.as_deref(), Some(r#"Ann "A""#));
        assert_eq!(reply.message, "ok");
    }

    #[test]
    fn decode_user_is_optional() {
        let reply = FaceReply::decode(r#"{"status":"error","message":"Authentication failed"}"#).unwrap();
        assert!(!reply.is_success());
        assert_eq!(reply.user, None);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(FaceReply::decode("pong"), Err(FaceError::Decode(_))));
        assert!(matches!(FaceReply::decode(r#"{"status":"success"}"#), Err(FaceError::Decode(_))));
    }
}
