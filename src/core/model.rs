//! Chat-completion client boundary.
//!
//! The pipeline only needs "send messages, get assistant text back". Clients
//! are constructed once by the caller and borrowed by every generation.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to start model command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("model command '{command}' exited with {exit_code}: {stderr}")]
    Exit {
        command: String,
        exit_code: i32,
        stderr: String,
    },
    #[error("model I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode chat request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("scripted model has no response left for request #{0}")]
    Exhausted(usize),
    #[error("model transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Concatenated message text, used for token estimates.
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Anything that can answer a chat request with assistant text.
pub trait ModelClient: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, ModelError>;
}

/// Runs an external executable per request: the request JSON goes to its
/// stdin and its stdout is the assistant text.
#[derive(Debug, Clone)]
pub struct CommandModelClient {
    command: String,
    args: Vec<String>,
}

impl CommandModelClient {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl ModelClient for CommandModelClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, ModelError> {
        let start = Instant::now();
        let payload = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ModelError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // Feed stdin from a second thread so a child that writes before it
        // finishes reading cannot fill stdout and stall both sides.
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(&payload),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });
        let output = output?;

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(
            command = %self.command,
            model = %request.model,
            exit_code,
            duration_ms = start.elapsed().as_millis() as u64,
            "model command finished"
        );
        if !output.status.success() {
            let stderr: String = String::from_utf8_lossy(&output.stderr)
                .chars()
                .take(1000)
                .collect();
            return Err(ModelError::Exit {
                command: self.command.clone(),
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }
        // A child that exits cleanly without reading its input breaks the pipe.
        if let Err(err) = written
            && err.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(ModelError::Io(err));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Replays a fixed queue of responses and records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedModelClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModelClient {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a transport failure as the next response.
    pub fn push_failure(&self, message: impl Into<String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Err(message.into()));
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl ModelClient for ScriptedModelClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, ModelError> {
        let seen = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|_| ModelError::Transport("request log poisoned".to_string()))?;
            requests.push(request.clone());
            requests.len()
        };
        let next = self
            .responses
            .lock()
            .map_err(|_| ModelError::Transport("response queue poisoned".to_string()))?
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ModelError::Transport(message)),
            None => Err(ModelError::Exhausted(seen)),
        }
    }
}
