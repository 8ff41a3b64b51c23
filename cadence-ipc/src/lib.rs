//! Inter-process communication between cadence and cadencectl
//!
//! We use Unix domain sockets for local IPC. A request is one line of JSON,
//! the response is a single JSON document and the server closes the
//! connection after writing it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Commands that cadencectl can send to cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Stop,
    Reset,
    Skip,
    Status,
    ListPresets,
    SelectPreset { id: String },
    Configure(DurationsPatch),
    AddTask { title: String, project: Option<String> },
    ListTasks,
    /// Moves the focus queue on to the next task
    NextTask,
}

/// Responses from cadence back to cadencectl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Status(TimerStatus),
    Presets(Vec<PresetInfo>),
    Tasks(Vec<TaskInfo>),
    Error(String),
}

/// Phase of the focus cycle a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::Work => "Focus",
            SessionKind::ShortBreak => "Short break",
            SessionKind::LongBreak => "Long break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionKind::Work)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    /// Paused and never started since the session was created or reset
    Idle,
    Running,
    Paused,
}

/// Partial duration update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationsPatch {
    pub focus_minutes: Option<u32>,
    pub short_break_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub cycles_before_long_break: Option<u32>,
}

impl DurationsPatch {
    pub fn is_empty(&self) -> bool {
        self.focus_minutes.is_none()
            && self.short_break_minutes.is_none()
            && self.long_break_minutes.is_none()
            && self.cycles_before_long_break.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStatus {
    pub session_id: String,
    pub kind: SessionKind,
    pub state: TimerState,
    pub remaining: u64, // seconds
    pub total: u64,     // seconds
    pub completed_work_cycles: u32,
    pub next: SessionKind,
    pub preset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub badge: Option<String>,
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: Option<u32>,
    pub cycles_before_long_break: Option<u32>,
    pub selected: bool,
}

/// Entry of the focus task queue. `active` marks the task being worked on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: u32,
    pub title: String,
    pub project: Option<String>,
    pub active: bool,
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection refused - is cadence running?")]
    ConnectionRefused,

    #[error("Empty request")]
    EmptyRequest,
}

pub const SOCKET_PATH: &str = "/tmp/cadence.sock";

/// Connects to a running cadence instance, sends `command` and waits for the reply.
pub async fn request(socket: impl AsRef<Path>, command: &Command) -> Result<Response, IpcError> {
    let mut stream = match UnixStream::connect(socket.as_ref()).await {
        Ok(stream) => stream,
        Err(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound
            ) =>
        {
            return Err(IpcError::ConnectionRefused)
        }
        Err(e) => return Err(e.into()),
    };

    let mut msg = serde_json::to_vec(command)?;
    msg.push(b'\n');
    stream.write_all(&msg).await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(serde_json::from_slice(&buf)?)
}

/// Reads one newline-terminated command from a client connection.
pub async fn read_command<R>(reader: &mut BufReader<R>) -> Result<Command, IpcError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(IpcError::EmptyRequest);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}

pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), IpcError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let json = serde_json::to_vec(response)?;
    writer.write_all(&json).await?;
    writer.shutdown().await?;
    Ok(())
}
