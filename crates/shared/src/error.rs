use std::io;

use thiserror::Error;

/// The loopback port could not be claimed.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("ipc port {port} is already in use (another shell instance running?)")]
    AddrInUse { port: u16 },
    #[error("insufficient privilege to bind ipc port {port}")]
    PermissionDenied { port: u16 },
    #[error("failed to bind ipc port {port}: {source}")]
    Io {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("failed to build ipc listener runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("ipc listener is already running on {addr}")]
    AlreadyListening { addr: std::net::SocketAddr },
}

impl BindError {
    pub fn from_io(port: u16, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::AddrInUse => BindError::AddrInUse { port },
            io::ErrorKind::PermissionDenied => BindError::PermissionDenied { port },
            _ => BindError::Io { port, source },
        }
    }
}

/// An IPC payload that is not valid UTF-8.
#[derive(Debug, Clone, Error)]
#[error("ipc payload of {len} bytes is not valid utf-8 (valid up to byte {valid_up_to})")]
pub struct DecodeError {
    pub len: usize,
    pub valid_up_to: usize,
}

impl DecodeError {
    pub fn from_utf8(err: &std::string::FromUtf8Error) -> Self {
        Self {
            len: err.as_bytes().len(),
            valid_up_to: err.utf8_error().valid_up_to(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("no backend url configured")]
    NotConfigured,
    #[error("invalid backend url '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("backend unreachable: {reason}")]
    Unreachable { reason: String },
    #[error("backend rejected message with status {status}")]
    Rejected { status: u16 },
    #[error("backend protocol error: {reason}")]
    Protocol { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {url}")]
pub struct LoadError {
    pub url: String,
}
