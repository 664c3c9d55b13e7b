//! Wire contracts shared by the shell, the bridge and the tools CLI.
//!
//! The loopback channel carries exactly one UTF-8 payload per TCP
//! connection: the sender writes the bytes and closes, and EOF marks the
//! end of the message. There is no length prefix and no reply.

use serde::{Deserialize, Serialize};

pub const IPC_HOST: [u8; 4] = [127, 0, 0, 1];
pub const DEFAULT_IPC_PORT: u16 = 8765;

/// Body posted to the backend for each user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendMessageRequest {
    pub message: String,
}

/// Optional JSON body of a successful backend response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendMessageReply {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Outcome of a delivered user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub status: u16,
    pub reply: Option<String>,
}
