use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);
    };
}

id_newtype!(MessageId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Rflow AI",
        }
    }
}

/// One conversation turn as recorded by the conversation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// A message before the store has assigned its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub role: Role,
    pub text: String,
}

impl MessageDraft {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Lifecycle of the loopback IPC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerState {
    #[default]
    Stopped,
    Starting,
    Listening,
    Accepting,
    Reading,
    Dispatched,
    Stopping,
}

impl ListenerState {
    /// True while the socket is bound and the accept loop owns it.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            ListenerState::Listening
                | ListenerState::Accepting
                | ListenerState::Reading
                | ListenerState::Dispatched
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Created,
    Loading,
    Loaded,
    LoadError,
    Closing,
    Closed,
}

impl WindowState {
    pub fn is_shutting_down(self) -> bool {
        matches!(self, WindowState::Closing | WindowState::Closed)
    }
}
