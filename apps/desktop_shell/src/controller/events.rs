//! UI/backend events and error modeling for the shell controller.

use crossbeam_channel::Sender;
use ipc_bridge::DeliveryNotifier;
use shared::{domain::MessageId, error::SendError, protocol::Acknowledgement};

pub enum UiEvent {
    /// The IPC thread appended an assistant message.
    ConversationUpdated { latest: MessageId },
    LoadStarted,
    LoadFinished { success: bool },
    SendCompleted { ack: Acknowledgement },
    SendFailed { error: SendError },
    BackendUnavailable(String),
}

/// Forwards IPC deliveries into the UI event queue.
pub struct UiNotifier {
    ui_tx: Sender<UiEvent>,
}

impl UiNotifier {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }
}

impl DeliveryNotifier for UiNotifier {
    fn message_delivered(&self, id: MessageId) {
        if self
            .ui_tx
            .try_send(UiEvent::ConversationUpdated { latest: id })
            .is_err()
        {
            // The message is already in the store; the next refresh shows it.
            tracing::debug!(message_id = id.0, "ui queue full; delivery notice dropped");
        }
    }
}

pub fn classify_send_failure(error: &SendError) -> String {
    match error {
        SendError::NotConfigured => {
            "No backend API URL configured; relaunch with an API URL to chat.".to_string()
        }
        SendError::InvalidEndpoint { endpoint, .. } => {
            format!("Backend API URL '{endpoint}' is invalid; check the launch arguments.")
        }
        SendError::Unreachable { reason } => {
            let lower = reason.to_ascii_lowercase();
            if lower.contains("timed out") {
                "Backend did not answer in time; retry in a moment.".to_string()
            } else {
                "Backend unreachable; check that the backend process is running and retry."
                    .to_string()
            }
        }
        SendError::Rejected { status } if *status >= 500 => {
            format!("Backend failed to handle the message (HTTP {status}); retry.")
        }
        SendError::Rejected { status } => {
            format!("Backend rejected the message (HTTP {status}).")
        }
        SendError::Protocol { reason } => format!("Unexpected backend response: {reason}"),
    }
}
