//! Backend commands queued from UI to backend worker.

pub enum BackendCommand {
    SendMessage { text: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SendMessage { .. } => "send_message",
        }
    }
}
