//! Append-only conversation history shared by the UI thread and the IPC thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use shared::domain::{Message, MessageDraft, MessageId};

#[derive(Debug, Default)]
struct History {
    messages: Vec<Message>,
    last_id: u64,
    last_received_at: Option<DateTime<Utc>>,
}

/// Handle to one conversation history. Clones share the same history.
///
/// Every append and every read takes the same mutex, so ids follow lock
/// acquisition order and a snapshot never contains a half-written record.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    inner: Arc<Mutex<History>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, draft: MessageDraft) -> MessageId {
        self.append_at(draft, Utc::now())
    }

    fn append_at(&self, draft: MessageDraft, now: DateTime<Utc>) -> MessageId {
        let mut history = self.lock();
        let received_at = match history.last_received_at {
            Some(last) if last > now => last,
            _ => now,
        };
        history.last_id += 1;
        let id = MessageId(history.last_id);
        history.last_received_at = Some(received_at);
        history.messages.push(Message {
            id,
            role: draft.role,
            text: draft.text,
            received_at,
        });
        tracing::trace!(message_id = id.0, role = ?draft.role, "appended message");
        id
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Messages appended after `after`, oldest first. `None` means all.
    pub fn messages_after(&self, after: Option<MessageId>) -> Vec<Message> {
        let history = self.lock();
        let Some(after) = after else {
            return history.messages.clone();
        };
        // ids are dense and start at 1, so the id doubles as the index past it
        let start = usize::try_from(after.0)
            .unwrap_or(usize::MAX)
            .min(history.messages.len());
        history.messages[start..].to_vec()
    }

    pub fn last_id(&self) -> Option<MessageId> {
        self.lock().messages.last().map(|message| message.id)
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        // The push is the last step of an append, so a panicking holder
        // cannot leave a partial record behind.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
