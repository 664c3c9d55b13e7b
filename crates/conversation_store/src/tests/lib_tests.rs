use std::{collections::HashSet, thread};

use chrono::Duration;
use shared::domain::Role;

use super::*;

#[test]
fn assigns_increasing_ids_in_append_order() {
    let store = ConversationStore::new();
    let first = store.append(MessageDraft::user("hi"));
    let second = store.append(MessageDraft::assistant("hello"));
    assert_eq!(first, MessageId(1));
    assert_eq!(second, MessageId(2));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].role, Role::User);
    assert_eq!(snapshot[1].text, "hello");
    assert_eq!(store.last_id(), Some(second));
}

#[test]
fn concurrent_writers_lose_and_duplicate_nothing() {
    const PER_WRITER: usize = 500;
    let store = ConversationStore::new();

    let ui_store = store.clone();
    let ui = thread::spawn(move || {
        for i in 0..PER_WRITER {
            ui_store.append(MessageDraft::user(format!("user-{i}")));
        }
    });
    let ipc_store = store.clone();
    let ipc = thread::spawn(move || {
        for i in 0..PER_WRITER {
            ipc_store.append(MessageDraft::assistant(format!("assistant-{i}")));
        }
    });
    ui.join().expect("ui writer");
    ipc.join().expect("ipc writer");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), PER_WRITER * 2);

    let texts: HashSet<_> = snapshot.iter().map(|m| m.text.clone()).collect();
    assert_eq!(texts.len(), PER_WRITER * 2);

    for (index, message) in snapshot.iter().enumerate() {
        assert_eq!(message.id, MessageId(index as u64 + 1));
    }
    for pair in snapshot.windows(2) {
        assert!(pair[0].received_at <= pair[1].received_at);
    }

    // each writer's own messages keep their relative order
    let user_order: Vec<_> = snapshot
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.text.clone())
        .collect();
    let expected: Vec<_> = (0..PER_WRITER).map(|i| format!("user-{i}")).collect();
    assert_eq!(user_order, expected);
}

#[test]
fn timestamps_never_go_backwards_when_clock_does() {
    let store = ConversationStore::new();
    let now = Utc::now();
    store.append_at(MessageDraft::user("first"), now);
    store.append_at(MessageDraft::user("second"), now - Duration::seconds(30));

    let snapshot = store.snapshot();
    assert_eq!(snapshot[0].received_at, now);
    assert_eq!(snapshot[1].received_at, now);
}

#[test]
fn snapshot_is_a_detached_copy() {
    let store = ConversationStore::new();
    store.append(MessageDraft::user("one"));
    let snapshot = store.snapshot();
    store.append(MessageDraft::user("two"));

    assert_eq!(snapshot.len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn messages_after_returns_only_newer_entries() {
    let store = ConversationStore::new();
    assert!(store.is_empty());
    assert!(store.messages_after(None).is_empty());

    let first = store.append(MessageDraft::user("a"));
    store.append(MessageDraft::assistant("b"));
    store.append(MessageDraft::assistant("c"));

    let newer: Vec<_> = store
        .messages_after(Some(first))
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(newer, vec!["b", "c"]);
    assert!(store.messages_after(Some(MessageId(99))).is_empty());
    assert_eq!(store.messages_after(None).len(), 3);
}
