use super::*;

use std::sync::Arc;

use async_trait::async_trait;
use client_core::MessageBackend;
use shared::{domain::MessageDraft, error::SendError, protocol::Acknowledgement};

use crate::controller::StartupConfig;
use crate::render_host::RenderHost;

struct IdleRenderHost;

impl RenderHost for IdleRenderHost {
    fn load_url(&mut self, _url: &str) {}

    fn run_script(&mut self, _script: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn release(&mut self) {}
}

struct SilentBackend;

#[async_trait]
impl MessageBackend for SilentBackend {
    async fn send(&self, _message: &str) -> Result<Acknowledgement, SendError> {
        Err(SendError::NotConfigured)
    }
}

fn idle_controller() -> SessionController {
    SessionController::initialize_with_backend(
        StartupConfig {
            render_url: "http://127.0.0.1:3838".to_string(),
            backend_url: None,
            environment_url: None,
            ipc_port: 0,
            request_timeout: Duration::from_secs(5),
        },
        |_ui_tx| {
            let host: Box<dyn RenderHost> = Box::new(IdleRenderHost);
            Ok(host)
        },
        Arc::new(SilentBackend),
    )
    .expect("initialize session")
}

#[test]
fn refresh_appends_only_new_messages() {
    let controller = idle_controller();
    controller.store().append(MessageDraft::assistant("first"));
    controller.store().append(MessageDraft::user("second"));

    let mut app = ShellApp::new(controller);
    assert_eq!(app.messages.len(), 2);
    assert_eq!(app.rendered_up_to, Some(MessageId(2)));

    app.controller.store().append(MessageDraft::assistant("third"));
    app.refresh_messages();
    app.refresh_messages();

    let ids: Vec<u64> = app.messages.iter().map(|message| message.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(app.messages[2].text, "third");
    assert_eq!(app.rendered_up_to, Some(MessageId(3)));
}

#[test]
fn refresh_on_empty_history_keeps_cursor_unset() {
    let mut app = ShellApp::new(idle_controller());
    app.refresh_messages();
    assert!(app.messages.is_empty());
    assert_eq!(app.rendered_up_to, None);
}
