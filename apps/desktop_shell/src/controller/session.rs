//! Window/session lifecycle: startup, navigation outcomes, sends, shutdown.

use std::{net::SocketAddr, sync::Arc, thread::JoinHandle, time::Duration};

use anyhow::Context;
use client_core::{BackendClient, MessageBackend};
use conversation_store::ConversationStore;
use crossbeam_channel::{bounded, Receiver, Sender};
use ipc_bridge::IpcListener;
use shared::{
    domain::{ListenerState, MessageDraft, MessageId, WindowState},
    error::LoadError,
};
use tracing::{debug, error, info, warn};

use crate::backend_bridge::{self, commands::BackendCommand};
use crate::controller::{
    enhancements::enhancement_script,
    events::{classify_send_failure, UiEvent, UiNotifier},
    orchestration::dispatch_backend_command,
};
use crate::render_host::RenderHost;

pub const WINDOW_TITLE: &str = "Rflow AI Assistant";
const UI_EVENT_CAPACITY: usize = 2048;
const BACKEND_COMMAND_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub render_url: String,
    pub backend_url: Option<String>,
    pub environment_url: Option<String>,
    pub ipc_port: u16,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeStatus {
    Active(SocketAddr),
    /// Bind failed at startup; the window still works without the bridge.
    Inert(String),
}

pub struct SessionController {
    config: StartupConfig,
    window_state: WindowState,
    store: ConversationStore,
    listener: IpcListener,
    bridge: BridgeStatus,
    render_host: Box<dyn RenderHost>,
    cmd_tx: Option<Sender<BackendCommand>>,
    backend_worker: Option<JoinHandle<()>>,
    ui_rx: Receiver<UiEvent>,
    enhancements_injected: bool,
    last_load_error: Option<LoadError>,
    pending_sends: usize,
    status: String,
}

impl SessionController {
    pub fn initialize<F>(config: StartupConfig, make_render_host: F) -> anyhow::Result<Self>
    where
        F: FnOnce(Sender<UiEvent>) -> anyhow::Result<Box<dyn RenderHost>>,
    {
        let backend = Arc::new(BackendClient::new(
            config.backend_url.clone(),
            config.request_timeout,
        ));
        Self::initialize_with_backend(config, make_render_host, backend)
    }

    pub fn initialize_with_backend<F>(
        config: StartupConfig,
        make_render_host: F,
        backend: Arc<dyn MessageBackend>,
    ) -> anyhow::Result<Self>
    where
        F: FnOnce(Sender<UiEvent>) -> anyhow::Result<Box<dyn RenderHost>>,
    {
        let (ui_tx, ui_rx) = bounded::<UiEvent>(UI_EVENT_CAPACITY);
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(BACKEND_COMMAND_CAPACITY);

        let render_host =
            make_render_host(ui_tx.clone()).context("failed to construct render host")?;

        let store = ConversationStore::new();
        let mut listener = IpcListener::new(store.clone(), UiNotifier::new(ui_tx.clone()));
        let bridge = match listener.start(config.ipc_port) {
            Ok(addr) => BridgeStatus::Active(addr),
            Err(err) => {
                error!(
                    port = config.ipc_port,
                    error = %err,
                    "ipc bridge unavailable; backend messages will not reach this window"
                );
                BridgeStatus::Inert(err.to_string())
            }
        };

        let mut status = String::new();
        let (cmd_tx, backend_worker) =
            match backend_bridge::runtime::launch(backend, cmd_rx, ui_tx) {
                Ok(worker) => (Some(cmd_tx), Some(worker)),
                Err(err) => {
                    error!("failed to spawn backend worker: {err}");
                    status = format!("Backend worker startup failure: {err}");
                    (None, None)
                }
            };

        let mut controller = Self {
            config,
            window_state: WindowState::Created,
            store,
            listener,
            bridge,
            render_host,
            cmd_tx,
            backend_worker,
            ui_rx,
            enhancements_injected: false,
            last_load_error: None,
            pending_sends: 0,
            status,
        };
        controller.window_state = WindowState::Loading;
        let render_url = controller.config.render_url.clone();
        info!(%render_url, "loading chat application");
        controller.render_host.load_url(&render_url);
        Ok(controller)
    }

    /// Drains queued events on the UI thread. Returns true when the
    /// conversation changed and the message list needs a refresh.
    pub fn process_ui_events(&mut self) -> bool {
        let mut conversation_changed = false;
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::ConversationUpdated { latest } => {
                    debug!(message_id = latest.0, "ipc message arrived");
                    conversation_changed = true;
                }
                UiEvent::LoadStarted => self.on_load_started(),
                UiEvent::LoadFinished { success } => self.on_load_finished(success),
                UiEvent::SendCompleted { ack } => {
                    self.pending_sends = self.pending_sends.saturating_sub(1);
                    match ack.reply {
                        Some(reply) => {
                            self.store.append(MessageDraft::assistant(reply));
                            conversation_changed = true;
                            self.status.clear();
                        }
                        None => {
                            self.status = "Message delivered to backend".to_string();
                        }
                    }
                }
                UiEvent::SendFailed { error } => {
                    self.pending_sends = self.pending_sends.saturating_sub(1);
                    let summary = classify_send_failure(&error);
                    self.store
                        .append(MessageDraft::assistant(format!("Error: {summary}")));
                    self.status = summary;
                    conversation_changed = true;
                }
                UiEvent::BackendUnavailable(reason) => {
                    self.status = reason;
                }
            }
        }
        conversation_changed
    }

    pub fn on_load_started(&mut self) {
        if self.window_state.is_shutting_down() {
            return;
        }
        if self.window_state != WindowState::Loading {
            debug!(from = ?self.window_state, "navigation started");
        }
        self.window_state = WindowState::Loading;
    }

    pub fn on_load_finished(&mut self, success: bool) {
        if self.window_state.is_shutting_down() {
            return;
        }
        if success {
            self.window_state = WindowState::Loaded;
            self.last_load_error = None;
            info!(render_url = %self.config.render_url, "chat application loaded");
            self.inject_enhancements();
        } else {
            self.window_state = WindowState::LoadError;
            let load_error = LoadError {
                url: self.config.render_url.clone(),
            };
            warn!(error = %load_error, "chat application failed to load");
            self.last_load_error = Some(load_error);
        }
    }

    fn inject_enhancements(&mut self) {
        if self.enhancements_injected {
            return;
        }
        self.enhancements_injected = true;
        if let Err(err) = self.render_host.run_script(&enhancement_script()) {
            debug!("enhancement injection skipped: {err:#}");
        }
    }

    /// Appends the user's message and queues it for the backend. Blank input
    /// and input after shutdown are ignored.
    pub fn send_user_message(&mut self, text: &str) -> Option<MessageId> {
        if self.window_state.is_shutting_down() {
            return None;
        }
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let id = self.store.append(MessageDraft::user(text));
        let queued = match &self.cmd_tx {
            Some(cmd_tx) => dispatch_backend_command(
                cmd_tx,
                BackendCommand::SendMessage {
                    text: text.to_string(),
                },
                &mut self.status,
            ),
            None => {
                if self.status.is_empty() {
                    self.status = "Backend worker unavailable; restart the app".to_string();
                }
                false
            }
        };

        if queued {
            self.pending_sends += 1;
        } else {
            self.store
                .append(MessageDraft::assistant(format!("Error: {}", self.status)));
        }
        Some(id)
    }

    /// Stops the bridge and releases the render host. Repeated calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.window_state.is_shutting_down() {
            return;
        }
        self.window_state = WindowState::Closing;
        info!("shutting down session");

        self.listener.stop();
        self.render_host.release();
        // The worker exits once its command queue disconnects.
        self.cmd_tx = None;
        if let Some(worker) = &self.backend_worker {
            if self.pending_sends > 0 && !worker.is_finished() {
                debug!(
                    pending_sends = self.pending_sends,
                    "backend worker still finishing; its outcome will not be shown"
                );
            }
        }

        self.window_state = WindowState::Closed;
        info!("session closed");
    }

    pub fn window_state(&self) -> WindowState {
        self.window_state
    }

    pub fn window_title(&self) -> String {
        match self.window_state {
            WindowState::Created | WindowState::Loading => format!("{WINDOW_TITLE} - Loading..."),
            WindowState::LoadError => format!("{WINDOW_TITLE} - Connection Error"),
            WindowState::Loaded | WindowState::Closing | WindowState::Closed => {
                WINDOW_TITLE.to_string()
            }
        }
    }

    pub fn bridge_status(&self) -> &BridgeStatus {
        &self.bridge
    }

    pub fn listener_state(&self) -> ListenerState {
        self.listener.state()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn last_load_error(&self) -> Option<&LoadError> {
        self.last_load_error.as_ref()
    }

    #[cfg(test)]
    pub fn backend_worker_finished(&self) -> bool {
        self.backend_worker
            .as_ref()
            .map_or(true, |worker| worker.is_finished())
    }

    pub fn pending_sends(&self) -> usize {
        self.pending_sends
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn environment_label(&self) -> &'static str {
        environment_label(
            self.config
                .environment_url
                .as_deref()
                .unwrap_or(&self.config.render_url),
        )
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn environment_label(url: &str) -> &'static str {
    let url = url.to_ascii_lowercase();
    if url.contains("127.0.0.1") || url.contains("localhost") {
        "Local"
    } else if url.contains("staging") {
        "Staging"
    } else if url.contains("dev") {
        "Development"
    } else {
        "Production"
    }
}
