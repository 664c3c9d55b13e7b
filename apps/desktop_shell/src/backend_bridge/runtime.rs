//! Runtime bridge between UI command queue and backend event intake.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::MessageBackend;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Spawns the backend worker. It runs until every command sender is gone;
/// a request in flight at that point still completes first.
pub fn launch(
    backend: Arc<dyn MessageBackend>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("backend-worker".to_string())
        .spawn(move || run_backend_worker(backend, cmd_rx, ui_tx))
}

fn run_backend_worker(
    backend: Arc<dyn MessageBackend>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("failed to build backend runtime: {err}");
            let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                "backend worker startup failure: {err}"
            )));
            return;
        }
    };

    while let Ok(cmd) = cmd_rx.recv() {
        let cmd_name = cmd.name();
        let event = match cmd {
            BackendCommand::SendMessage { text } => {
                match runtime.block_on(backend.send(&text)) {
                    Ok(ack) => {
                        tracing::debug!(command = cmd_name, status = ack.status, "backend acknowledged");
                        UiEvent::SendCompleted { ack }
                    }
                    Err(error) => {
                        tracing::warn!(command = cmd_name, %error, "backend send failed");
                        UiEvent::SendFailed { error }
                    }
                }
            }
        };
        // Blocking send: every outcome has to reach the conversation.
        if ui_tx.send(event).is_err() {
            break;
        }
    }
    tracing::debug!("backend worker exiting");
}
