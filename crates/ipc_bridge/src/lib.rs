//! Loopback listener that turns one TCP connection into one assistant message.
//!
//! The accept/read loop runs on a dedicated `ipc-listener` thread with its
//! own current-thread runtime. Completed messages go into the
//! [`ConversationStore`] and a [`DeliveryNotifier`] tells the UI side that
//! new content exists; nothing here touches UI state directly.

use std::{
    io,
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use conversation_store::ConversationStore;
use shared::{
    domain::{ListenerState, MessageDraft, MessageId},
    error::{BindError, DecodeError},
    protocol::IPC_HOST,
};
use tokio::{
    io::AsyncReadExt,
    net::{TcpListener, TcpSocket, TcpStream},
    sync::{oneshot, watch},
};
use tracing::{debug, error, info, warn};

const ACCEPT_BACKLOG: u32 = 1;
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Receives a notice after each message has been appended to the store.
pub trait DeliveryNotifier: Send + Sync + 'static {
    fn message_delivered(&self, id: MessageId);
}

impl DeliveryNotifier for crossbeam_channel::Sender<MessageId> {
    fn message_delivered(&self, id: MessageId) {
        if let Err(err) = self.try_send(id) {
            debug!(message_id = id.0, "delivery notice not queued: {err}");
        }
    }
}

pub struct IpcListener {
    store: ConversationStore,
    notifier: Arc<dyn DeliveryNotifier>,
    state: Arc<watch::Sender<ListenerState>>,
    running: Option<RunningListener>,
}

struct RunningListener {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    worker: JoinHandle<()>,
}

impl IpcListener {
    pub fn new(store: ConversationStore, notifier: impl DeliveryNotifier) -> Self {
        let (state, _) = watch::channel(ListenerState::Stopped);
        Self {
            store,
            notifier: Arc::new(notifier),
            state: Arc::new(state),
            running: None,
        }
    }

    /// Binds `127.0.0.1:port` and starts the accept loop. Port 0 picks an
    /// ephemeral port; the bound address is returned either way.
    pub fn start(&mut self, port: u16) -> Result<SocketAddr, BindError> {
        if let Some(running) = &self.running {
            return Err(BindError::AlreadyListening {
                addr: running.local_addr,
            });
        }

        self.state.send_replace(ListenerState::Starting);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let accept_loop = AcceptLoop {
            store: self.store.clone(),
            notifier: Arc::clone(&self.notifier),
            state: Arc::clone(&self.state),
        };

        let worker = match thread::Builder::new()
            .name("ipc-listener".to_string())
            .spawn(move || run_worker(port, accept_loop, ready_tx, shutdown_rx))
        {
            Ok(worker) => worker,
            Err(err) => {
                self.state.send_replace(ListenerState::Stopped);
                return Err(BindError::Runtime(err));
            }
        };

        let startup = ready_rx.recv().unwrap_or_else(|_| {
            Err(BindError::Runtime(io::Error::other(
                "ipc listener thread exited during startup",
            )))
        });
        match startup {
            Ok(local_addr) => {
                info!(%local_addr, "ipc listener ready");
                self.running = Some(RunningListener {
                    local_addr,
                    shutdown: shutdown_tx,
                    worker,
                });
                Ok(local_addr)
            }
            Err(err) => {
                if worker.join().is_err() {
                    error!("ipc listener thread panicked during startup");
                }
                self.state.send_replace(ListenerState::Stopped);
                Err(err)
            }
        }
    }

    /// Closes the listening socket and any unfinished connection, then waits
    /// for the background thread. A no-op when not running.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        self.state.send_replace(ListenerState::Stopping);
        info!(addr = %running.local_addr, "stopping ipc listener");
        // A dropped receiver means the loop already exited.
        let _ = running.shutdown.send(());
        if running.worker.join().is_err() {
            error!("ipc listener thread panicked");
        }
        self.state.send_replace(ListenerState::Stopped);
        info!(addr = %running.local_addr, "ipc listener stopped");
    }

    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for IpcListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    port: u16,
    accept_loop: AcceptLoop,
    ready_tx: crossbeam_channel::Sender<Result<SocketAddr, BindError>>,
    shutdown: oneshot::Receiver<()>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = ready_tx.send(Err(BindError::Runtime(err)));
            return;
        }
    };

    runtime.block_on(async move {
        let bound = bind_loopback(port).and_then(|listener| {
            let local_addr = listener
                .local_addr()
                .map_err(|err| BindError::from_io(port, err))?;
            Ok((listener, local_addr))
        });
        let (listener, local_addr) = match bound {
            Ok(bound) => bound,
            Err(err) => {
                let _ = ready_tx.send(Err(err));
                return;
            }
        };

        accept_loop.advance(ListenerState::Listening);
        if ready_tx.send(Ok(local_addr)).is_err() {
            return;
        }
        accept_loop.run(listener, shutdown).await;
    });
}

fn bind_loopback(port: u16) -> Result<TcpListener, BindError> {
    let addr = SocketAddr::from((IPC_HOST, port));
    let to_bind_error = |err: io::Error| BindError::from_io(port, err);

    let socket = TcpSocket::new_v4().map_err(to_bind_error)?;
    // On Windows SO_REUSEADDR lets a second listener steal the port.
    #[cfg(unix)]
    socket.set_reuseaddr(true).map_err(to_bind_error)?;
    socket.bind(addr).map_err(to_bind_error)?;
    socket.listen(ACCEPT_BACKLOG).map_err(to_bind_error)
}

struct AcceptLoop {
    store: ConversationStore,
    notifier: Arc<dyn DeliveryNotifier>,
    state: Arc<watch::Sender<ListenerState>>,
}

impl AcceptLoop {
    async fn run(self, listener: TcpListener, mut shutdown: oneshot::Receiver<()>) {
        loop {
            self.advance(ListenerState::Accepting);
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(error = %err, "ipc accept failed");
                        tokio::select! {
                            _ = &mut shutdown => break,
                            _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => continue,
                        }
                    }
                },
            };

            debug!(%peer, "ipc connection accepted");
            self.advance(ListenerState::Reading);
            let payload = tokio::select! {
                _ = &mut shutdown => {
                    debug!(%peer, "discarding unfinished ipc message");
                    break;
                }
                read = read_message(stream) => read,
            };

            match payload {
                Ok(payload) => self.dispatch(payload, peer),
                Err(err) => warn!(%peer, error = %err, "ipc read failed; message dropped"),
            }
        }
        debug!("ipc accept loop exited");
    }

    fn dispatch(&self, payload: Vec<u8>, peer: SocketAddr) {
        if payload.is_empty() {
            debug!(%peer, "empty ipc payload dropped");
            return;
        }

        let bytes = payload.len();
        let text = match decode_payload(payload) {
            Ok(text) => text,
            Err(err) => {
                warn!(%peer, error = %err, "ipc payload dropped");
                return;
            }
        };

        let id = self.store.append(MessageDraft::assistant(text));
        self.advance(ListenerState::Dispatched);
        self.notifier.message_delivered(id);
        debug!(%peer, message_id = id.0, bytes, "ipc message delivered");
    }

    /// Moves to `next` unless a stop is already under way.
    fn advance(&self, next: ListenerState) {
        self.state.send_if_modified(|current| {
            if *current == ListenerState::Stopping || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// Reads until the peer closes; the connection boundary is the message boundary.
async fn read_message(mut stream: TcpStream) -> io::Result<Vec<u8>> {
    let mut payload = Vec::new();
    stream.read_to_end(&mut payload).await?;
    Ok(payload)
}

pub fn decode_payload(payload: Vec<u8>) -> Result<String, DecodeError> {
    String::from_utf8(payload).map_err(|err| DecodeError::from_utf8(&err))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
