//! Snapshot stream client.
//!
//! Keeps the canonical in-memory [`Snapshot`] synchronised with the service:
//!
//! 1. a one-shot fetch of the full snapshot, published as soon as it resolves
//!    regardless of the streaming connection;
//! 2. a persistent streaming connection whose `snapshot` messages replace the
//!    published snapshot wholesale. `event` messages are logged only and never
//!    merged, so partial updates become visible with the next full snapshot;
//! 3. after the connection closes or fails, exactly one reconnection attempt
//!    after `reconnect_delay`. Notifications from superseded connections are
//!    ignored, so they cannot schedule a second attempt;
//! 4. [`StreamClient::refetch`] re-issues the one-shot fetch without touching
//!    the connection.
//!
//! Failures never escape: the last good snapshot stays published and the
//! problem is reported through [`ConnectionStatus`] and [`FetchState`].
//!
//! All mutation happens on one supervisor task; the spawned fetch, connection
//! and timer tasks only send it [`Command`]s. Consumers read through
//! `tokio::sync::watch` receivers.

pub mod sse;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::{Snapshot, StreamMessage};

pub use transport::{EventStream, EventTransport, HttpTransport, SnapshotSource, TransportEvent};

/// Lifecycle of the streaming transport. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Open,
    Closed,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Open => "open",
            ConnectionStatus::Closed => "closed",
            ConnectionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the one-shot snapshot fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchState {
    pub loading: bool,
    /// Message of the last failed fetch; cleared by the next success.
    pub error: Option<String>,
}

pub type SharedSnapshot = Option<Arc<Snapshot>>;

enum Command {
    Refetch,
    Fetched(Result<Snapshot>),
    Transport {
        generation: u64,
        event: TransportEvent,
    },
    ReconnectDue,
}

/// Handle to a running stream client. Dropping it stops all background work.
pub struct StreamClient {
    snapshot: watch::Receiver<SharedSnapshot>,
    status: watch::Receiver<ConnectionStatus>,
    fetch: watch::Receiver<FetchState>,
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
}

impl StreamClient {
    /// Start a client talking HTTP to the configured service.
    /// Must be called from within a Tokio runtime.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let http = Arc::new(HttpTransport::new(config.clone())?);
        Ok(Self::spawn(&config, http.clone(), http))
    }

    /// Start a client over arbitrary transports.
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        config: &ClientConfig,
        source: Arc<dyn SnapshotSource>,
        transport: Arc<dyn EventTransport>,
    ) -> Self {
        let (snapshot_tx, snapshot) = watch::channel(None);
        let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);
        let (fetch_tx, fetch) = watch::channel(FetchState::default());
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let supervisor = Supervisor {
            source,
            transport,
            reconnect_delay: config.reconnect_delay,
            snapshot_tx,
            status_tx,
            fetch_tx,
            commands: commands.clone(),
            cancel: cancel.clone(),
            generation: 0,
            connection: None,
            reconnect_pending: false,
        };
        tokio::spawn(supervisor.run(commands_rx));

        Self {
            snapshot,
            status,
            fetch,
            commands,
            cancel,
        }
    }

    /// The most recently published snapshot, if any has arrived yet.
    pub fn snapshot(&self) -> SharedSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<SharedSnapshot> {
        self.snapshot.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn subscribe_fetch(&self) -> watch::Receiver<FetchState> {
        self.fetch.clone()
    }

    /// Re-issue the one-shot snapshot fetch. The streaming connection is left alone.
    pub fn refetch(&self) {
        if self.commands.send(Command::Refetch).is_err() {
            debug!("refetch requested after the stream client stopped");
        }
    }

    /// Stop the supervisor, the connection and any pending reconnect. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Supervisor {
    source: Arc<dyn SnapshotSource>,
    transport: Arc<dyn EventTransport>,
    reconnect_delay: Duration,
    snapshot_tx: watch::Sender<SharedSnapshot>,
    status_tx: watch::Sender<ConnectionStatus>,
    fetch_tx: watch::Sender<FetchState>,
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    /// Id of the current connection. Events tagged with an older id are stale.
    generation: u64,
    connection: Option<JoinHandle<()>>,
    reconnect_pending: bool,
}

impl Supervisor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        self.start_fetch();
        self.open_connection();
        loop {
            let command = tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };
            self.handle(command);
        }
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
        self.status_tx.send_replace(ConnectionStatus::Closed);
        debug!("stream client stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Refetch => self.start_fetch(),
            Command::Fetched(Ok(snapshot)) => {
                info!(generated_at = ?snapshot.generated_at, "snapshot fetched");
                self.publish(snapshot);
                self.fetch_tx.send_replace(FetchState {
                    loading: false,
                    error: None,
                });
            }
            Command::Fetched(Err(error)) => {
                warn!(%error, "snapshot fetch failed");
                self.fetch_tx.send_replace(FetchState {
                    loading: false,
                    error: Some(error.to_string()),
                });
            }
            Command::Transport { generation, event } => {
                if generation != self.generation {
                    trace!(generation, current = self.generation, ?event, "ignoring stale connection");
                    return;
                }
                self.on_transport_event(event);
            }
            Command::ReconnectDue => {
                self.reconnect_pending = false;
                info!("reconnecting event stream");
                self.open_connection();
            }
        }
    }

    fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => {
                info!(generation = self.generation, "event stream open");
                self.status_tx.send_replace(ConnectionStatus::Open);
            }
            TransportEvent::Message(text) => self.on_message(&text),
            TransportEvent::Error(reason) => {
                warn!(%reason, "event stream error");
                self.status_tx.send_replace(ConnectionStatus::Error);
                self.schedule_reconnect();
            }
            TransportEvent::Closed => {
                info!(generation = self.generation, "event stream closed");
                self.status_tx.send_replace(ConnectionStatus::Closed);
                self.schedule_reconnect();
            }
        }
    }

    fn on_message(&mut self, text: &str) {
        match StreamMessage::parse(text) {
            Ok(StreamMessage::Snapshot { data }) => {
                debug!(generated_at = ?data.generated_at, "snapshot received from stream");
                self.publish(*data);
            }
            Ok(StreamMessage::Event { event_type, .. }) => {
                // Events are not merged into the held snapshot.
                info!(%event_type, "stream event");
            }
            Err(error) => warn!(%error, "ignoring malformed stream message"),
        }
    }

    fn publish(&self, snapshot: Snapshot) {
        self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
    }

    fn start_fetch(&self) {
        self.fetch_tx.send_modify(|state| state.loading = true);
        let source = self.source.clone();
        let commands = self.commands.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = source.fetch_snapshot() => {
                    let _ = commands.send(Command::Fetched(result));
                }
            }
        });
    }

    fn open_connection(&mut self) {
        if let Some(previous) = self.connection.take() {
            previous.abort();
        }
        self.generation += 1;
        let generation = self.generation;
        self.status_tx.send_replace(ConnectionStatus::Connecting);

        let transport = self.transport.clone();
        let commands = self.commands.clone();
        let cancel = self.cancel.clone();
        self.connection = Some(tokio::spawn(async move {
            let mut events = tokio::select! {
                _ = cancel.cancelled() => return,
                events = transport.connect() => events,
            };
            let mut saw_close = false;
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => return,
                    event = events.next() => event,
                };
                let Some(event) = event else { break };
                saw_close |= event == TransportEvent::Closed;
                if commands.send(Command::Transport { generation, event }).is_err() {
                    return;
                }
            }
            if !saw_close {
                let _ = commands.send(Command::Transport {
                    generation,
                    event: TransportEvent::Closed,
                });
            }
        }));
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect_pending {
            debug!("reconnect already scheduled");
            return;
        }
        self.reconnect_pending = true;
        info!(delay = ?self.reconnect_delay, "scheduling reconnect");
        let delay = self.reconnect_delay;
        let commands = self.commands.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = commands.send(Command::ReconnectDue);
                }
            }
        });
    }
}
