//! WebSocket transport
//!
//! Each started connection runs its session on a dedicated thread with a
//! single-threaded runtime, so `start` and `invoke` work the same from plain
//! threads and from inside an application's async runtime.

use super::{HubConnection, Transport, TransportError};
use crate::connection::ConnectionState;
use futures_util::{SinkExt, StreamExt};
use logcast_core::HubMessage;
use parking_lot::Mutex;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Frames queued for the session before new invocations are refused
pub const DEFAULT_SEND_BUFFER: usize = 256;

/// Characters kept as-is in the hub path segment
const HUB_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the hub endpoint URL for a base address
///
/// `http` and `https` addresses are mapped to `ws` and `wss`; an address
/// without a scheme is treated as `ws`. The hub name is percent-encoded as a
/// single path segment.
pub fn hub_url(address: &str, hub_name: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    let base = if let Some(rest) = address.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = address.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if address.starts_with("ws://") || address.starts_with("wss://") {
        address.to_string()
    } else {
        format!("ws://{address}")
    };
    format!("{base}/hubs/{}", utf8_percent_encode(hub_name, HUB_SEGMENT))
}

/// Transport that reaches hub hosts over WebSocket
#[derive(Debug, Clone)]
pub struct WsTransport {
    connect_timeout: Duration,
    send_buffer: usize,
}

impl WsTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            send_buffer: DEFAULT_SEND_BUFFER,
        }
    }

    /// Bound the per-connection queue of frames waiting for the socket
    #[must_use]
    pub fn with_send_buffer(mut self, frames: usize) -> Self {
        self.send_buffer = frames.max(1);
        self
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Transport for WsTransport {
    fn open(&self, address: &str, hub_name: &str) -> Arc<dyn HubConnection> {
        Arc::new(
            WsConnection::new(hub_url(address, hub_name), hub_name, self.connect_timeout)
                .with_send_buffer(self.send_buffer),
        )
    }
}

/// State shared with the session thread
///
/// Every start bumps the epoch; a session may only change the state while its
/// epoch is current, so a stale session can never overwrite a newer one.
#[derive(Debug, Default)]
struct SessionState {
    epoch: u64,
    state: ConnectionState,
}

#[derive(Debug, Default)]
struct Shared {
    inner: Mutex<SessionState>,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    fn begin(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.state = ConnectionState::Connecting;
        inner.epoch
    }

    fn transition(&self, epoch: u64, state: ConnectionState) -> bool {
        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            return false;
        }
        inner.state = state;
        true
    }

    fn invalidate(&self, state: ConnectionState) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.state = state;
    }
}

/// Client session with a hub host over WebSocket
///
/// Invocations are queued on a bounded channel. When the hub stops reading
/// and the queue fills up, `invoke` fails instead of buffering more.
pub struct WsConnection {
    url: String,
    hub_name: String,
    connect_timeout: Duration,
    send_buffer: usize,
    shared: Arc<Shared>,
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
}

impl WsConnection {
    pub fn new(
        url: impl Into<String>,
        hub_name: impl Into<String>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            hub_name: hub_name.into(),
            connect_timeout,
            send_buffer: DEFAULT_SEND_BUFFER,
            shared: Arc::new(Shared::default()),
            outbound: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_send_buffer(mut self, frames: usize) -> Self {
        self.send_buffer = frames.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HubConnection for WsConnection {
    fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    fn start(&self) -> Result<(), TransportError> {
        let epoch = self.shared.begin();
        let (out_tx, out_rx) = mpsc::channel(self.send_buffer);
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);

        // Replacing the sender ends any previous session
        *self.outbound.lock() = Some(out_tx);

        let session = Session {
            url: self.url.clone(),
            connect_timeout: self.connect_timeout,
            shared: Arc::clone(&self.shared),
            epoch,
        };

        let spawned = thread::Builder::new()
            .name(format!("logcast-ws-{}", self.hub_name))
            .spawn(move || session.run(out_rx, ready_tx));

        if let Err(e) = spawned {
            self.shared.transition(epoch, ConnectionState::Faulted);
            self.outbound.lock().take();
            return Err(TransportError::Connect(e.to_string()));
        }

        let wait = self.connect_timeout + Duration::from_secs(1);
        match ready_rx.recv_timeout(wait) {
            Ok(Ok(())) => {
                tracing::debug!(url = %self.url, "Hub connection started");
                Ok(())
            }
            Ok(Err(e)) => {
                self.outbound.lock().take();
                Err(e)
            }
            Err(_) => {
                self.shared.invalidate(ConnectionState::Faulted);
                self.outbound.lock().take();
                Err(TransportError::Timeout(self.connect_timeout))
            }
        }
    }

    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<(), TransportError> {
        let state = self.state();
        if !state.is_connected() {
            return Err(TransportError::NotConnected(state));
        }

        let frame = HubMessage::invoke(method, args).to_json()?;

        let outbound = self.outbound.lock();
        let sender = outbound
            .as_ref()
            .ok_or(TransportError::NotConnected(state))?;
        sender.try_send(Message::Text(frame)).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Send("send buffer full".to_string()),
            TrySendError::Closed(_) => TransportError::Send("session closed".to_string()),
        })
    }

    fn stop(&self) {
        self.shared.invalidate(ConnectionState::Disconnected);
        if self.outbound.lock().take().is_some() {
            tracing::debug!(url = %self.url, "Hub connection stopped");
        }
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnection")
            .field("url", &self.url)
            .field("state", &self.state())
            .finish()
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Local side closed the session
    Closed,
    /// Remote side went away or the socket failed
    Failed,
}

enum Step {
    Outbound(Option<Message>),
    Incoming(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
    Heartbeat,
}

struct Session {
    url: String,
    connect_timeout: Duration,
    shared: Arc<Shared>,
    epoch: u64,
}

impl Session {
    fn run(
        self,
        outbound: mpsc::Receiver<Message>,
        ready: std_mpsc::SyncSender<Result<(), TransportError>>,
    ) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                self.shared.transition(self.epoch, ConnectionState::Faulted);
                let _ = ready.send(Err(TransportError::Connect(e.to_string())));
                return;
            }
        };

        runtime.block_on(async move {
            let connect = connect_async(self.url.as_str());
            let stream = match tokio::time::timeout(self.connect_timeout, connect).await {
                Ok(Ok((stream, _response))) => stream,
                Ok(Err(e)) => {
                    self.shared.transition(self.epoch, ConnectionState::Faulted);
                    let _ = ready.send(Err(TransportError::Connect(e.to_string())));
                    return;
                }
                Err(_) => {
                    self.shared.transition(self.epoch, ConnectionState::Faulted);
                    let _ = ready.send(Err(TransportError::Timeout(self.connect_timeout)));
                    return;
                }
            };

            let current = self.shared.transition(self.epoch, ConnectionState::Connected);
            if !current || ready.send(Ok(())).is_err() {
                // Superseded while connecting
                let mut stream = stream;
                let _ = stream.close(None).await;
                return;
            }

            let end = drive(stream, outbound).await;
            let state = match end {
                SessionEnd::Closed => ConnectionState::Disconnected,
                SessionEnd::Failed => ConnectionState::Faulted,
            };
            if self.shared.transition(self.epoch, state) {
                tracing::debug!(url = %self.url, ?state, "Hub session ended");
            }
        });
    }
}

async fn drive(stream: WsStream, mut outbound: mpsc::Receiver<Message>) -> SessionEnd {
    let (mut sink, mut source) = stream.split();
    let mut heartbeat: Option<Interval> = None;

    loop {
        let step = tokio::select! {
            message = outbound.recv() => Step::Outbound(message),
            message = source.next() => Step::Incoming(message),
            () = next_heartbeat(&mut heartbeat) => Step::Heartbeat,
        };

        match step {
            Step::Outbound(Some(message)) => {
                if let Err(e) = sink.send(message).await {
                    tracing::debug!(error = %e, "Failed to write to hub");
                    return SessionEnd::Failed;
                }
            }
            Step::Outbound(None) => {
                let _ = sink.close().await;
                return SessionEnd::Closed;
            }
            Step::Incoming(Some(Ok(Message::Text(text)))) => {
                let Ok(message) = HubMessage::from_json(&text) else {
                    continue;
                };
                if let Some(hello) = message.as_hello() {
                    let period = Duration::from_millis(hello.heartbeat_interval.max(1));
                    let mut ticker = interval_at(Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    heartbeat = Some(ticker);
                }
            }
            Step::Incoming(Some(Ok(Message::Close(frame)))) => {
                tracing::debug!(?frame, "Hub closed the session");
                return SessionEnd::Failed;
            }
            Step::Incoming(Some(Ok(_))) => {}
            Step::Incoming(Some(Err(e))) => {
                tracing::debug!(error = %e, "Hub socket error");
                return SessionEnd::Failed;
            }
            Step::Incoming(None) => return SessionEnd::Failed,
            Step::Heartbeat => {
                let Ok(frame) = HubMessage::heartbeat().to_json() else {
                    continue;
                };
                if sink.send(Message::Text(frame)).await.is_err() {
                    return SessionEnd::Failed;
                }
            }
        }
    }
}

async fn next_heartbeat(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
