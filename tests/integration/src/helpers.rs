//! Test helpers
//!
//! [`TestServer`] runs the hub host router on `127.0.0.1:0`; [`TestListener`]
//! is a minimal WebSocket client that joins a group and collects pushes.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use logcast_common::HubConfig;
use logcast_core::{HubMessage, LoggedEvent, OpCode};
use logcast_hub::{create_app, create_hub_state, HubRegistry};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for a push that is expected to arrive
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding that nothing will arrive
pub const SILENCE_TIMEOUT: Duration = Duration::from_millis(300);

/// Hub host running in the test process
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: HubRegistry,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a hub host with default settings
    pub async fn start() -> Result<Self> {
        Self::start_with_config(HubConfig::default()).await
    }

    /// Start a hub host with custom settings
    pub async fn start_with_config(config: HubConfig) -> Result<Self> {
        let registry = HubRegistry::new();
        let app = create_app(create_hub_state(config, registry.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            registry,
            handle,
        })
    }

    /// Base address a dispatcher is configured with
    pub fn base_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// WebSocket endpoint of one hub
    pub fn hub_url(&self, hub: &str) -> String {
        format!("ws://{}/hubs/{hub}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// WebSocket listener connected to a hub
pub struct TestListener {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pub heartbeat_interval: u64,
}

impl TestListener {
    /// Connect and wait for Hello
    pub async fn connect(url: &str) -> Result<Self> {
        let (mut stream, _) = connect_async(url).await.context("WebSocket connect failed")?;

        let hello = next_message(&mut stream, RECEIVE_TIMEOUT).await?;
        let payload = hello
            .as_hello()
            .ok_or_else(|| anyhow!("expected Hello, got {hello}"))?;

        Ok(Self {
            stream,
            heartbeat_interval: payload.heartbeat_interval,
        })
    }

    /// Connect and join `group` (the default group when `None`)
    pub async fn listen(url: &str, group: Option<&str>) -> Result<Self> {
        let mut listener = Self::connect(url).await?;
        listener.join(group).await?;
        Ok(listener)
    }

    /// Send Listen and wait for the acknowledgement
    pub async fn join(&mut self, group: Option<&str>) -> Result<()> {
        self.send(&HubMessage::listen(group)).await?;
        let ack = self.recv(RECEIVE_TIMEOUT).await?;
        if ack.op != OpCode::ListenAck {
            bail!("expected ListenAck, got {ack}");
        }
        Ok(())
    }

    /// Send a frame
    pub async fn send(&mut self, message: &HubMessage) -> Result<()> {
        self.stream.send(Message::Text(message.to_json()?)).await?;
        Ok(())
    }

    /// Receive the next frame
    pub async fn recv(&mut self, timeout: Duration) -> Result<HubMessage> {
        next_message(&mut self.stream, timeout).await
    }

    /// Receive the next pushed event
    pub async fn next_event(&mut self) -> Result<LoggedEvent> {
        loop {
            let message = self.recv(RECEIVE_TIMEOUT).await?;
            if let Some(event) = message.as_logged_event() {
                return Ok(event);
            }
        }
    }

    /// Check that no event arrives within [`SILENCE_TIMEOUT`]
    pub async fn expect_silence(&mut self) -> Result<()> {
        match self.recv(SILENCE_TIMEOUT).await {
            Ok(message) if message.as_logged_event().is_some() => {
                bail!("unexpected push: {message}")
            }
            _ => Ok(()),
        }
    }

    /// Receive the raw next text frame
    pub async fn next_text(&mut self, timeout: Duration) -> Result<String> {
        loop {
            let frame = tokio::time::timeout(timeout, self.stream.next())
                .await
                .context("timed out waiting for frame")?
                .ok_or_else(|| anyhow!("connection closed"))??;
            if let Message::Text(text) = frame {
                return Ok(text);
            }
        }
    }
}

async fn next_message(
    stream: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
    timeout: Duration,
) -> Result<HubMessage> {
    loop {
        let frame = tokio::time::timeout(timeout, stream.next())
            .await
            .context("timed out waiting for frame")?
            .ok_or_else(|| anyhow!("connection closed"))??;

        match frame {
            Message::Text(text) => return Ok(HubMessage::from_json(&text)?),
            Message::Close(frame) => bail!("connection closed: {frame:?}"),
            _ => {}
        }
    }
}

/// Poll `condition` until it holds or `timeout` passes
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

/// An address nothing listens on
pub async fn closed_port_address() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("ws://{addr}"))
}
