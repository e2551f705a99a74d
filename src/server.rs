//! WebSocket transport: accepts connections, parses client events and hands
//! them to the hub, and writes the hub's events back out as text frames.
//!
//! A plain `GET /` (no upgrade) on the same port is answered with the
//! bundled browser client.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::hub::{ConnId, HubCommand, HubHandle};
use crate::protocol::{ClientEvent, ServerEvent};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// How long to wait for a complete HTTP request head before classifying it.
const REQUEST_HEAD_WAIT: Duration = Duration::from_secs(2);
const REQUEST_HEAD_POLL: Duration = Duration::from_millis(5);

/// Grace period for queued events to flush after the reader stops.
const WRITER_DRAIN: Duration = Duration::from_secs(1);

/// Shared state for all connection tasks.
pub struct GameServer {
    hub: HubHandle,
    next_conn: AtomicU64,
    max_frame_bytes: usize,
}

impl GameServer {
    pub fn new(hub: HubHandle, max_frame_bytes: usize) -> Self {
        Self {
            hub,
            next_conn: AtomicU64::new(1),
            max_frame_bytes,
        }
    }

    /// Tungstenite refuses frames and messages above the limit while reading
    /// the header, before any payload is buffered.
    fn ws_config(&self) -> WebSocketConfig {
        WebSocketConfig {
            max_message_size: Some(self.max_frame_bytes),
            max_frame_size: Some(self.max_frame_bytes),
            ..Default::default()
        }
    }

    fn alloc_conn_id(&self) -> ConnId {
        self.next_conn.fetch_add(1, Ordering::Relaxed)
    }
}

/// Accept connections forever on an already-bound listener.
pub async fn serve(listener: TcpListener, server: Arc<GameServer>) -> std::io::Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "listening for connections");
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let server = Arc::clone(&server);
                tokio::spawn(async move {
                    let conn = server.alloc_conn_id();
                    if let Err(e) = handle_connection(stream, addr, conn, server).await {
                        tracing::warn!(conn, %addr, error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept error");
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    conn: ConnId,
    server: Arc<GameServer>,
) -> Result<(), BoxError> {
    if is_page_request(&stream).await? {
        serve_page(stream).await?;
        return Ok(());
    }

    let ws_stream =
        tokio_tungstenite::accept_async_with_config(stream, Some(server.ws_config())).await?;
    tracing::info!(conn, %addr, "client connected");

    let (ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, rx) = mpsc::unbounded_channel::<ServerEvent>();

    if !server
        .hub
        .send(HubCommand::Connect {
            conn,
            sender: tx.clone(),
        })
        .await
    {
        return Err("hub is not running".into());
    }

    let mut writer = tokio::spawn(
        UnboundedReceiverStream::new(rx)
            .map(|event| Ok::<_, tungstenite::Error>(Message::Text(event.to_text())))
            .forward(ws_sender),
    );

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match ClientEvent::parse(&text) {
                Ok(event) => {
                    if !server.hub.send(HubCommand::Request { conn, event }).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(conn, error = %e, "unparseable frame");
                    let _ = tx.send(ServerEvent::error(format!("invalid event: {e}")));
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(tungstenite::Error::Capacity(e)) => {
                // The rest of the oversized frame is never read, so the
                // connection cannot continue.
                tracing::warn!(conn, error = %e, "oversized frame, closing");
                let _ = tx.send(ServerEvent::error(format!(
                    "frame exceeds limit of {} bytes",
                    server.max_frame_bytes
                )));
                break;
            }
            Err(e) => {
                tracing::warn!(conn, error = %e, "websocket read failed");
                break;
            }
        }
    }

    server.hub.send(HubCommand::Disconnect { conn }).await;
    drop(tx);
    if tokio::time::timeout(WRITER_DRAIN, &mut writer).await.is_err() {
        writer.abort();
    }
    tracing::info!(conn, %addr, "client disconnected");
    Ok(())
}

/// A plain HTTP GET without a websocket upgrade header.
///
/// Peeks until the request head is complete, the buffer is full or
/// REQUEST_HEAD_WAIT runs out, so a head split across segments is not
/// mistaken for a page request.
async fn is_page_request(stream: &TcpStream) -> std::io::Result<bool> {
    let mut buf = [0u8; 1024];
    let deadline = Instant::now() + REQUEST_HEAD_WAIT;
    loop {
        let n = stream.peek(&mut buf).await?;
        let head = &buf[..n];
        if n == 0 || !b"GET".starts_with(&head[..n.min(3)]) {
            return Ok(false);
        }
        let complete = head.windows(4).any(|w| w == b"\r\n\r\n");
        if complete || n == buf.len() || Instant::now() >= deadline {
            let head = String::from_utf8_lossy(head).to_ascii_lowercase();
            return Ok(head.starts_with("get") && !head.contains("upgrade: websocket"));
        }
        tokio::time::sleep(REQUEST_HEAD_POLL).await;
    }
}

async fn serve_page(mut stream: TcpStream) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        INDEX_HTML.len(),
        INDEX_HTML
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
