//! The reactor: listener, per-connection reader/writer tasks, and the
//! dispatcher loop.
//!
//! Concurrency contract: the dispatcher task is the only place the
//! registry and channels are touched. Reader tasks frame bytes into
//! lines and forward them over the event channel, preserving arrival
//! order per connection; writer tasks drain each connection's send
//! queue. No command handler ever blocks.

use log::{debug, error, info, warn};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Notify, mpsc};

use crate::client::{Client, ClientId, next_client_id};
use crate::config::Settings;
use crate::constants::READ_BUFFER_SIZE;
use crate::errors::ServerError;
use crate::handlers;
use crate::message::RecvBuffer;
use crate::registry::ServerState;

const OUTBOUND_CHANNEL_SIZE: usize = 512;
const EVENT_CHANNEL_SIZE: usize = 1024;

/// Open-fd ceiling requested at startup, clamped to the hard limit.
const FD_LIMIT_TARGET: u64 = 10_000;

const REGISTER_HOWTO: [&str; 5] = [
    ":ircserv NOTICE * :Welcome! Please register in this exact order:",
    ":ircserv NOTICE * :  PASS <server-password>",
    ":ircserv NOTICE * :  NICK <nickname>",
    ":ircserv NOTICE * :  USER <user> 0 * :<real name>",
    ":ircserv NOTICE * :Then #JOIN channels and chat. Commands must be UPPERCASE.",
];

const HTTP_VERBS: [&[u8]; 8] = [
    b"GET ", b"POST ", b"HEAD ", b"PUT ", b"DELETE ", b"OPTIONS ", b"TRACE ", b"CONNECT ",
];

const HTTP_PROBE_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
    Content-Type: text/plain\r\n\
    Content-Length: 31\r\n\
    Connection: close\r\n\
    \r\n\
    This is an IRC server mate ;)\r\n";

enum Event {
    Connected { client: Client },
    Line { id: ClientId, line: String },
    Disconnected { id: ClientId },
}

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Server { settings }
    }

    /// Binds the listener and runs the dispatcher until SIGINT or
    /// SIGQUIT. On return every connection has been closed and all
    /// channels destroyed.
    pub async fn run(self) -> Result<(), ServerError> {
        raise_fd_limit();

        let bind = format!(
            "{}:{}",
            self.settings.config.network.bind_address, self.settings.port
        );
        let listener = TcpListener::bind(&bind).await?;
        info!("Server initialized on port {}", self.settings.port);

        let state = ServerState::new(&self.settings.config.server.name, &self.settings.password);
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let acceptor = tokio::spawn(accept_loop(listener, events_tx));

        let mut sigint = signal(SignalKind::interrupt()).map_err(ServerError::Io)?;
        let mut sigquit = signal(SignalKind::quit()).map_err(ServerError::Io)?;

        loop {
            tokio::select! {
                maybe_event = events_rx.recv() => match maybe_event {
                    Some(Event::Connected { client }) => {
                        debug!("[{}] registered with dispatcher", client.id);
                        state.add_client(client);
                    }
                    Some(Event::Line { id, line }) => {
                        handlers::dispatch_line(&state, id, &line);
                    }
                    Some(Event::Disconnected { id }) => {
                        state.disconnect(id, None);
                    }
                    None => break,
                },
                _ = sigint.recv() => {
                    warn!("Signal received! Stopping server...");
                    break;
                }
                _ = sigquit.recv() => {
                    warn!("Signal received! Stopping server...");
                    break;
                }
            }
        }

        acceptor.abort();
        let ids: Vec<ClientId> = state.clients.iter().map(|entry| entry.id).collect();
        for id in ids {
            state.disconnect(id, None);
        }
        info!(
            "Server with port {} is shutting down.",
            self.settings.port
        );
        Ok(())
    }
}

async fn accept_loop(listener: TcpListener, events: mpsc::Sender<Event>) {
    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                info!("Client connected: {addr:?}");
                let events = events.clone();
                tokio::spawn(async move {
                    setup_connection(socket, addr, events).await;
                });
            }
            Err(e) => {
                // Transient accept failures (EMFILE and friends) back
                // off briefly instead of spinning.
                error!("accept failed: {e}");
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

/// Decides HTTP-probe vs IRC from a peek at the first bytes, before any
/// IRC state exists. Peeked bytes stay in the socket, so nothing leaks
/// into the line parser.
async fn setup_connection(socket: TcpStream, addr: SocketAddr, events: mpsc::Sender<Event>) {
    let mut probe = [0u8; 8];
    let peeked = tokio::time::timeout(Duration::from_millis(100), socket.peek(&mut probe)).await;
    if let Ok(Ok(n)) = peeked {
        if looks_like_http(&probe[..n]) {
            answer_http_probe(socket, addr).await;
            return;
        }
    }

    let id = next_client_id();
    let (tx_outbound, rx_outbound) = mpsc::channel(OUTBOUND_CHANNEL_SIZE);
    let shutdown = Arc::new(Notify::new());
    let client = Client::new(id, addr, tx_outbound, shutdown.clone());
    for line in REGISTER_HOWTO {
        client.send(line);
    }

    let (read_half, write_half) = socket.into_split();
    tokio::spawn(writer_task(write_half, id, rx_outbound));
    if events.send(Event::Connected { client }).await.is_err() {
        return;
    }
    tokio::spawn(reader_task(read_half, id, events, shutdown));
}

fn looks_like_http(first_bytes: &[u8]) -> bool {
    HTTP_VERBS
        .iter()
        .any(|verb| first_bytes.starts_with(verb))
}

async fn answer_http_probe(mut socket: TcpStream, addr: SocketAddr) {
    info!("HTTP probe from {addr:?}, answering with canned response");
    if let Err(e) = socket.write_all(HTTP_PROBE_RESPONSE.as_bytes()).await {
        debug!("failed to answer HTTP probe: {e}");
    }
    let _ = socket.shutdown().await;
}

/// Reads in 1024-byte chunks, frames complete lines, and forwards them
/// to the dispatcher in arrival order. A zero-byte read is the peer
/// hanging up.
async fn reader_task(
    mut reader: OwnedReadHalf,
    id: ClientId,
    events: mpsc::Sender<Event>,
    shutdown: Arc<Notify>,
) {
    let mut scratch = [0u8; READ_BUFFER_SIZE];
    let mut buffer = RecvBuffer::new();
    loop {
        tokio::select! {
            // The dispatcher already removed this connection; just stop.
            _ = shutdown.notified() => break,
            result = reader.read(&mut scratch) => match result {
                Ok(0) => {
                    info!("[{id}] client disconnected");
                    let _ = events.send(Event::Disconnected { id }).await;
                    break;
                }
                Ok(n) => {
                    buffer.push(&scratch[..n]);
                    while let Some(line) = buffer.next_line() {
                        if events.send(Event::Line { id, line }).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                    continue;
                }
                Err(e) => {
                    debug!("[{id}] read error: {e}");
                    let _ = events.send(Event::Disconnected { id }).await;
                    break;
                }
            }
        }
    }
}

/// Drains the connection's send queue. Write failures (EPIPE,
/// ECONNRESET) are logged at debug level and end the task; closing the
/// queue flushes what remains and shuts the socket down.
async fn writer_task(mut writer: OwnedWriteHalf, id: ClientId, mut rx: mpsc::Receiver<String>) {
    while let Some(line) = rx.recv().await {
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            debug!("[{id}] write failed: {e}");
            return;
        }
    }
    let _ = writer.shutdown().await;
}

/// Raises the soft open-fd limit toward the target, bounded by the hard
/// limit. Failure is survivable; the server just accepts fewer clients.
fn raise_fd_limit() {
    unsafe {
        let mut limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        if libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) != 0 {
            warn!("getrlimit failed, keeping default fd limit");
            return;
        }
        let target = FD_LIMIT_TARGET.min(limit.rlim_max as u64) as libc::rlim_t;
        if limit.rlim_cur >= target {
            return;
        }
        limit.rlim_cur = target;
        if libc::setrlimit(libc::RLIMIT_NOFILE, &limit) != 0 {
            warn!("setrlimit failed, keeping default fd limit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_verbs_need_the_trailing_space() {
        assert!(looks_like_http(b"GET / HTTP/1.1"));
        assert!(looks_like_http(b"POST /x"));
        assert!(looks_like_http(b"CONNECT h"));
        assert!(!looks_like_http(b"GETX"));
        assert!(!looks_like_http(b"PASS secret"));
        assert!(!looks_like_http(b"NICK GET"));
        assert!(!looks_like_http(b""));
    }

    #[test]
    fn probe_response_declares_its_length() {
        let body = HTTP_PROBE_RESPONSE.split("\r\n\r\n").nth(1).unwrap();
        assert_eq!(body.len(), 31);
        assert!(HTTP_PROBE_RESPONSE.contains("Content-Length: 31"));
    }
}
