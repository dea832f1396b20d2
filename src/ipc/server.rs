//! Unix domain socket server
//!
//! Request-response handling plus push notifications for subscribed
//! clients. Requests forward to the orchestrator over its channel;
//! this layer owns no session state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::events::SessionEvent;
use crate::session::SessionMsg;

use super::protocol::{Notification, Request, Response};

/// Upper bound on a single request body
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// IPC server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    session_tx: mpsc::Sender<SessionMsg>,
    event_tx: broadcast::Sender<SessionEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Bind the socket and prepare to serve
    pub fn new(
        socket_path: &Path,
        session_tx: mpsc::Sender<SessionMsg>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only: the socket carries transcripts and file contents
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            session_tx,
            event_tx,
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self
            .listener
            .as_ref()
            .context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let session_tx = self.session_tx.clone();
                    let event_rx = self.event_tx.subscribe();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = handle_client(stream, session_tx, event_rx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Serve one client: request-response until it subscribes or disconnects
async fn handle_client(
    mut stream: UnixStream,
    session_tx: mpsc::Sender<SessionMsg>,
    event_rx: broadcast::Receiver<SessionEvent>,
) -> Result<()> {
    let mut len_buf = [0u8; 4];

    loop {
        // Read message length (4-byte little-endian)
        match stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("client disconnected");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_BYTES {
            warn!(len, "message too large, disconnecting");
            return Ok(());
        }

        let mut msg_buf = vec![0u8; len];
        stream.read_exact(&mut msg_buf).await?;

        let request: Request =
            serde_json::from_slice(&msg_buf).context("failed to parse request")?;
        debug!(?request, "received request");

        // Subscribing flips the connection into a one-way event stream.
        if matches!(request, Request::Subscribe) {
            send_message(&mut stream, &Response::Subscribed).await?;
            return stream_events(stream, event_rx).await;
        }

        let response = process_request(request, &session_tx).await;
        send_message(&mut stream, &response).await?;
    }
}

/// Push notifications until the subscriber goes away
async fn stream_events(
    mut stream: UnixStream,
    mut event_rx: broadcast::Receiver<SessionEvent>,
) -> Result<()> {
    debug!("client subscribed to notifications");

    loop {
        match event_rx.recv().await {
            Ok(event) => {
                if send_message(&mut stream, &Notification::Event(event))
                    .await
                    .is_err()
                {
                    debug!("subscriber disconnected");
                    return Ok(());
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "subscriber lagged, events skipped");
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}

/// Send a length-prefixed JSON message
async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    stream.write_all(&msg_len).await?;
    stream.write_all(&msg_bytes).await?;

    Ok(())
}

/// Forward a request to the orchestrator and wait for its reply
async fn process_request(request: Request, session_tx: &mpsc::Sender<SessionMsg>) -> Response {
    match request {
        Request::Ping => Response::Pong,

        // Handled by the caller before this point; answered again for totality.
        Request::Subscribe => Response::Subscribed,

        Request::Transcript { text } => {
            text_request(session_tx, move |reply| SessionMsg::Transcript { text, reply }).await
        }

        Request::UploadFile { name, contents } => {
            text_request(session_tx, move |reply| SessionMsg::Upload {
                name,
                contents,
                reply,
            })
            .await
        }

        Request::SetConnectivity { online } => {
            text_request(session_tx, move |reply| SessionMsg::Connectivity {
                online,
                reply,
            })
            .await
        }

        Request::ConnectRepo { name } => {
            text_request(session_tx, move |reply| SessionMsg::ConnectRepo { name, reply }).await
        }

        Request::CreateBranch { name } => {
            text_request(session_tx, move |reply| SessionMsg::CreateBranch { name, reply }).await
        }

        Request::ListCommits => {
            let (reply_tx, reply_rx) = oneshot::channel();
            if session_tx
                .send(SessionMsg::ListCommits { reply: reply_tx })
                .await
                .is_err()
            {
                return session_gone();
            }
            match reply_rx.await {
                Ok(messages) => Response::Commits { messages },
                Err(_) => session_gone(),
            }
        }

        Request::GetStatus => {
            let (reply_tx, reply_rx) = oneshot::channel();
            if session_tx
                .send(SessionMsg::Status { reply: reply_tx })
                .await
                .is_err()
            {
                return session_gone();
            }
            match reply_rx.await {
                Ok(status) => Response::Status(status),
                Err(_) => session_gone(),
            }
        }
    }
}

/// Send a message expecting a plain text reply
async fn text_request<F>(session_tx: &mpsc::Sender<SessionMsg>, make: F) -> Response
where
    F: FnOnce(oneshot::Sender<String>) -> SessionMsg,
{
    let (reply_tx, reply_rx) = oneshot::channel();
    if session_tx.send(make(reply_tx)).await.is_err() {
        return session_gone();
    }
    match reply_rx.await {
        Ok(text) => Response::Reply { text },
        Err(_) => session_gone(),
    }
}

fn session_gone() -> Response {
    Response::Error {
        code: "session_unavailable".to_string(),
        message: "session loop is not running".to_string(),
    }
}
