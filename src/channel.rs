//! The chat channel for one negotiation session.
//!
//! ## Lifecycle
//! `Closed` → `Opening` → `Open` → `Closed`. Connecting to a different
//! session id tears the previous connection down and starts a fresh
//! transcript; connections are never reused across sessions. Loss of the
//! connection lands in `Closed` and is not retried.
//!
//! ## Ordering
//! Inbound text frames and local sends are appended to the transcript in
//! the order the owning task handles them. [`SessionChannel::recv`] is
//! cancel-safe, so it can sit in a `tokio::select!` next to user input.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{NegotiationError, Result};
use crate::protocol::SessionId;
use crate::transcript::{Transcript, TranscriptEntry};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed,
    Opening,
    Open,
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelState::Closed => write!(f, "closed"),
            ChannelState::Opening => write!(f, "opening"),
            ChannelState::Open => write!(f, "open"),
        }
    }
}

pub struct SessionChannel {
    config: ClientConfig,
    session_id: Option<SessionId>,
    state: ChannelState,
    socket: Option<WsStream>,
    transcript: Transcript,
}

impl SessionChannel {
    /// A closed channel bound to no session yet.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session_id: None,
            state: ChannelState::Closed,
            socket: None,
            transcript: Transcript::new(),
        }
    }

    /// Build a channel and connect it to `session_id` in one step.
    pub async fn open(config: ClientConfig, session_id: SessionId) -> Result<Self> {
        let mut channel = Self::new(config);
        channel.connect(session_id).await?;
        Ok(channel)
    }

    /// Connect to the channel for `session_id`.
    ///
    /// Already open on the same id: nothing happens. A different id closes
    /// the current connection and discards its transcript first. On failure
    /// the channel is left `Closed`.
    pub async fn connect(&mut self, session_id: SessionId) -> Result<()> {
        if self.session_id.as_ref() == Some(&session_id) && self.state == ChannelState::Open {
            return Ok(());
        }
        self.close().await;
        self.transcript = Transcript::new();

        let url = self.config.channel_url(&session_id);
        self.session_id = Some(session_id);
        self.state = ChannelState::Opening;
        debug!(url = %url, "opening negotiation channel");

        let handshake = tokio_tungstenite::connect_async(url.as_str());
        let result = match tokio::time::timeout(self.config.connect_timeout, handshake).await {
            Ok(result) => result,
            Err(_) => Err(tokio_tungstenite::tungstenite::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "websocket handshake timed out",
            ))),
        };

        match result {
            Ok((socket, _response)) => {
                self.socket = Some(socket);
                self.state = ChannelState::Open;
                info!(url = %url, "negotiation channel open");
                Ok(())
            }
            Err(source) => {
                self.state = ChannelState::Closed;
                warn!(url = %url, error = %source, "failed to open negotiation channel");
                Err(NegotiationError::Channel { url, source })
            }
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Follow the current session's transcript as it grows.
    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<TranscriptEntry> {
        self.transcript.subscribe()
    }

    /// Send user text.
    ///
    /// Append local, then transmit: the `You:` entry lands in the transcript
    /// before the frame is written and is never reconciled with a server
    /// acknowledgement. Returns `false` without doing anything when the
    /// channel is not open or the text is blank. The text goes out verbatim.
    pub async fn send(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if self.state != ChannelState::Open {
            debug!(state = %self.state, "dropping outbound message, channel not open");
            return false;
        }
        self.transcript.append_local(text);
        self.transmit(text).await;
        true
    }

    async fn transmit(&mut self, text: &str) {
        let Some(socket) = self.socket.as_mut() else {
            return;
        };
        if let Err(e) = socket.send(WsMessage::Text(text.to_string())).await {
            warn!(error = %e, "negotiation channel write failed");
            self.mark_closed();
        }
    }

    /// Wait for the next server message and append it to the transcript.
    ///
    /// Returns the appended entry, or `None` once the channel is closed
    /// (immediately, if it already was). Non-text frames are skipped.
    pub async fn recv(&mut self) -> Option<TranscriptEntry> {
        loop {
            if self.state != ChannelState::Open {
                return None;
            }
            let frame = self.socket.as_mut()?.next().await;
            match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let index = self.transcript.append_remote(text);
                    return self.transcript.get(index).cloned();
                }
                Some(Ok(WsMessage::Binary(bytes))) => {
                    debug!(len = bytes.len(), "ignoring binary frame");
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    info!(?frame, "negotiation channel closed by server");
                    self.mark_closed();
                    return None;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "negotiation channel read failed");
                    self.mark_closed();
                    return None;
                }
                None => {
                    info!("negotiation channel stream ended");
                    self.mark_closed();
                    return None;
                }
            }
        }
    }

    /// Close the connection. Only the first call on an open channel does
    /// anything; it returns `true` in that case.
    pub async fn close(&mut self) -> bool {
        let Some(mut socket) = self.socket.take() else {
            self.state = ChannelState::Closed;
            return false;
        };
        self.state = ChannelState::Closed;
        if let Err(e) = socket.close(None).await {
            debug!(error = %e, "close handshake did not complete");
        }
        info!(session_id = ?self.session_id.as_ref().map(SessionId::as_str), "negotiation channel closed");
        true
    }

    fn mark_closed(&mut self) {
        self.state = ChannelState::Closed;
        self.socket = None;
    }
}

/// Dropping an open channel drops the TCP connection without a WebSocket
/// close handshake; the peer sees an abrupt disconnect. Call
/// [`SessionChannel::close`] first for an orderly close frame.
impl Drop for SessionChannel {
    fn drop(&mut self) {
        if self.socket.is_some() {
            debug!("negotiation channel dropped while open, no close frame sent");
        }
    }
}
