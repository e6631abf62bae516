use crate::device::Device;
use crate::protocol::{ConnectData, Event, Method, RemoteControlData, Request};
use crate::types::RemoteKey;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Interval between transport-level pings sent to idle clients
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Lifecycle of a control session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Transport upgraded, no application message yet
    Open,
    /// At least one application message received
    Active,
    /// Transport closed by either side
    Closed,
}

/// One client's control-channel session
///
/// Sessions share nothing but the [`Device`] handle and the pairing token.
pub struct ControlSession {
    id: Uuid,
    device: Device,
    token: Arc<str>,
    phase: SessionPhase,
}

impl ControlSession {
    /// Create a session bound to the shared device and pairing token
    pub fn new(device: Device, token: Arc<str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device,
            token,
            phase: SessionPhase::Open,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Handle one inbound text frame and produce the reply event
    ///
    /// Every frame yields exactly one reply. Invalid JSON produces an error
    /// event and leaves the session usable.
    pub fn handle_text(&mut self, text: &str) -> Event {
        if self.phase == SessionPhase::Open {
            self.phase = SessionPhase::Active;
            tracing::debug!("Session {} active", self.id);
        }

        let request = match Request::parse(text) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Session {} sent invalid JSON: {}", self.id, e);
                return Event::invalid_json();
            }
        };

        match request.method {
            Method::ChannelConnect => {
                tracing::info!("Session {} connected, issuing pairing token", self.id);
                Event::ChannelConnect {
                    data: ConnectData {
                        id: request.request_id(),
                        token: self.token.to_string(),
                    },
                }
            }
            Method::RemoteControl => {
                let cmd = request.key_code();
                let state = match cmd.as_str().filter(|code| !code.is_empty()) {
                    Some(code) => self.device.apply(&RemoteKey::parse(code)),
                    None => self.device.snapshot(),
                };
                tracing::debug!("Session {} key {} -> {:?}", self.id, cmd, state);
                Event::RemoteControl {
                    data: RemoteControlData { cmd, state },
                }
            }
            Method::Unknown => {
                tracing::debug!("Session {} sent unknown message: {}", self.id, request.raw);
                Event::Unknown {
                    received: request.raw,
                }
            }
        }
    }

    /// Serve the session until the client disconnects
    pub async fn run(mut self, socket: WebSocket) {
        tracing::info!("Control session {} opened", self.id);
        let (mut write, mut read) = socket.split();

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if let Err(e) = write.send(Message::Ping(Vec::new())).await {
                        tracing::warn!("Session {} heartbeat failed: {}", self.id, e);
                        break;
                    }
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event = self.handle_text(&text);
                        let json = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!("Failed to encode reply: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = write.send(Message::Text(json)).await {
                            tracing::warn!("Session {} send failed: {}", self.id, e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!("Session {} transport error: {}", self.id, e);
                        break;
                    }
                    Some(Ok(_)) => {}
                },
            }
        }

        self.close();
    }

    fn close(&mut self) {
        self.phase = SessionPhase::Closed;
        tracing::info!("Control session {} {:?}", self.id, self.phase);
    }
}
