//! Emulator for a smart TV's network discovery and remote-control protocols
//!
//! This library impersonates a TV on the local network so that remote-control
//! clients can be exercised without real hardware. It provides:
//!
//! - An SSDP discovery responder answering `M-SEARCH` queries with a unicast advertisement
//! - HTTP device-info (`/api/v2/`) and UPnP description (`/description.xml`) documents
//! - A WebSocket control channel with a connect handshake and remote key commands
//! - A shared device model (power, volume, channel) mutated by every session
//! - A pairing token persisted across restarts
//!
//! # Quick Start
//!
//! ```no_run
//! use smarttv_emulator::{Config, Emulator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let emulator = Emulator::bind(Config::default()).await?;
//!     emulator.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Control channel
//!
//! Clients connect to `ws://<host>:8001/api/v2/channels/samsung.remote.control` and
//! exchange JSON messages:
//!
//! ```text
//! -> {"method": "ms.channel.connect", "params": {"id": "abc"}}
//! <- {"event": "ms.channel.connect", "data": {"id": "abc", "token": "<token>"}}
//! -> {"method": "ms.remote.control", "params": {"DataOfCmd": "KEY_VOLUP"}}
//! <- {"event": "ms.remote.control", "data": {"cmd": "KEY_VOLUP", "state": {...}}}
//! ```
//!
//! # Architecture
//!
//! - **Device**: shared state and the key command table
//! - **Token**: durable pairing token
//! - **Protocol**: control-channel message structures
//! - **Session**: per-connection dispatch loop
//! - **Discovery**: multicast search filtering and delayed replies
//! - **Server**: listener, TLS variant and startup

mod config;
mod device;
mod discovery;
mod error;
mod http;
mod net;
mod protocol;
mod server;
mod session;
mod token;
mod types;

// Public exports
pub use config::{Cli, Config};
pub use device::Device;
pub use discovery::{
    Advertisement, DiscoveryResponder, SearchRequest, MAX_RESPONSE_DELAY, SSDP_MULTICAST_ADDR,
    SSDP_PORT,
};
pub use error::{EmulatorError, Result};
pub use http::{router, AppState};
pub use net::local_ip;
pub use protocol::{ConnectData, Event, Method, RemoteControlData, Request};
pub use server::Emulator;
pub use session::{ControlSession, SessionPhase};
pub use token::TokenStore;
pub use types::{
    DeviceSnapshot, RemoteKey, Token, API_VERSION, CONTROL_PATH, DEVICE_NAME, MANUFACTURER,
    MODEL_NAME, SERVICE_TYPE,
};
