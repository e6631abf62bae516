use serde::{Deserialize, Serialize};

/// Service-type identifier announced over discovery and used as the UPnP device type
pub const SERVICE_TYPE: &str = "urn:samsung.com:device:RemoteControlReceiver:1";

/// Friendly name reported by the description documents
pub const DEVICE_NAME: &str = "Fake Samsung TV";

/// Model name / product code reported by the description documents
pub const MODEL_NAME: &str = "Tizen 7.0 Mock";

/// Manufacturer reported by the UPnP description
pub const MANUFACTURER: &str = "Samsung Electronics";

/// API version reported by the info endpoint
pub const API_VERSION: &str = "2.0.0";

/// Path of the persistent control channel
pub const CONTROL_PATH: &str = "/api/v2/channels/samsung.remote.control";

/// Pairing token handed out by every connect handshake
pub type Token = String;

/// Snapshot of the emulated hardware status
///
/// This is what the control channel echoes back after every remote command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub power: bool,
    pub volume: u8,
    pub channel: u32,
}

/// Remote-control key codes understood by the emulator
///
/// Codes outside this set parse as [`RemoteKey::Other`] and leave the device untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteKey {
    VolumeUp,
    VolumeDown,
    ChannelUp,
    ChannelDown,
    Mute,
    Power,
    /// Numeric key used for direct channel entry
    Digit(u8),
    /// Commits the pending digit entry
    Enter,
    Other(String),
}

impl RemoteKey {
    /// Parse a wire key code such as `KEY_VOLUP`
    pub fn parse(code: &str) -> Self {
        match code {
            "KEY_VOLUP" => RemoteKey::VolumeUp,
            "KEY_VOLDOWN" => RemoteKey::VolumeDown,
            "KEY_CHUP" => RemoteKey::ChannelUp,
            "KEY_CHDOWN" => RemoteKey::ChannelDown,
            "KEY_MUTE" => RemoteKey::Mute,
            "KEY_POWER" => RemoteKey::Power,
            "KEY_ENTER" => RemoteKey::Enter,
            other => match other.strip_prefix("KEY_").and_then(parse_digit) {
                Some(d) => RemoteKey::Digit(d),
                None => RemoteKey::Other(other.to_string()),
            },
        }
    }
}

fn parse_digit(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [b @ b'0'..=b'9'] => Some(b - b'0'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        assert_eq!(RemoteKey::parse("KEY_VOLUP"), RemoteKey::VolumeUp);
        assert_eq!(RemoteKey::parse("KEY_CHDOWN"), RemoteKey::ChannelDown);
        assert_eq!(RemoteKey::parse("KEY_7"), RemoteKey::Digit(7));
        assert_eq!(RemoteKey::parse("KEY_ENTER"), RemoteKey::Enter);
    }

    #[test]
    fn unknown_codes_are_preserved() {
        assert_eq!(
            RemoteKey::parse("KEY_HDMI"),
            RemoteKey::Other("KEY_HDMI".to_string())
        );
        assert_eq!(RemoteKey::parse("KEY_10"), RemoteKey::Other("KEY_10".to_string()));
    }
}
