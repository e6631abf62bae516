use crate::types::DeviceSnapshot;
use serde::Serialize;
use serde_json::{Map, Value};

/// Message methods a client can send on the control channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// `ms.channel.connect`: pairing handshake
    ChannelConnect,
    /// `ms.remote.control`: key press
    RemoteControl,
    /// Anything else, including a missing method
    Unknown,
}

impl Method {
    fn from_wire(method: Option<&str>) -> Self {
        match method {
            Some("ms.channel.connect") => Method::ChannelConnect,
            Some("ms.remote.control") => Method::RemoteControl,
            _ => Method::Unknown,
        }
    }
}

/// Inbound control-channel message
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub params: Value,
    /// The full payload as received, echoed back for unknown methods
    pub raw: Value,
}

impl Request {
    /// Parse a text frame
    ///
    /// Only invalid JSON is an error. Well-formed payloads without a usable
    /// `method` map to [`Method::Unknown`]; a missing `params` becomes `{}`.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let raw: Value = serde_json::from_str(text)?;
        let method = Method::from_wire(raw.get("method").and_then(Value::as_str));
        let params = raw
            .get("params")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        Ok(Self {
            method,
            params,
            raw,
        })
    }

    /// Request identifier supplied with a connect call (`params.id`)
    pub fn request_id(&self) -> Value {
        self.params.get("id").cloned().unwrap_or(Value::Null)
    }

    /// Key code supplied with a remote command (`params.DataOfCmd`)
    pub fn key_code(&self) -> Value {
        self.params.get("DataOfCmd").cloned().unwrap_or(Value::Null)
    }
}

/// Outbound control-channel message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum Event {
    #[serde(rename = "ms.channel.connect")]
    ChannelConnect { data: ConnectData },

    #[serde(rename = "ms.remote.control")]
    RemoteControl { data: RemoteControlData },

    #[serde(rename = "unknown")]
    Unknown { received: Value },

    #[serde(rename = "error")]
    Error { error: String },
}

/// Payload of a connect acknowledgement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectData {
    pub id: Value,
    pub token: String,
}

/// Payload of a remote command acknowledgement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteControlData {
    pub cmd: Value,
    pub state: DeviceSnapshot,
}

impl Event {
    /// Error event sent when a frame is not valid JSON
    pub fn invalid_json() -> Self {
        Event::Error {
            error: "invalid json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_remote_control() {
        let req = Request::parse(
            r#"{"method":"ms.remote.control","params":{"Cmd":"Click","DataOfCmd":"KEY_MUTE"}}"#,
        )
        .unwrap();
        assert_eq!(req.method, Method::RemoteControl);
        assert_eq!(req.key_code(), json!("KEY_MUTE"));
    }

    #[test]
    fn missing_params_default_to_empty_object() {
        let req = Request::parse(r#"{"method":"ms.channel.connect"}"#).unwrap();
        assert_eq!(req.method, Method::ChannelConnect);
        assert_eq!(req.params, json!({}));
        assert_eq!(req.request_id(), Value::Null);
    }

    #[test]
    fn non_object_payloads_are_unknown() {
        assert_eq!(Request::parse("42").unwrap().method, Method::Unknown);
        assert_eq!(
            Request::parse(r#"{"method":7}"#).unwrap().method,
            Method::Unknown
        );
        assert!(Request::parse("{not json").is_err());
    }

    #[test]
    fn events_serialize_with_event_tag() {
        let event = Event::ChannelConnect {
            data: ConnectData {
                id: json!("abc"),
                token: "tok".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "ms.channel.connect", "data": {"id": "abc", "token": "tok"}})
        );

        assert_eq!(
            serde_json::to_value(Event::invalid_json()).unwrap(),
            json!({"event": "error", "error": "invalid json"})
        );

        let ack = Event::RemoteControl {
            data: RemoteControlData {
                cmd: json!("KEY_VOLUP"),
                state: DeviceSnapshot {
                    power: true,
                    volume: 11,
                    channel: 1,
                },
            },
        };
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({
                "event": "ms.remote.control",
                "data": {"cmd": "KEY_VOLUP", "state": {"power": true, "volume": 11, "channel": 1}}
            })
        );
    }
}
