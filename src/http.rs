use crate::device::Device;
use crate::session::ControlSession;
use crate::types::{API_VERSION, CONTROL_PATH, DEVICE_NAME, MANUFACTURER, MODEL_NAME, SERVICE_TYPE};
use axum::{
    extract::{State, WebSocketUpgrade},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// State shared by every HTTP handler and control session
#[derive(Clone)]
pub struct AppState {
    pub device: Device,
    pub token: Arc<str>,
}

/// Build the router serving the description documents and the control channel
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v2/", get(device_info))
        .route("/description.xml", get(description_xml))
        .route(CONTROL_PATH, get(control_channel))
        .with_state(state)
}

async fn device_info() -> impl IntoResponse {
    let short_id = Uuid::new_v4().simple().to_string();
    Json(json!({
        "device": {
            "type": "Samsung SmartTV",
            "name": DEVICE_NAME,
            "id": format!("fake-{}", &short_id[..8]),
            "version": API_VERSION,
            "productCode": MODEL_NAME,
            "model": MODEL_NAME,
            "tokenSupport": "true",
        },
        "id": "api-v2",
        "name": DEVICE_NAME,
        "type": "Samsung TV",
        "version": API_VERSION,
    }))
}

async fn description_xml() -> impl IntoResponse {
    let xml = format!(
        r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>{}</deviceType>
    <friendlyName>{}</friendlyName>
    <manufacturer>{}</manufacturer>
    <modelName>{}</modelName>
    <UDN>uuid:{}</UDN>
  </device>
</root>"#,
        SERVICE_TYPE,
        DEVICE_NAME,
        MANUFACTURER,
        MODEL_NAME,
        Uuid::new_v4()
    );
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

async fn control_channel(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ControlSession::new(state.device, state.token).run(socket))
}
