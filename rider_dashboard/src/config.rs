use crate::store::{keys, KeyValueStore};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_HOST: &str = "mqtt.eclipseprojects.io";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_APP_ID: &str = "UniqueAppID_for_training_sessions";
pub const DEFAULT_WS_PATH: &str = "/mqtt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    Tcp,
    #[default]
    WebSocket,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" | "mqtt" => Ok(Self::Tcp),
            "ws" | "websocket" => Ok(Self::WebSocket),
            other => Err(format!("unknown transport: {other}")),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::WebSocket => f.write_str("ws"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub transport_host: String,
    pub transport_port: u16,
    pub app_id: String,
    pub transport: TransportKind,
    pub ws_path: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            transport_host: DEFAULT_HOST.to_string(),
            transport_port: DEFAULT_PORT,
            app_id: DEFAULT_APP_ID.to_string(),
            transport: TransportKind::default(),
            ws_path: DEFAULT_WS_PATH.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Defaults overlaid with any values persisted in the store.
    pub fn from_store(store: &mut dyn KeyValueStore) -> Self {
        let mut config = Self::default();
        if let Some(host) = store.get(keys::MQTT_HOSTNAME).filter(|s| !s.is_empty()) {
            config.transport_host = host;
        }
        // A zero or non-numeric port falls back to the default.
        if let Some(port) = store
            .get(keys::MQTT_PORT)
            .and_then(|s| s.trim().parse::<u16>().ok())
            .filter(|p| *p != 0)
        {
            config.transport_port = port;
        }
        if let Some(app_id) = store.get(keys::APP_ID).filter(|s| !s.is_empty()) {
            config.app_id = app_id;
        }
        config
    }

    /// Host argument handed to the MQTT client; a full URL for websockets.
    pub fn broker_address(&self) -> String {
        match self.transport {
            TransportKind::Tcp => self.transport_host.clone(),
            TransportKind::WebSocket => format!(
                "ws://{}:{}{}",
                self.transport_host, self.transport_port, self.ws_path
            ),
        }
    }

    pub fn log_summary(&self) {
        info!(
            host = %self.transport_host,
            port = self.transport_port,
            transport = %self.transport,
            app_id = %self.app_id,
            "dashboard configuration"
        );
    }
}

/// Cadence knobs for the cooperative tick loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    pub frame_interval: Duration,
    pub sample_interval: Duration,
    pub width: f64,
    pub height: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(100),
            sample_interval: Duration::from_secs(1),
            width: 800.0,
            height: 1200.0,
        }
    }
}
