use crate::protocol::{topic, OutboundMessage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("transport not connected")]
    NotConnected,
    #[error("mqtt client error: {0}")]
    Client(#[from] rumqttc::ClientError),
    #[error("payload encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("link thread spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Minimal pub/sub surface the dashboard needs. Connecting happens when the
/// concrete link is created; inbound traffic arrives as `LinkEvent`s.
pub trait Transport {
    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError>;
    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), LinkError>;
    fn is_connected(&self) -> bool;
}

pub fn send(link: &mut dyn Transport, app_id: &str, msg: &OutboundMessage) -> Result<(), LinkError> {
    let payload = msg.payload()?;
    link.publish(&topic(app_id, msg.suffix()), payload)
}
