use crate::protocol::{InboundMessage, InboundTopic};
use crate::state::{DashboardState, DeviceList};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,
    #[error("payload is not utf-8")]
    NotUtf8,
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// What `handle` did with one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    DevicesReplaced,
    TargetPower,
    MeasuredPower { discovered: bool },
    Threshold,
    TargetCadence,
    MeasuredCadence,
    /// Addressed to a different trainer; only discovery (if any) happened.
    NotOwned { discovered: bool },
    /// Parsed fine but carried a value the state refused.
    Rejected,
    UnknownTopic,
    Discarded,
}

/// Accepts messages with no trainer id, or with the paired one.
pub fn is_owned(msg_trainer: Option<&str>, paired: Option<&str>) -> bool {
    match msg_trainer {
        None => true,
        Some(id) => paired == Some(id),
    }
}

/// Decodes a topic + payload pair. `Ok(None)` means the topic is outside
/// `{app_id}/` or not one we consume.
pub fn decode(
    app_id: &str,
    topic: &str,
    payload: &[u8],
) -> Result<Option<InboundMessage>, DecodeError> {
    let Some(kind) = topic
        .strip_prefix(app_id)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(InboundTopic::from_topic)
    else {
        return Ok(None);
    };
    let text = std::str::from_utf8(payload).map_err(|_| DecodeError::NotUtf8)?;
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(Some(InboundMessage::decode(kind, text)?))
}

/// Interprets inbound telemetry against the dashboard state and device list.
pub struct TelemetryRouter<'a> {
    pub app_id: &'a str,
    pub state: &'a mut DashboardState,
    pub devices: &'a mut DeviceList,
    pub paired: Option<&'a str>,
}

impl TelemetryRouter<'_> {
    /// Malformed or empty payloads are logged and dropped, never surfaced.
    pub fn handle(&mut self, topic: &str, payload: &[u8]) -> Routed {
        match decode(self.app_id, topic, payload) {
            Ok(Some(msg)) => self.apply(msg),
            Ok(None) => Routed::UnknownTopic,
            Err(e) => {
                debug!(topic, error = %e, "discarding inbound payload");
                Routed::Discarded
            }
        }
    }

    pub fn apply(&mut self, msg: InboundMessage) -> Routed {
        let owned = is_owned(msg.uuid_trainer(), self.paired);

        // Discovery happens before the ownership check.
        let discovered = match &msg {
            InboundMessage::SetMeasuredPower(_) => {
                msg.uuid_trainer().is_some_and(|id| self.devices.insert(id))
            }
            _ => false,
        };

        match msg {
            InboundMessage::DeviceList(list) => {
                self.devices.replace(list.device_list, self.paired);
                Routed::DevicesReplaced
            }
            _ if !owned => Routed::NotOwned { discovered },
            InboundMessage::SetTargetPower(p) => {
                self.state.set_target_power(p.target_power);
                Routed::TargetPower
            }
            InboundMessage::SetMeasuredPower(p) => {
                self.state.set_current_power(p.measured_power);
                Routed::MeasuredPower { discovered }
            }
            InboundMessage::SetFtp(p) => {
                if self.state.set_threshold_power(p.ftp) {
                    Routed::Threshold
                } else {
                    Routed::Rejected
                }
            }
            InboundMessage::SetTargetCadence(p) => {
                self.state.set_target_cadence(p.target_cadence);
                Routed::TargetCadence
            }
            InboundMessage::SetMeasuredCadence(p) => {
                self.state.set_current_cadence(p.measured_cadence);
                Routed::MeasuredCadence
            }
        }
    }
}
