use serde::{Deserialize, Serialize};

pub const TOPIC_WILDCARD: &str = "#";

pub mod suffix {
    pub const DEVICE_LIST: &str = "device_list";
    pub const SET_TARGET_POWER: &str = "set_target_power";
    pub const SET_MEASURED_POWER: &str = "set_measured_power";
    pub const SET_FTP: &str = "set_ftp";
    pub const SET_TARGET_CADENCE: &str = "set_target_cadence";
    pub const SET_MEASURED_CADENCE: &str = "set_measured_cadence";
    pub const LIST_DEVICES: &str = "list_devices";
    pub const PAIR_TRAINER_RIDER: &str = "pair_trainer_rider";
}

/// Joins the application id and a topic suffix into a full topic path.
pub fn topic(app_id: &str, suffix: &str) -> String {
    format!("{app_id}/{suffix}")
}

/// Subscription filter covering every topic under the application id.
pub fn subscription(app_id: &str) -> String {
    topic(app_id, TOPIC_WILDCARD)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic {
    DeviceList,
    SetTargetPower,
    SetMeasuredPower,
    SetFtp,
    SetTargetCadence,
    SetMeasuredCadence,
}

impl InboundTopic {
    /// Classifies a topic by its final path segment.
    pub fn from_topic(topic: &str) -> Option<Self> {
        let last = topic.rsplit('/').next().unwrap_or(topic);
        match last {
            suffix::DEVICE_LIST => Some(Self::DeviceList),
            suffix::SET_TARGET_POWER => Some(Self::SetTargetPower),
            suffix::SET_MEASURED_POWER => Some(Self::SetMeasuredPower),
            suffix::SET_FTP => Some(Self::SetFtp),
            suffix::SET_TARGET_CADENCE => Some(Self::SetTargetCadence),
            suffix::SET_MEASURED_CADENCE => Some(Self::SetMeasuredCadence),
            _ => None,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::DeviceList => suffix::DEVICE_LIST,
            Self::SetTargetPower => suffix::SET_TARGET_POWER,
            Self::SetMeasuredPower => suffix::SET_MEASURED_POWER,
            Self::SetFtp => suffix::SET_FTP,
            Self::SetTargetCadence => suffix::SET_TARGET_CADENCE,
            Self::SetMeasuredCadence => suffix::SET_MEASURED_CADENCE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeviceList {
    pub device_list: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TargetPower {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_trainer: Option<String>,
    pub target_power: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeasuredPower {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_trainer: Option<String>,
    pub measured_power: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Ftp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_trainer: Option<String>,
    pub ftp: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TargetCadence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_trainer: Option<String>,
    pub target_cadence: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeasuredCadence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_trainer: Option<String>,
    pub measured_cadence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    DeviceList(DeviceList),
    SetTargetPower(TargetPower),
    SetMeasuredPower(MeasuredPower),
    SetFtp(Ftp),
    SetTargetCadence(TargetCadence),
    SetMeasuredCadence(MeasuredCadence),
}

impl InboundMessage {
    /// Decodes a JSON payload whose shape is selected by the topic kind.
    pub fn decode(kind: InboundTopic, payload: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            InboundTopic::DeviceList => Self::DeviceList(serde_json::from_str(payload)?),
            InboundTopic::SetTargetPower => Self::SetTargetPower(serde_json::from_str(payload)?),
            InboundTopic::SetMeasuredPower => {
                Self::SetMeasuredPower(serde_json::from_str(payload)?)
            }
            InboundTopic::SetFtp => Self::SetFtp(serde_json::from_str(payload)?),
            InboundTopic::SetTargetCadence => {
                Self::SetTargetCadence(serde_json::from_str(payload)?)
            }
            InboundTopic::SetMeasuredCadence => {
                Self::SetMeasuredCadence(serde_json::from_str(payload)?)
            }
        })
    }

    pub fn kind(&self) -> InboundTopic {
        match self {
            Self::DeviceList(_) => InboundTopic::DeviceList,
            Self::SetTargetPower(_) => InboundTopic::SetTargetPower,
            Self::SetMeasuredPower(_) => InboundTopic::SetMeasuredPower,
            Self::SetFtp(_) => InboundTopic::SetFtp,
            Self::SetTargetCadence(_) => InboundTopic::SetTargetCadence,
            Self::SetMeasuredCadence(_) => InboundTopic::SetMeasuredCadence,
        }
    }

    /// Trainer id the message is addressed to, if any. Empty ids count as absent.
    pub fn uuid_trainer(&self) -> Option<&str> {
        let id = match self {
            Self::DeviceList(_) => None,
            Self::SetTargetPower(p) => p.uuid_trainer.as_deref(),
            Self::SetMeasuredPower(p) => p.uuid_trainer.as_deref(),
            Self::SetFtp(p) => p.uuid_trainer.as_deref(),
            Self::SetTargetCadence(p) => p.uuid_trainer.as_deref(),
            Self::SetMeasuredCadence(p) => p.uuid_trainer.as_deref(),
        };
        id.filter(|s| !s.is_empty())
    }

    /// Serialises the payload, used by simulators publishing on behalf of a trainer.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::DeviceList(p) => serde_json::to_vec(p),
            Self::SetTargetPower(p) => serde_json::to_vec(p),
            Self::SetMeasuredPower(p) => serde_json::to_vec(p),
            Self::SetFtp(p) => serde_json::to_vec(p),
            Self::SetTargetCadence(p) => serde_json::to_vec(p),
            Self::SetMeasuredCadence(p) => serde_json::to_vec(p),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PairTrainerRider {
    pub uuid_trainer: String,
    pub uuid_rider: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FtpUpdate {
    pub uuid_trainer: Option<String>,
    pub ftp: u32,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    ListDevices,
    PairTrainerRider(PairTrainerRider),
    SetFtp(FtpUpdate),
}

impl OutboundMessage {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::ListDevices => suffix::LIST_DEVICES,
            Self::PairTrainerRider(_) => suffix::PAIR_TRAINER_RIDER,
            Self::SetFtp(_) => suffix::SET_FTP,
        }
    }

    /// `list_devices` goes out with an empty payload; the rest are JSON objects.
    pub fn payload(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::ListDevices => Ok(Vec::new()),
            Self::PairTrainerRider(p) => serde_json::to_vec(p),
            Self::SetFtp(p) => serde_json::to_vec(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_kind_uses_final_segment() {
        assert_eq!(
            InboundTopic::from_topic("App/set_measured_power"),
            Some(InboundTopic::SetMeasuredPower)
        );
        assert_eq!(InboundTopic::from_topic("App/x/device_list"), Some(InboundTopic::DeviceList));
        assert_eq!(InboundTopic::from_topic("App/list_devices"), None);
        assert_eq!(InboundTopic::from_topic("App/set_ftp/extra"), None);
    }

    #[test]
    fn null_and_empty_trainer_ids_are_absent() {
        let msg = InboundMessage::decode(
            InboundTopic::SetFtp,
            r#"{"uuid_trainer": null, "ftp": 250}"#,
        )
        .unwrap();
        assert_eq!(msg.uuid_trainer(), None);

        let msg = InboundMessage::decode(
            InboundTopic::SetTargetCadence,
            r#"{"uuid_trainer": "", "target_cadence": 85}"#,
        )
        .unwrap();
        assert_eq!(msg.uuid_trainer(), None);
    }

    #[test]
    fn missing_value_field_is_rejected() {
        assert!(InboundMessage::decode(InboundTopic::SetTargetPower, r#"{"uuid_trainer":"A"}"#)
            .is_err());
    }

    #[test]
    fn outbound_payloads() {
        assert!(OutboundMessage::ListDevices.payload().unwrap().is_empty());

        let msg = OutboundMessage::SetFtp(FtpUpdate {
            uuid_trainer: None,
            ftp: 210,
            time: "2025-01-01T00:00:00.000Z".to_string(),
        });
        let v: serde_json::Value = serde_json::from_slice(&msg.payload().unwrap()).unwrap();
        assert_eq!(v["uuid_trainer"], serde_json::Value::Null);
        assert_eq!(v["ftp"], 210);
        assert_eq!(msg.suffix(), "set_ftp");
        assert_eq!(topic("App", msg.suffix()), "App/set_ftp");
    }
}
