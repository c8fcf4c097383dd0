pub const INBOUND_CAP: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    ConnectionLost { reason: String },
    Message { topic: String, payload: Vec<u8> },
}

pub use trainer_protocol::{
    subscription, topic, FtpUpdate, InboundMessage, InboundTopic, OutboundMessage,
    PairTrainerRider,
};
