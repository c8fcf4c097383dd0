use crate::protocol::{FtpUpdate, OutboundMessage, PairTrainerRider};
use crate::recorder::iso8601;
use crate::state::{DashboardState, DEFAULT_THRESHOLD};
use crate::store::{keys, KeyValueStore};
use crate::transport::{self, Transport};
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use tracing::{info, warn};

pub const MIN_THRESHOLD: u32 = 50;
pub const MAX_THRESHOLD: u32 = 400;
pub const FALLBACK_THRESHOLD: u32 = 100;

pub fn pairing_ttl() -> Duration {
    Duration::days(30)
}

pub fn generate_client_id() -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("web_client_{suffix}")
}

/// Leading-integer parse: optional sign, then digits; trailing junk ignored.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    seen.then_some(if negative { -value } else { value })
}

pub fn clamp_threshold(value: i64) -> u32 {
    value.clamp(i64::from(MIN_THRESHOLD), i64::from(MAX_THRESHOLD)) as u32
}

/// Non-numeric input becomes 100; everything is clamped to 50..=400.
pub fn parse_threshold(raw: &str) -> u32 {
    parse_leading_int(raw).map_or(FALLBACK_THRESHOLD, clamp_threshold)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairingRecord {
    pub paired_device_id: Option<String>,
    pub threshold_power: f64,
}

impl PairingRecord {
    /// Missing or expired keys read back as unpaired with the default threshold.
    pub fn load(store: &mut dyn KeyValueStore) -> Self {
        let paired_device_id = store.get(keys::PAIRED_TRAINER).filter(|s| !s.is_empty());
        let threshold_power = store
            .get(keys::TRAINER_FTP)
            .and_then(|s| parse_leading_int(&s))
            .filter(|v| *v > 0)
            .map_or(DEFAULT_THRESHOLD, |v| v as f64);
        Self {
            paired_device_id,
            threshold_power,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingState {
    Unpaired,
    Paired { device_id: String },
}

pub struct PairingController {
    app_id: String,
    client_id: String,
    state: PairingState,
}

impl PairingController {
    pub fn new(app_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            client_id: client_id.into(),
            state: PairingState::Unpaired,
        }
    }

    pub fn state(&self) -> &PairingState {
        &self.state
    }

    pub fn paired_id(&self) -> Option<&str> {
        match &self.state {
            PairingState::Paired { device_id } => Some(device_id),
            PairingState::Unpaired => None,
        }
    }

    /// Threshold controls are only editable while paired.
    pub fn threshold_editable(&self) -> bool {
        matches!(self.state, PairingState::Paired { .. })
    }

    /// Startup: re-pairs from a persisted record and announces it once.
    /// The announcement is not retried if the link is not up yet.
    pub fn restore(
        &mut self,
        dashboard: &mut DashboardState,
        store: &mut dyn KeyValueStore,
        link: &mut dyn Transport,
    ) -> bool {
        let record = PairingRecord::load(store);
        let Some(device_id) = record.paired_device_id else {
            return false;
        };
        dashboard.set_threshold_power(record.threshold_power);
        info!(device_id = %device_id, threshold = record.threshold_power, "restored pairing");
        self.state = PairingState::Paired { device_id };
        self.announce(link);
        true
    }

    /// Dropdown selection: the empty entry unpairs.
    pub fn select(
        &mut self,
        selection: &str,
        dashboard: &DashboardState,
        store: &mut dyn KeyValueStore,
        link: &mut dyn Transport,
    ) {
        if selection.is_empty() {
            self.unpair(store);
        } else {
            self.pair(selection, dashboard, store, link);
        }
    }

    pub fn pair(
        &mut self,
        device_id: &str,
        dashboard: &DashboardState,
        store: &mut dyn KeyValueStore,
        link: &mut dyn Transport,
    ) {
        if device_id.is_empty() {
            self.unpair(store);
            return;
        }
        self.state = PairingState::Paired {
            device_id: device_id.to_string(),
        };
        let threshold = clamp_threshold(dashboard.threshold_power().round() as i64);
        persist(store, keys::PAIRED_TRAINER, device_id);
        persist(store, keys::TRAINER_FTP, &threshold.to_string());
        info!(device_id, "paired with trainer");
        self.announce(link);
    }

    pub fn unpair(&mut self, store: &mut dyn KeyValueStore) {
        if let PairingState::Paired { device_id } = &self.state {
            info!(device_id = %device_id, "unpaired");
        }
        self.state = PairingState::Unpaired;
        for key in [keys::PAIRED_TRAINER, keys::TRAINER_FTP] {
            if let Err(e) = store.clear(key) {
                warn!(key, error = %e, "failed to erase pairing record");
            }
        }
    }

    /// Free-text threshold entry.
    pub fn update_threshold(
        &mut self,
        raw: &str,
        dashboard: &mut DashboardState,
        store: &mut dyn KeyValueStore,
        link: &mut dyn Transport,
    ) -> u32 {
        self.apply_threshold(parse_threshold(raw), dashboard, store, link)
    }

    /// Slider threshold entry.
    pub fn set_threshold(
        &mut self,
        value: i64,
        dashboard: &mut DashboardState,
        store: &mut dyn KeyValueStore,
        link: &mut dyn Transport,
    ) -> u32 {
        self.apply_threshold(clamp_threshold(value), dashboard, store, link)
    }

    fn apply_threshold(
        &mut self,
        ftp: u32,
        dashboard: &mut DashboardState,
        store: &mut dyn KeyValueStore,
        link: &mut dyn Transport,
    ) -> u32 {
        dashboard.set_threshold_power(f64::from(ftp));
        if self.threshold_editable() {
            persist(store, keys::TRAINER_FTP, &ftp.to_string());
        }
        // Sent whether or not a trainer is paired.
        let msg = OutboundMessage::SetFtp(FtpUpdate {
            uuid_trainer: self.paired_id().map(str::to_string),
            ftp,
            time: iso8601(Utc::now()),
        });
        self.send(link, &msg);
        ftp
    }

    /// Sends the pairing request for the current trainer, if any.
    pub fn announce(&self, link: &mut dyn Transport) {
        let Some(device_id) = self.paired_id() else {
            return;
        };
        let msg = OutboundMessage::PairTrainerRider(PairTrainerRider {
            uuid_trainer: device_id.to_string(),
            uuid_rider: self.client_id.clone(),
        });
        self.send(link, &msg);
    }

    fn send(&self, link: &mut dyn Transport, msg: &OutboundMessage) {
        if let Err(e) = transport::send(link, &self.app_id, msg) {
            warn!(topic = msg.suffix(), error = %e, "outbound message not sent");
        }
    }
}

fn persist(store: &mut dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value, pairing_ttl()) {
        warn!(key, error = %e, "failed to persist pairing record");
    }
}
