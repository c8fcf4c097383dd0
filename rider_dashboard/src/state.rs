use crate::gauge::{DialKind, DialReading};
use tracing::warn;

pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// Live gauge values. Written by the router and the pairing controller, read
/// by the render loop and the recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    current_power: f64,
    target_power: f64,
    max_power: f64,
    current_cadence: f64,
    target_cadence: f64,
    max_cadence: f64,
    threshold_power: f64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            current_power: 120.0,
            target_power: 150.0,
            max_power: 200.0,
            current_cadence: 90.0,
            target_cadence: 100.0,
            max_cadence: 160.0,
            threshold_power: DEFAULT_THRESHOLD,
        }
    }
}

fn sanitize(field: &str, value: f64) -> Option<f64> {
    if !value.is_finite() {
        warn!(field, value, "ignoring non-finite value");
        return None;
    }
    Some(value.max(0.0))
}

impl DashboardState {
    pub fn current_power(&self) -> f64 {
        self.current_power
    }

    /// Target power, as a percent of threshold.
    pub fn target_power(&self) -> f64 {
        self.target_power
    }

    pub fn max_power(&self) -> f64 {
        self.max_power
    }

    pub fn current_cadence(&self) -> f64 {
        self.current_cadence
    }

    pub fn target_cadence(&self) -> f64 {
        self.target_cadence
    }

    pub fn max_cadence(&self) -> f64 {
        self.max_cadence
    }

    /// Always strictly positive.
    pub fn threshold_power(&self) -> f64 {
        self.threshold_power
    }

    pub fn set_current_power(&mut self, watts: f64) {
        if let Some(v) = sanitize("current_power", watts) {
            self.current_power = v;
        }
    }

    pub fn set_target_power(&mut self, percent: f64) {
        if let Some(v) = sanitize("target_power", percent) {
            self.target_power = v;
        }
    }

    pub fn set_current_cadence(&mut self, rpm: f64) {
        if let Some(v) = sanitize("current_cadence", rpm) {
            self.current_cadence = v;
        }
    }

    pub fn set_target_cadence(&mut self, rpm: f64) {
        if let Some(v) = sanitize("target_cadence", rpm) {
            self.target_cadence = v;
        }
    }

    /// Returns false (leaving the old value) for non-positive input.
    pub fn set_threshold_power(&mut self, watts: f64) -> bool {
        if !watts.is_finite() || watts <= 0.0 {
            warn!(watts, "ignoring non-positive threshold");
            return false;
        }
        self.threshold_power = watts;
        true
    }

    pub fn power_dial(&self) -> (DialKind, DialReading) {
        (
            DialKind::Power { threshold: self.threshold_power },
            DialReading {
                measured: self.current_power,
                target: self.target_power,
                max_value: self.max_power,
            },
        )
    }

    pub fn cadence_dial(&self) -> (DialKind, DialReading) {
        (
            DialKind::Cadence,
            DialReading {
                measured: self.current_cadence,
                target: self.target_cadence,
                max_value: self.max_cadence,
            },
        )
    }
}

/// Known trainer ids in arrival order plus the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    devices: Vec<String>,
    selected: Option<String>,
}

impl DeviceList {
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.devices.iter().any(|d| d == id)
    }

    /// Appends `id` unless it is empty or already known.
    pub fn insert(&mut self, id: &str) -> bool {
        if id.is_empty() || self.contains(id) {
            return false;
        }
        self.devices.push(id.to_string());
        true
    }

    /// Rebuilds the list wholesale, keeping the paired id present and selected.
    pub fn replace(&mut self, ids: Vec<String>, paired: Option<&str>) {
        self.devices.clear();
        for id in ids {
            self.insert(&id);
        }
        self.select(paired);
    }

    /// Selects `id`, adding it to the list if needed. `None` clears the selection.
    pub fn select(&mut self, id: Option<&str>) {
        match id.filter(|s| !s.is_empty()) {
            Some(id) => {
                self.insert(id);
                self.selected = Some(id.to_string());
            }
            None => self.selected = None,
        }
    }

    /// Dropdown entries, led by the empty "Select Trainer" placeholder.
    pub fn options(&self) -> Vec<&str> {
        std::iter::once("")
            .chain(self.devices.iter().map(String::as_str))
            .collect()
    }
}
