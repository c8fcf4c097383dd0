use crate::gauge::format_number;
use crate::state::DashboardState;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_EXPORT_NAME: &str = "ride.gpx";

/// `2025-01-01T12:00:00.000Z`
pub fn iso8601(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub power: f64,
    pub cadence: f64,
}

/// Append-only log of once-per-interval samples.
#[derive(Debug)]
pub struct SessionRecorder {
    interval: Duration,
    next_due: Option<Instant>,
    samples: Vec<Sample>,
}

impl SessionRecorder {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            samples: Vec::new(),
        }
    }

    /// Records one sample if an interval has elapsed. The first call only arms
    /// the timer; intervals missed while the loop was busy are not back-filled.
    pub fn poll(&mut self, now: Instant, wall: DateTime<Utc>, state: &DashboardState) -> bool {
        let Some(due) = self.next_due else {
            self.next_due = Some(now + self.interval);
            return false;
        };
        if now < due {
            return false;
        }
        self.record(wall, state);
        let mut next = due + self.interval;
        while next <= now {
            next += self.interval;
        }
        self.next_due = Some(next);
        true
    }

    pub fn record(&mut self, wall: DateTime<Utc>, state: &DashboardState) {
        let sample = Sample {
            timestamp: wall,
            power: state.current_power(),
            cadence: state.current_cadence(),
        };
        debug!(power = sample.power, cadence = sample.cadence, "sample recorded");
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn export_gpx(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(
            "<gpx version=\"1.1\" creator=\"RiderDashboard\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n",
        );
        out.push_str("  <trk>\n    <name>Trainer Ride</name>\n    <type>Virtual Ride</type>\n    <trkseg>\n");
        for s in &self.samples {
            let _ = write!(
                out,
                "      <trkpt lat=\"0.0\" lon=\"0.0\">\n        <time>{}</time>\n        <extensions>\n          <power>{}</power>\n          <cadence>{}</cadence>\n        </extensions>\n      </trkpt>\n",
                iso8601(s.timestamp),
                format_number(s.power),
                format_number(s.cadence),
            );
        }
        out.push_str("    </trkseg>\n  </trk>\n</gpx>\n");
        out
    }

    pub fn write_gpx(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        fs::write(path, self.export_gpx())?;
        info!(path = %path.display(), samples = self.samples.len(), "ride exported");
        Ok(())
    }
}
