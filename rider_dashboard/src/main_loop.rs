use crate::config::LoopConfig;
use crate::pairing::PairingController;
use crate::protocol::{subscription, LinkEvent, OutboundMessage};
use crate::recorder::SessionRecorder;
use crate::render_loop::{FrameOutcome, RenderLoop};
use crate::router::{Routed, TelemetryRouter};
use crate::state::{DashboardState, DeviceList};
use crate::store::KeyValueStore;
use crate::surface::Surface;
use crate::transport::{self, Transport};
use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, TryRecvError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Operator input arriving between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Dropdown pick; the empty string is the placeholder and unpairs.
    SelectTrainer(String),
    ThresholdText(String),
    ThresholdSlider(i64),
    Resize { width: f64, height: f64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: usize,
    pub routed: Vec<Routed>,
    pub connected: bool,
    pub sampled: bool,
    pub frame: Option<FrameOutcome>,
}

pub struct MainLoop {
    inbound_rx: Receiver<LinkEvent>,
    app_id: String,
    store: Box<dyn KeyValueStore>,

    state: DashboardState,
    devices: DeviceList,
    pairing: PairingController,
    recorder: SessionRecorder,
    render_loop: RenderLoop,
}

impl MainLoop {
    pub fn new(
        inbound_rx: Receiver<LinkEvent>,
        store: Box<dyn KeyValueStore>,
        app_id: impl Into<String>,
        client_id: impl Into<String>,
        config: LoopConfig,
    ) -> Self {
        let app_id = app_id.into();
        Self {
            inbound_rx,
            pairing: PairingController::new(app_id.clone(), client_id),
            app_id,
            store,
            state: DashboardState::default(),
            devices: DeviceList::default(),
            recorder: SessionRecorder::new(config.sample_interval),
            render_loop: RenderLoop::new(config.frame_interval, config.width, config.height),
        }
    }

    /// Restores a persisted pairing. Call once before the first tick.
    pub fn start(&mut self, link: &mut dyn Transport) -> bool {
        let restored = self
            .pairing
            .restore(&mut self.state, self.store.as_mut(), link);
        self.devices.select(self.pairing.paired_id());
        restored
    }

    pub fn tick(
        &mut self,
        link: &mut dyn Transport,
        surface: &mut dyn Surface,
        now: Instant,
        wall: DateTime<Utc>,
    ) -> TickReport {
        let mut report = TickReport::default();

        loop {
            match self.inbound_rx.try_recv() {
                Ok(event) => {
                    report.events += 1;
                    match event {
                        LinkEvent::Connected => {
                            report.connected = true;
                            self.on_connected(link);
                        }
                        LinkEvent::ConnectionLost { reason } => {
                            warn!(%reason, "transport connection lost");
                        }
                        LinkEvent::Message { topic, payload } => {
                            let mut router = TelemetryRouter {
                                app_id: &self.app_id,
                                state: &mut self.state,
                                devices: &mut self.devices,
                                paired: self.pairing.paired_id(),
                            };
                            let routed = router.handle(&topic, &payload);
                            debug!(%topic, ?routed, "inbound message");
                            report.routed.push(routed);
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        report.sampled = self.recorder.poll(now, wall, &self.state);

        if self.render_loop.frame_due(now) {
            report.frame = Some(self.render_loop.render_frame(surface, &self.state));
        }

        report
    }

    pub fn apply_ui(&mut self, event: UiEvent, link: &mut dyn Transport) {
        match event {
            UiEvent::SelectTrainer(id) => {
                self.pairing
                    .select(&id, &self.state, self.store.as_mut(), link);
                self.devices.select(self.pairing.paired_id());
            }
            // Threshold controls are inert until a trainer is paired.
            UiEvent::ThresholdText(_) | UiEvent::ThresholdSlider(_)
                if !self.pairing.threshold_editable() =>
            {
                debug!("threshold input ignored while unpaired");
            }
            UiEvent::ThresholdText(raw) => {
                self.pairing
                    .update_threshold(&raw, &mut self.state, self.store.as_mut(), link);
            }
            UiEvent::ThresholdSlider(value) => {
                self.pairing
                    .set_threshold(value, &mut self.state, self.store.as_mut(), link);
            }
            UiEvent::Resize { width, height } => self.render_loop.resize(width, height),
        }
    }

    fn on_connected(&mut self, link: &mut dyn Transport) {
        let filter = subscription(&self.app_id);
        match link.subscribe(&filter) {
            Ok(()) => info!(%filter, "subscribed"),
            Err(e) => warn!(%filter, error = %e, "subscribe failed"),
        }
        if let Err(e) = transport::send(link, &self.app_id, &OutboundMessage::ListDevices) {
            warn!(error = %e, "device list request not sent");
        }
        self.pairing.announce(link);
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    pub fn pairing(&self) -> &PairingController {
        &self.pairing
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }
}
