use crate::dial::DialLayout;
use crate::gauge::{render_dial, DialOutcome};
use crate::state::DashboardState;
use crate::surface::Surface;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub power: DialOutcome,
    pub cadence: DialOutcome,
}

/// Frame pacing plus surface size. A resize takes effect at the start of the
/// next frame.
#[derive(Debug)]
pub struct RenderLoop {
    frame_interval: Duration,
    next_frame: Option<Instant>,
    width: f64,
    height: f64,
    pending_size: Option<(f64, f64)>,
    frames: u64,
}

impl RenderLoop {
    pub fn new(frame_interval: Duration, width: f64, height: f64) -> Self {
        Self {
            frame_interval,
            next_frame: None,
            width,
            height,
            pending_size: None,
            frames: 0,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.pending_size = Some((width, height));
        }
    }

    /// True (and the next frame scheduled) when a frame should be drawn at `now`.
    pub fn frame_due(&mut self, now: Instant) -> bool {
        match self.next_frame {
            Some(at) if now < at => false,
            _ => {
                self.next_frame = Some(now + self.frame_interval);
                true
            }
        }
    }

    pub fn render_frame(&mut self, surface: &mut dyn Surface, state: &DashboardState) -> FrameOutcome {
        if let Some((w, h)) = self.pending_size.take() {
            debug!(width = w, height = h, "surface resized");
            self.width = w;
            self.height = h;
        }
        surface.clear(self.width, self.height);
        let layout = DialLayout::for_surface(self.width, self.height);

        let (kind, reading) = state.power_dial();
        let power = render_dial(surface, layout.top, layout.radius, kind, &reading);
        let (kind, reading) = state.cadence_dial();
        let cadence = render_dial(surface, layout.bottom, layout.radius, kind, &reading);

        self.frames += 1;
        FrameOutcome { power, cadence }
    }
}
