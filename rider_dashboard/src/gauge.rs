use crate::dial::{self, Point, POWER_NEEDLE_SCALE};
use crate::surface::{GradientStop, Paint, RadialGradient, Surface};
use crate::zones::{
    classify_cadence_zone, classify_power_zone, Rgba, BRIGHT_GREEN, CADENCE_FACE, POWER_WEDGES,
    WHITE,
};
use std::f64::consts::FRAC_PI_2;

/// Relative distance between measured and target that still counts as on target.
pub const TARGET_TOLERANCE: f64 = 0.05;

const RIM_WIDTH: f64 = 8.0;
const TICK_DOT_RADIUS: f64 = 2.0;
const TARGET_NEEDLE_WIDTH: f64 = 2.0;

static RIM_STOPS: [GradientStop; 3] = [
    GradientStop::new(0.0, Rgba::rgb(0xcc, 0xcc, 0xcc)),
    GradientStop::new(0.5, Rgba::rgb(0xff, 0xff, 0xff)),
    GradientStop::new(1.0, Rgba::rgb(0xaa, 0xaa, 0xaa)),
];

static HUB_STOPS: [GradientStop; 4] = [
    GradientStop::new(0.0, Rgba::rgb(0xff, 0xff, 0xff)),
    GradientStop::new(0.5, Rgba::rgb(0xdd, 0xdd, 0xdd)),
    GradientStop::new(0.8, Rgba::rgb(0x88, 0x88, 0x88)),
    GradientStop::new(1.0, Rgba::rgb(0x44, 0x44, 0x44)),
];

static LED_STOPS: [GradientStop; 2] = [
    GradientStop::new(0.0, BRIGHT_GREEN),
    GradientStop::new(1.0, BRIGHT_GREEN.with_alpha(0.0)),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialKind {
    /// Target is a percent of `threshold`; the face shows zone wedges.
    Power { threshold: f64 },
    /// Target is compared directly in rpm; the face is flat with ticks.
    Cadence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialReading {
    pub measured: f64,
    pub target: f64,
    pub max_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialOutcome {
    /// Target needle was drawn bright green (and the hub LED lit).
    pub on_target: bool,
}

pub fn percent_of_threshold(watts: f64, threshold: f64) -> f64 {
    if threshold > 0.0 {
        watts / threshold * 100.0
    } else {
        0.0
    }
}

pub fn target_watts(threshold: f64, target_percent: f64) -> f64 {
    (threshold * target_percent / 100.0).round()
}

pub fn within_tolerance(measured: f64, reference: f64) -> bool {
    reference > 0.0 && (measured - reference).abs() / reference <= TARGET_TOLERANCE
}

/// Whether the target needle should light up for this reading.
pub fn is_on_target(kind: DialKind, reading: &DialReading) -> bool {
    if reading.target == 0.0 {
        return false;
    }
    match kind {
        DialKind::Power { threshold } => {
            within_tolerance(reading.measured, target_watts(threshold, reading.target))
        }
        DialKind::Cadence => within_tolerance(reading.measured, reading.target),
    }
}

/// Draws one complete dial. Draw order is fixed: face, rim, ticks, measured
/// needle, target needle, labels, hub, LED.
pub fn render_dial(
    surface: &mut dyn Surface,
    center: Point,
    radius: f64,
    kind: DialKind,
    reading: &DialReading,
) -> DialOutcome {
    draw_face(surface, center, radius, kind);
    draw_rim(surface, center, radius);
    if matches!(kind, DialKind::Cadence) {
        draw_ticks(surface, center, radius, reading.max_value);
    }

    let (measured_angle, target_angle, zone) = match kind {
        DialKind::Power { threshold } => {
            let percent = percent_of_threshold(reading.measured, threshold);
            (
                dial::angle_for_value(percent, POWER_NEEDLE_SCALE),
                dial::angle_for_value(reading.target, POWER_NEEDLE_SCALE),
                // Zone follows the rounded percent shown in the label.
                classify_power_zone(percent.round()).color(),
            )
        }
        DialKind::Cadence => (
            dial::angle_for_value(reading.measured, reading.max_value),
            dial::angle_for_value(reading.target, reading.max_value),
            classify_cadence_zone(reading.measured).color(),
        ),
    };

    draw_wedge_needle(surface, center, radius, measured_angle, zone.muted());

    let on_target = is_on_target(kind, reading);
    let needle_color = if on_target { BRIGHT_GREEN } else { WHITE };
    surface.stroke_line(
        center,
        dial::point_on_dial(center, 0.8 * radius, target_angle),
        TARGET_NEEDLE_WIDTH,
        needle_color,
    );

    draw_labels(surface, center, radius, kind, reading);
    draw_hub(surface, center, radius, on_target);

    DialOutcome { on_target }
}

fn draw_face(surface: &mut dyn Surface, center: Point, radius: f64, kind: DialKind) {
    match kind {
        DialKind::Power { .. } => {
            for wedge in &POWER_WEDGES {
                surface.fill_sector(
                    center,
                    radius,
                    dial::angle_for_percent(wedge.from_percent),
                    dial::angle_for_percent(wedge.to_percent),
                    wedge.color.muted(),
                );
            }
        }
        DialKind::Cadence => surface.fill_circle(center, radius, Paint::Solid(CADENCE_FACE)),
    }
}

fn draw_rim(surface: &mut dyn Surface, center: Point, radius: f64) {
    let gradient = RadialGradient {
        center,
        inner_radius: radius * 0.9,
        outer_radius: radius,
        stops: &RIM_STOPS,
    };
    surface.stroke_circle(center, radius, RIM_WIDTH, Paint::Radial(gradient));
}

fn draw_ticks(surface: &mut dyn Surface, center: Point, radius: f64, max_value: f64) {
    if max_value <= 0.0 {
        return;
    }
    let step = max_value / 10.0;
    for i in 0..=10 {
        let angle = dial::angle_for_value(step * f64::from(i), max_value);
        let at = dial::point_on_dial(center, radius * 0.9, angle);
        surface.fill_circle(at, TICK_DOT_RADIUS, Paint::Solid(WHITE));
    }
}

fn draw_wedge_needle(surface: &mut dyn Surface, center: Point, radius: f64, angle: f64, color: Rgba) {
    let tip = dial::point_on_dial(center, 0.95 * radius, angle);
    let base = dial::point_on_dial(center, -0.25 * radius, angle);
    let half_width = 0.05 * radius;
    let left = dial::point_on_dial(base, half_width, angle + FRAC_PI_2);
    let right = dial::point_on_dial(base, half_width, angle - FRAC_PI_2);
    surface.fill_polygon(&[left, tip, right], color);
}

fn draw_labels(
    surface: &mut dyn Surface,
    center: Point,
    radius: f64,
    kind: DialKind,
    reading: &DialReading,
) {
    let font_size = (radius * 0.15).floor();
    let upper = Point::new(center.x, center.y + radius * 0.45);
    let lower = Point::new(center.x, center.y + radius * 0.65);

    match kind {
        DialKind::Power { threshold } => {
            let measured_percent = percent_of_threshold(reading.measured, threshold).round();
            let measured_text = format!(
                "{} W ({}%)",
                format_number(reading.measured),
                format_number(measured_percent)
            );
            let target_text = format!(
                "{} W ({}%)",
                format_number(target_watts(threshold, reading.target)),
                format_number(reading.target)
            );
            surface.fill_text(&measured_text, upper, font_size, label_color(measured_percent));
            surface.fill_text(&target_text, lower, font_size, label_color(reading.target));
        }
        DialKind::Cadence => {
            let text = format!(
                "{}/{}",
                format_number(reading.measured),
                format_number(reading.target)
            );
            surface.fill_text(&text, upper, font_size, WHITE);
            surface.fill_text("RPM", lower, font_size, WHITE);
        }
    }
}

fn label_color(percent: f64) -> Rgba {
    classify_power_zone(percent).color().base()
}

fn draw_hub(surface: &mut dyn Surface, center: Point, radius: f64, lit: bool) {
    let hub_radius = 0.1 * radius;
    surface.fill_circle(
        center,
        hub_radius,
        Paint::Radial(RadialGradient {
            center,
            inner_radius: hub_radius * 0.1,
            outer_radius: hub_radius,
            stops: &HUB_STOPS,
        }),
    );

    if lit {
        let led_radius = hub_radius * 0.5;
        surface.fill_circle(
            center,
            led_radius,
            Paint::Radial(RadialGradient {
                center,
                inner_radius: led_radius * 0.1,
                outer_radius: led_radius,
                stops: &LED_STOPS,
            }),
        );
    }
}

/// Integral values print without a fractional part, everything else in its
/// shortest decimal form.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}
