use rider_dashboard::dial::{self, DialLayout, Point};
use rider_dashboard::gauge::{self, render_dial, DialKind, DialReading};
use rider_dashboard::surface::{Paint, Surface};
use rider_dashboard::zones::{
    classify_cadence_zone, classify_power_zone, CadenceZone, PowerZone, Rgba, ZoneColor,
    BRIGHT_GREEN, WHITE,
};

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Clear,
    Sector { start: f64, end: f64, color: Rgba },
    Circle { center: Point, radius: f64, paint: Paint },
    Ring { radius: f64, width: f64 },
    Polygon { points: Vec<Point>, color: Rgba },
    Line { to: Point, width: f64, color: Rgba },
    Text { text: String, at: Point, size: f64, color: Rgba },
}

#[derive(Default)]
struct RecordingSurface {
    ops: Vec<Op>,
}

impl Surface for RecordingSurface {
    fn clear(&mut self, _width: f64, _height: f64) {
        self.ops.push(Op::Clear);
    }
    fn fill_sector(&mut self, _center: Point, _radius: f64, start: f64, end: f64, color: Rgba) {
        self.ops.push(Op::Sector { start, end, color });
    }
    fn fill_circle(&mut self, center: Point, radius: f64, paint: Paint) {
        self.ops.push(Op::Circle { center, radius, paint });
    }
    fn stroke_circle(&mut self, _center: Point, radius: f64, line_width: f64, _paint: Paint) {
        self.ops.push(Op::Ring { radius, width: line_width });
    }
    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        self.ops.push(Op::Polygon { points: points.to_vec(), color });
    }
    fn stroke_line(&mut self, _from: Point, to: Point, line_width: f64, color: Rgba) {
        self.ops.push(Op::Line { to, width: line_width, color });
    }
    fn fill_text(&mut self, text: &str, at: Point, font_size: f64, color: Rgba) {
        self.ops.push(Op::Text { text: text.to_string(), at, size: font_size, color });
    }
}

const CENTER: Point = Point::new(400.0, 300.0);
const RADIUS: f64 = 240.0;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn power(measured: f64, target: f64, threshold: f64) -> (RecordingSurface, bool) {
    let mut surface = RecordingSurface::default();
    let outcome = render_dial(
        &mut surface,
        CENTER,
        RADIUS,
        DialKind::Power { threshold },
        &DialReading { measured, target, max_value: 200.0 },
    );
    (surface, outcome.on_target)
}

fn cadence(measured: f64, target: f64) -> (RecordingSurface, bool) {
    let mut surface = RecordingSurface::default();
    let outcome = render_dial(
        &mut surface,
        CENTER,
        RADIUS,
        DialKind::Cadence,
        &DialReading { measured, target, max_value: 160.0 },
    );
    (surface, outcome.on_target)
}

fn texts(surface: &RecordingSurface) -> Vec<(&str, Rgba)> {
    surface
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Text { text, color, .. } => Some((text.as_str(), *color)),
            _ => None,
        })
        .collect()
}

#[test]
fn power_zone_boundaries() {
    assert_eq!(classify_power_zone(-5.0), PowerZone::Recovery);
    assert_eq!(classify_power_zone(59.9), PowerZone::Recovery);
    assert_eq!(classify_power_zone(60.0), PowerZone::Endurance);
    assert_eq!(classify_power_zone(75.0), PowerZone::Endurance);
    assert_eq!(classify_power_zone(75.5), PowerZone::Tempo);
    assert_eq!(classify_power_zone(89.0), PowerZone::Tempo);
    assert_eq!(classify_power_zone(104.0), PowerZone::Threshold);
    assert_eq!(classify_power_zone(118.0), PowerZone::Vo2Max);
    assert_eq!(classify_power_zone(119.0), PowerZone::Anaerobic);
    assert_eq!(classify_power_zone(400.0).color(), ZoneColor::Red);
}

#[test]
fn cadence_zone_boundaries() {
    assert_eq!(classify_cadence_zone(0.0), CadenceZone::Grinding);
    assert_eq!(classify_cadence_zone(60.0), CadenceZone::Heavy);
    assert_eq!(classify_cadence_zone(79.9), CadenceZone::Moderate);
    assert_eq!(classify_cadence_zone(90.0), CadenceZone::Brisk);
    assert_eq!(classify_cadence_zone(110.0), CadenceZone::Spinning);
    assert_eq!(classify_cadence_zone(85.0).color(), ZoneColor::Yellow);
}

#[test]
fn muted_colors_keep_hue() {
    for c in ZoneColor::ALL {
        let (base, muted) = (c.base(), c.muted());
        assert_eq!((base.r, base.g, base.b), (muted.r, muted.g, muted.b));
        assert_eq!(muted.a, 0.3);
    }
    assert_eq!(ZoneColor::Orange.base().to_string(), "rgb(255,165,0)");
    assert_eq!(ZoneColor::Grey.muted().to_string(), "rgba(128,128,128,0.3)");
}

#[test]
fn value_angles_span_the_arc() {
    assert!(approx(dial::angle_for_value(0.0, 160.0), 240f64.to_radians()));
    assert!(approx(dial::angle_for_value(160.0, 160.0), (-60f64).to_radians()));
    assert!(approx(dial::angle_for_value(80.0, 160.0), 90f64.to_radians()));
    // Non-positive maximum pins the needle at the start of the arc.
    assert!(approx(dial::angle_for_value(50.0, 0.0), 240f64.to_radians()));
}

#[test]
fn wedge_and_needle_conventions_agree() {
    for p in [0.0, 37.5, 60.0, 118.0, 150.0, 200.0] {
        assert!(approx(
            dial::angle_for_value(p, dial::POWER_NEEDLE_SCALE),
            -dial::angle_for_percent(p)
        ));
    }
}

#[test]
fn point_on_dial_is_y_up() {
    let c = Point::new(100.0, 100.0);
    let east = dial::point_on_dial(c, 10.0, 0.0);
    let north = dial::point_on_dial(c, 10.0, std::f64::consts::FRAC_PI_2);
    assert!(approx(east.x, 110.0) && approx(east.y, 100.0));
    assert!(approx(north.x, 100.0) && approx(north.y, 90.0));
    assert_eq!(dial::point_on_dial(c, 10.0, 1.234), dial::point_on_dial(c, 10.0, 1.234));
}

#[test]
fn layout_splits_surface_vertically() {
    let layout = DialLayout::for_surface(800.0, 1200.0);
    assert_eq!(layout.radius, 240.0);
    assert_eq!(layout.top, Point::new(400.0, 300.0));
    assert_eq!(layout.bottom, Point::new(400.0, 900.0));

    let wide = DialLayout::for_surface(2000.0, 600.0);
    assert_eq!(wide.radius, 120.0);
}

#[test]
fn power_dial_draw_order() {
    let (surface, _) = power(120.0, 150.0, 100.0);
    let ops = &surface.ops;

    assert_eq!(ops.len(), 6 + 1 + 1 + 1 + 2 + 1);
    assert!(ops[..6].iter().all(|op| matches!(op, Op::Sector { .. })));
    assert!(matches!(ops[6], Op::Ring { width, radius } if width == 8.0 && radius == RADIUS));
    assert!(matches!(ops[7], Op::Polygon { .. }));
    assert!(matches!(ops[8], Op::Line { width, .. } if width == 2.0));
    assert!(matches!(ops[9], Op::Text { .. }));
    assert!(matches!(ops[10], Op::Text { .. }));
    assert!(matches!(ops[11], Op::Circle { radius, .. } if approx(radius, 0.1 * RADIUS)));
}

#[test]
fn power_wedges_follow_zone_table() {
    let (surface, _) = power(120.0, 150.0, 100.0);
    let expected = [
        (0.0, 60.0, ZoneColor::Grey),
        (60.0, 75.0, ZoneColor::Blue),
        (75.0, 89.0, ZoneColor::Green),
        (89.0, 104.0, ZoneColor::Yellow),
        (104.0, 118.0, ZoneColor::Orange),
        (118.0, 150.0, ZoneColor::Red),
    ];
    for (op, (from, to, color)) in surface.ops.iter().zip(expected) {
        let Op::Sector { start, end, color: c } = op else {
            panic!("expected sector, got {op:?}");
        };
        assert!(approx(*start, dial::angle_for_percent(from)));
        assert!(approx(*end, dial::angle_for_percent(to)));
        assert_eq!(*c, color.muted());
    }
}

#[test]
fn on_target_power_lights_needle_and_led() {
    let (surface, on_target) = power(150.0, 150.0, 100.0);
    assert!(on_target);

    let line = surface.ops.iter().find_map(|op| match op {
        Op::Line { to, color, .. } => Some((*to, *color)),
        _ => None,
    });
    let (to, color) = line.expect("target needle");
    assert_eq!(color, BRIGHT_GREEN);
    assert!(approx(distance(CENTER, to), 0.8 * RADIUS));

    let last = surface.ops.last().expect("ops");
    assert!(matches!(last, Op::Circle { radius, .. } if approx(*radius, 0.05 * RADIUS)));
}

#[test]
fn off_target_power_stays_white() {
    // 120 W against 150 W is 20 % away.
    let (surface, on_target) = power(120.0, 150.0, 100.0);
    assert!(!on_target);
    assert!(surface
        .ops
        .iter()
        .any(|op| matches!(op, Op::Line { color, .. } if *color == WHITE)));
}

#[test]
fn tolerance_is_five_percent_of_target_watts() {
    // Threshold 200 and target 100 % gives 200 W.
    assert!(gauge::is_on_target(
        DialKind::Power { threshold: 200.0 },
        &DialReading { measured: 191.0, target: 100.0, max_value: 200.0 },
    ));
    assert!(!gauge::is_on_target(
        DialKind::Power { threshold: 200.0 },
        &DialReading { measured: 189.0, target: 100.0, max_value: 200.0 },
    ));
    assert!(!gauge::is_on_target(
        DialKind::Power { threshold: 200.0 },
        &DialReading { measured: 0.0, target: 0.0, max_value: 200.0 },
    ));
}

#[test]
fn measured_needle_uses_muted_zone_color() {
    let (surface, _) = power(130.0, 150.0, 100.0);
    let polygon = surface.ops.iter().find_map(|op| match op {
        Op::Polygon { points, color } => Some((points.clone(), *color)),
        _ => None,
    });
    let (points, color) = polygon.expect("needle");
    assert_eq!(color, ZoneColor::Red.muted());
    assert_eq!(points.len(), 3);
    assert!(approx(distance(CENTER, points[1]), 0.95 * RADIUS));
}

#[test]
fn needle_and_label_agree_on_rounded_zone() {
    // 377 / 500 is 75.4%, displayed as 75% and classified as endurance.
    let (surface, _) = power(377.0, 150.0, 500.0);
    let (tip, color) = surface
        .ops
        .iter()
        .find_map(|op| match op {
            Op::Polygon { points, color } => Some((points[1], *color)),
            _ => None,
        })
        .expect("needle");
    assert_eq!(color, ZoneColor::Blue.muted());
    assert_eq!(texts(&surface)[0], ("377 W (75%)", ZoneColor::Blue.base()));

    // The needle itself still points at the unrounded value.
    let percent = gauge::percent_of_threshold(377.0, 500.0);
    let expected = dial::point_on_dial(CENTER, 0.95 * RADIUS, dial::angle_for_value(percent, 200.0));
    assert!(approx(tip.x, expected.x) && approx(tip.y, expected.y));
    assert!(!approx(percent, 75.0));
}

#[test]
fn power_labels_show_watts_and_percent() {
    let (surface, _) = power(120.0, 150.0, 200.0);
    let labels = texts(&surface);
    assert_eq!(labels[0], ("120 W (60%)", ZoneColor::Blue.base()));
    assert_eq!(labels[1], ("300 W (150%)", ZoneColor::Red.base()));

    let Op::Text { at, size, .. } = &surface.ops[9] else {
        panic!("expected label");
    };
    assert_eq!(*size, 36.0);
    assert!(approx(at.y, CENTER.y + 0.45 * RADIUS));
}

#[test]
fn fractional_values_keep_their_decimals() {
    let (surface, _) = power(150.5, 150.0, 100.0);
    assert_eq!(texts(&surface)[0].0, "150.5 W (151%)");
}

#[test]
fn zero_threshold_does_not_divide() {
    let (surface, on_target) = power(120.0, 150.0, 0.0);
    assert!(!on_target);
    let labels = texts(&surface);
    assert_eq!(labels[0].0, "120 W (0%)");
    assert_eq!(labels[1].0, "0 W (150%)");
}

#[test]
fn cadence_dial_draws_face_and_ticks() {
    let (surface, _) = cadence(90.0, 100.0);
    let ops = &surface.ops;

    assert!(matches!(ops[0], Op::Circle { radius, .. } if radius == RADIUS));
    assert!(matches!(ops[1], Op::Ring { .. }));
    let ticks: Vec<&Op> = ops[2..13].iter().collect();
    assert!(ticks
        .iter()
        .all(|op| matches!(op, Op::Circle { radius, .. } if *radius == 2.0)));
    for op in ticks {
        if let Op::Circle { center, .. } = op {
            assert!(approx(distance(CENTER, *center), 0.9 * RADIUS));
        }
    }
    assert!(matches!(ops[13], Op::Polygon { color, .. } if color == ZoneColor::Orange.muted()));

    let labels = texts(&surface);
    assert_eq!(labels, vec![("90/100", WHITE), ("RPM", WHITE)]);
}

#[test]
fn cadence_target_zero_never_lights() {
    let (_, on_target) = cadence(0.0, 0.0);
    assert!(!on_target);
    let (_, on_target) = cadence(97.0, 100.0);
    assert!(on_target);
}

#[test]
fn rendering_is_deterministic() {
    let (a, _) = power(133.0, 95.0, 250.0);
    let (b, _) = power(133.0, 95.0, 250.0);
    assert_eq!(a.ops, b.ops);
    assert!(!a.ops.contains(&Op::Clear));
}
