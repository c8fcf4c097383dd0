use rider_dashboard::dial::Point;
use rider_dashboard::render_loop::RenderLoop;
use rider_dashboard::state::DashboardState;
use rider_dashboard::surface::{Surface, SvgSurface};
use rider_dashboard::zones::WHITE;
use std::time::{Duration, Instant};

fn render(width: f64, height: f64, state: &DashboardState) -> (SvgSurface, RenderLoop) {
    let mut surface = SvgSurface::new();
    let mut rl = RenderLoop::new(Duration::from_millis(100), width, height);
    rl.render_frame(&mut surface, state);
    (surface, rl)
}

#[test]
fn frame_is_a_complete_svg_document() {
    let (surface, _) = render(800.0, 1200.0, &DashboardState::default());
    let doc = surface.document();

    assert!(doc.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="1200""#));
    assert!(doc.trim_end().ends_with("</svg>"));
    assert!(doc.contains(r#"<rect width="800" height="1200" fill="rgb(0,0,0)"/>"#));
    // Two rims and two hubs.
    assert_eq!(doc.matches("<radialGradient").count(), 4);
    assert_eq!(doc.matches("<path ").count(), 6);
    assert_eq!(doc.matches("<line ").count(), 2);
    assert!(doc.contains(">120 W (120%)</text>"));
    assert!(doc.contains(">90/100</text>"));
    assert!(doc.contains(">RPM</text>"));
    assert!(doc.contains(r#"fill="rgb(0,0,150)""#));
}

#[test]
fn rim_gradient_starts_at_inner_radius() {
    let (surface, _) = render(800.0, 1200.0, &DashboardState::default());
    let doc = surface.document();
    assert!(doc.contains(r#"<stop offset="0.9" stop-color="rgb(204,204,204)"/>"#));
    assert!(doc.contains(r#"<stop offset="1" stop-color="rgb(170,170,170)"/>"#));
}

#[test]
fn on_target_frame_has_leds() {
    let mut state = DashboardState::default();
    state.set_current_power(150.0);
    state.set_current_cadence(100.0);
    let mut surface = SvgSurface::new();
    let mut rl = RenderLoop::new(Duration::from_millis(100), 800.0, 1200.0);

    let outcome = rl.render_frame(&mut surface, &state);

    assert!(outcome.power.on_target);
    assert!(outcome.cadence.on_target);
    assert_eq!(surface.document().matches("<radialGradient").count(), 6);
    assert_eq!(surface.document().matches(r#"stroke="rgb(0,255,0)""#).count(), 2);
}

#[test]
fn clear_starts_a_fresh_frame() {
    let (mut surface, mut rl) = render(800.0, 1200.0, &DashboardState::default());
    let first = surface.document();
    rl.render_frame(&mut surface, &DashboardState::default());
    assert_eq!(surface.document(), first);
    assert_eq!(rl.frames(), 2);
}

#[test]
fn text_is_escaped() {
    let mut surface = SvgSurface::new();
    surface.clear(10.0, 10.0);
    surface.fill_text("<A & B>", Point::new(1.0, 2.0), 12.0, WHITE);
    assert!(surface.document().contains(">&lt;A &amp; B&gt;</text>"));
}

#[test]
fn resize_applies_on_next_frame() {
    let state = DashboardState::default();
    let (mut surface, mut rl) = render(800.0, 1200.0, &state);

    rl.resize(400.0, 600.0);
    assert_eq!(rl.size(), (800.0, 1200.0));
    assert_eq!(surface.size(), (800.0, 1200.0));

    rl.render_frame(&mut surface, &state);
    assert_eq!(rl.size(), (400.0, 600.0));
    assert_eq!(surface.size(), (400.0, 600.0));

    // Degenerate sizes are ignored.
    rl.resize(0.0, 600.0);
    rl.resize(f64::NAN, 600.0);
    rl.render_frame(&mut surface, &state);
    assert_eq!(rl.size(), (400.0, 600.0));
}

#[test]
fn frames_are_paced() {
    let mut rl = RenderLoop::new(Duration::from_millis(100), 800.0, 1200.0);
    let t0 = Instant::now();
    assert!(rl.frame_due(t0));
    assert!(!rl.frame_due(t0 + Duration::from_millis(50)));
    assert!(rl.frame_due(t0 + Duration::from_millis(100)));
    assert!(!rl.frame_due(t0 + Duration::from_millis(150)));
}
