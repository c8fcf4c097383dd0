//! Value-to-angle mapping for the 300 degree gauge arc.
//!
//! Two conventions meet here. `angle_for_percent` yields a screen angle
//! (y axis down, clockwise positive) as used for sector fills, while
//! `angle_for_value` yields a y-up angle consumed by `point_on_dial`.
//! For the power dial `angle_for_value(p, 200.0) == -angle_for_percent(p)`,
//! so wedges and needles line up on screen.

/// Percent of threshold at the end of the power dial's zone arc.
pub const POWER_ARC_MAX_PERCENT: f64 = 150.0;

/// Scale handed to `angle_for_value` when placing power needles by percent.
pub const POWER_NEEDLE_SCALE: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub fn angle_for_percent(percent: f64) -> f64 {
    (-240.0 + percent * 1.5).to_radians()
}

pub fn angle_for_value(value: f64, max_value: f64) -> f64 {
    let ratio = if max_value > 0.0 { value / max_value } else { 0.0 };
    (240.0 - ratio * 300.0).to_radians()
}

pub fn point_on_dial(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y - radius * angle.sin())
}

/// Placement of both dials on a surface of the given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialLayout {
    pub radius: f64,
    pub top: Point,
    pub bottom: Point,
}

impl DialLayout {
    pub fn for_surface(width: f64, height: f64) -> Self {
        Self {
            radius: width.min(height / 2.0) * 0.4,
            top: Point::new(width / 2.0, height / 4.0),
            bottom: Point::new(width / 2.0, height * 3.0 / 4.0),
        }
    }
}
