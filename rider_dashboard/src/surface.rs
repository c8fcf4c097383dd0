use crate::dial::Point;
use crate::zones::Rgba;
use std::f64::consts::{PI, TAU};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

impl GradientStop {
    pub const fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Radial gradient between two concentric circles; stop offsets run from
/// `inner_radius` (0.0) to `outer_radius` (1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub stops: &'static [GradientStop],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Radial(RadialGradient),
}

/// Drawing primitives needed by the gauge renderer. Draws are applied in call
/// order, later ones occluding earlier ones.
///
/// Sector angles are screen angles (y down, clockwise); every other primitive
/// takes plain screen coordinates.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn fill_sector(&mut self, center: Point, radius: f64, start: f64, end: f64, color: Rgba);
    fn fill_circle(&mut self, center: Point, radius: f64, paint: Paint);
    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, paint: Paint);
    fn fill_polygon(&mut self, points: &[Point], color: Rgba);
    fn stroke_line(&mut self, from: Point, to: Point, line_width: f64, color: Rgba);
    fn fill_text(&mut self, text: &str, at: Point, font_size: f64, color: Rgba);
}

/// Renders frames as standalone SVG documents.
#[derive(Debug, Default)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    next_gradient: usize,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// The current frame as a complete SVG document.
    pub fn document(&self) -> String {
        let mut out = String::with_capacity(self.defs.len() + self.body.len() + 256);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(self.width),
            h = num(self.height),
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            out.push_str(&self.defs);
            out.push_str("</defs>\n");
        }
        let _ = writeln!(
            out,
            r#"<rect width="{}" height="{}" fill="rgb(0,0,0)"/>"#,
            num(self.width),
            num(self.height)
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }

    fn paint_ref(&mut self, paint: Paint) -> String {
        match paint {
            Paint::Solid(color) => color.to_string(),
            Paint::Radial(gradient) => {
                let id = format!("g{}", self.next_gradient);
                self.next_gradient += 1;
                let r1 = gradient.outer_radius;
                let inner = if r1 > 0.0 { (gradient.inner_radius / r1).clamp(0.0, 1.0) } else { 0.0 };
                let _ = writeln!(
                    self.defs,
                    r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}">"#,
                    num(gradient.center.x),
                    num(gradient.center.y),
                    num(r1),
                );
                for stop in gradient.stops {
                    let offset = inner + (1.0 - inner) * stop.offset;
                    let _ = writeln!(
                        self.defs,
                        r#"<stop offset="{}" stop-color="{}"/>"#,
                        num(offset),
                        stop.color
                    );
                }
                self.defs.push_str("</radialGradient>\n");
                format!("url(#{id})")
            }
        }
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.defs.clear();
        self.body.clear();
        self.next_gradient = 0;
    }

    fn fill_sector(&mut self, center: Point, radius: f64, start: f64, end: f64, color: Rgba) {
        let mut start = start;
        if start > end {
            start -= TAU;
        }
        let from = Point::new(center.x + radius * start.cos(), center.y + radius * start.sin());
        let to = Point::new(center.x + radius * end.cos(), center.y + radius * end.sin());
        let large_arc = u8::from(end - start > PI);
        let _ = writeln!(
            self.body,
            r#"<path d="M {} {} L {} {} A {r} {r} 0 {large_arc} 1 {} {} Z" fill="{color}"/>"#,
            num(center.x),
            num(center.y),
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
            r = num(radius),
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, paint: Paint) {
        let fill = self.paint_ref(paint);
        let _ = writeln!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{fill}"/>"#,
            num(center.x),
            num(center.y),
            num(radius),
        );
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, paint: Paint) {
        let stroke = self.paint_ref(paint);
        let _ = writeln!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="none" stroke="{stroke}" stroke-width="{}"/>"#,
            num(center.x),
            num(center.y),
            num(radius),
            num(line_width),
        );
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{},{}", num(p.x), num(p.y)))
            .collect();
        let _ = writeln!(
            self.body,
            r#"<polygon points="{}" fill="{color}"/>"#,
            coords.join(" ")
        );
    }

    fn stroke_line(&mut self, from: Point, to: Point, line_width: f64, color: Rgba) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="{}"/>"#,
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
            num(line_width),
        );
    }

    fn fill_text(&mut self, text: &str, at: Point, font_size: f64, color: Rgba) {
        let _ = writeln!(
            self.body,
            r#"<text x="{}" y="{}" font-family="Arial" font-size="{}" text-anchor="middle" dominant-baseline="middle" fill="{color}">{}</text>"#,
            num(at.x),
            num(at.y),
            num(font_size),
            escape_xml(text),
        );
    }
}

fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
