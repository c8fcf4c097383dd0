use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
pub const BRIGHT_GREEN: Rgba = Rgba::rgb(0, 255, 0);
pub const CADENCE_FACE: Rgba = Rgba::rgb(0, 0, 150);

pub const MUTED_ALPHA: f32 = 0.3;

/// The six-entry display palette shared by both dials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneColor {
    Grey,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
}

impl ZoneColor {
    pub const ALL: [ZoneColor; 6] = [
        ZoneColor::Grey,
        ZoneColor::Blue,
        ZoneColor::Green,
        ZoneColor::Yellow,
        ZoneColor::Orange,
        ZoneColor::Red,
    ];

    pub const fn base(self) -> Rgba {
        match self {
            ZoneColor::Grey => Rgba::rgb(128, 128, 128),
            ZoneColor::Blue => Rgba::rgb(0, 0, 255),
            ZoneColor::Green => Rgba::rgb(0, 128, 0),
            ZoneColor::Yellow => Rgba::rgb(255, 255, 0),
            ZoneColor::Orange => Rgba::rgb(255, 165, 0),
            ZoneColor::Red => Rgba::rgb(255, 0, 0),
        }
    }

    pub const fn muted(self) -> Rgba {
        self.base().with_alpha(MUTED_ALPHA)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerZone {
    Recovery,
    Endurance,
    Tempo,
    Threshold,
    Vo2Max,
    Anaerobic,
}

impl PowerZone {
    pub const fn color(self) -> ZoneColor {
        match self {
            PowerZone::Recovery => ZoneColor::Grey,
            PowerZone::Endurance => ZoneColor::Blue,
            PowerZone::Tempo => ZoneColor::Green,
            PowerZone::Threshold => ZoneColor::Yellow,
            PowerZone::Vo2Max => ZoneColor::Orange,
            PowerZone::Anaerobic => ZoneColor::Red,
        }
    }
}

/// Upper bounds are inclusive: 75 is endurance, 118 is vo2max.
pub fn classify_power_zone(percent_of_threshold: f64) -> PowerZone {
    let p = percent_of_threshold;
    if p < 60.0 {
        PowerZone::Recovery
    } else if p <= 75.0 {
        PowerZone::Endurance
    } else if p <= 89.0 {
        PowerZone::Tempo
    } else if p <= 104.0 {
        PowerZone::Threshold
    } else if p <= 118.0 {
        PowerZone::Vo2Max
    } else {
        PowerZone::Anaerobic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CadenceZone {
    Grinding,
    Heavy,
    Moderate,
    Steady,
    Brisk,
    Spinning,
}

impl CadenceZone {
    pub const fn color(self) -> ZoneColor {
        match self {
            CadenceZone::Grinding => ZoneColor::Grey,
            CadenceZone::Heavy => ZoneColor::Blue,
            CadenceZone::Moderate => ZoneColor::Green,
            CadenceZone::Steady => ZoneColor::Yellow,
            CadenceZone::Brisk => ZoneColor::Orange,
            CadenceZone::Spinning => ZoneColor::Red,
        }
    }
}

/// Bands break at 60/70/80/90/110 rpm, lower bound inclusive.
pub fn classify_cadence_zone(rpm: f64) -> CadenceZone {
    if rpm < 60.0 {
        CadenceZone::Grinding
    } else if rpm < 70.0 {
        CadenceZone::Heavy
    } else if rpm < 80.0 {
        CadenceZone::Moderate
    } else if rpm < 90.0 {
        CadenceZone::Steady
    } else if rpm < 110.0 {
        CadenceZone::Brisk
    } else {
        CadenceZone::Spinning
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub from_percent: f64,
    pub to_percent: f64,
    pub color: ZoneColor,
}

/// Power dial background, scaled to 150% of threshold.
pub const POWER_WEDGES: [Wedge; 6] = [
    Wedge { from_percent: 0.0, to_percent: 60.0, color: ZoneColor::Grey },
    Wedge { from_percent: 60.0, to_percent: 75.0, color: ZoneColor::Blue },
    Wedge { from_percent: 75.0, to_percent: 89.0, color: ZoneColor::Green },
    Wedge { from_percent: 89.0, to_percent: 104.0, color: ZoneColor::Yellow },
    Wedge { from_percent: 104.0, to_percent: 118.0, color: ZoneColor::Orange },
    Wedge { from_percent: 118.0, to_percent: 150.0, color: ZoneColor::Red },
];
