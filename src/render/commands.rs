use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Straight (non-premultiplied) colour, alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parses `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Source-over composite onto an opaque background.
    pub fn over(self, background: [u8; 3]) -> [u8; 3] {
        let blend = |src: u8, dst: u8| (src as f64 * self.a + dst as f64 * (1.0 - self.a)).round() as u8;
        [
            blend(self.r, background[0]),
            blend(self.g, background[1]),
            blend(self.b, background[2]),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

/// Vertical linear gradient from `y0` to `y1` with stops ordered by offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    pub y0: f64,
    pub y1: f64,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn vertical(y0: f64, y1: f64) -> Self {
        Self {
            y0,
            y1,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f64, color: Rgba) -> Self {
        self.stops.push(GradientStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
        self.stops
            .sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self
    }

    pub fn color_at(&self, y: f64) -> Rgba {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Rgba::rgb(0, 0, 0).with_alpha(0.0),
        };

        let span = self.y1 - self.y0;
        let t = if span.abs() < f64::EPSILON {
            0.0
        } else {
            ((y - self.y0) / span).clamp(0.0, 1.0)
        };

        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.offset && t <= b.offset {
                let width = b.offset - a.offset;
                let local = if width > 0.0 { (t - a.offset) / width } else { 0.0 };
                return a.color.lerp(b.color, local);
            }
        }
        last.color
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: u32,
        height: u32,
    },
    StrokePath {
        points: Vec<Point>,
        color: Rgba,
        line_width: f64,
    },
    /// Closed polygon filled with a vertical gradient.
    FillPath {
        points: Vec<Point>,
        gradient: LinearGradient,
    },
}

/// Ordered drawing commands for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Total path vertices across every stroke and fill.
    pub fn vertex_count(&self) -> usize {
        self.commands
            .iter()
            .map(|command| match command {
                DrawCommand::Clear { .. } => 0,
                DrawCommand::StrokePath { points, .. } | DrawCommand::FillPath { points, .. } => {
                    points.len()
                }
            })
            .sum()
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.commands.iter().all(|command| match command {
            DrawCommand::Clear { .. } => true,
            DrawCommand::StrokePath { points, .. } | DrawCommand::FillPath { points, .. } => {
                points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            }
        })
    }
}
