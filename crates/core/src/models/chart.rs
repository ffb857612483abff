use serde::{Deserialize, Serialize};

/// A point in backing-buffer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A series value mapped onto the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub at: Point,
    pub value: f64,
}

/// Size of the backing pixel buffer (physical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Layout (CSS) size of the surface in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSize {
    pub width: f64,
    pub height: f64,
}

/// Container size plus display scaling, as reported by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Container width in CSS pixels
    pub width: f64,

    /// Container height in CSS pixels
    pub height: f64,

    /// Device pixel ratio (physical pixels per CSS pixel)
    pub pixel_scale: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_scale: f64) -> Self {
        Self {
            width,
            height,
            pixel_scale,
        }
    }

    /// Effective pixel scale: never below 1, and 1 when unknown.
    pub fn scale(&self) -> f64 {
        if self.pixel_scale.is_finite() && self.pixel_scale > 1.0 {
            self.pixel_scale
        } else {
            1.0
        }
    }

    /// Layout size stays equal to the container's CSS size.
    pub fn layout_size(&self) -> LayoutSize {
        LayoutSize {
            width: clamp_dimension(self.width),
            height: clamp_dimension(self.height),
        }
    }

    /// Backing buffer size: `round(css × scale)` on each axis.
    pub fn backing_size(&self) -> PixelSize {
        let layout = self.layout_size();
        let scale = self.scale();
        PixelSize {
            width: (layout.width * scale).round() as u32,
            height: (layout.height * scale).round() as u32,
        }
    }

    /// True when there is nothing to draw onto.
    pub fn is_empty(&self) -> bool {
        let backing = self.backing_size();
        backing.width == 0 || backing.height == 0
    }
}

fn clamp_dimension(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// RGBA colour; alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS notation, e.g. `rgba(47,213,159,1)`.
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub cap: LineCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color,
    pub size_px: f64,
    pub align: TextAlign,
}

/// One segment of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic Bézier through `control` ending at `to`
    QuadTo { control: Point, to: Point },
}

/// An open path made of segments, in backing-pixel coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, control: Point, to: Point) -> &mut Self {
        self.segments.push(PathSegment::QuadTo { control, to });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    StrokePath { path: Path, stroke: Stroke },
    FillText { text: String, at: Point, style: TextStyle },
}

/// Chart appearance settings. Pixel values are CSS pixels unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Number of equal vertical divisions (grid lines drawn = grid_lines + 1)
    pub grid_lines: u32,

    /// Lower bound of the plot padding, in backing pixels
    pub min_padding: f64,

    /// Plot padding as a fraction of the backing width
    pub padding_ratio: f64,

    pub line_color: Color,
    pub grid_color: Color,
    pub label_color: Color,

    /// Label the first and last value of the series
    pub show_labels: bool,

    pub label_font_px: f64,

    /// Distance of the labels from the right edge
    pub label_inset_px: f64,

    /// Distance of a label's baseline above its point
    pub label_lift_px: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            grid_lines: 6,
            min_padding: 22.0,
            padding_ratio: 0.03,
            line_color: Color::rgba(47, 213, 159, 1.0),
            grid_color: Color::rgba(255, 255, 255, 0.03),
            label_color: Color::rgba(255, 255, 255, 0.08),
            show_labels: true,
            label_font_px: 12.0,
            label_inset_px: 12.0,
            label_lift_px: 6.0,
        }
    }
}
