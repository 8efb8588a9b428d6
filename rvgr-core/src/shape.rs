//! Shape model
//!
//! Immutable geometry handed to [`generate`](crate::generate). Rectangles
//! are in whole pixels. Polygon vertices are fixed point with
//! [`SUBPIXEL_BITS`] fractional bits.

use heapless::Vec;
use rvgr_protocol::opcode::MAX_COLOR;

/// Fractional bits in polygon vertex coordinates
pub const SUBPIXEL_BITS: u32 = 4;

/// Sub-pixel units per pixel
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_BITS;

/// Maximum vertices per polygon
pub const MAX_POLYGON_VERTICES: usize = 64;

/// Errors from shape construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShapeError {
    /// Colour index above 15
    InvalidColor,
    /// Fewer than 3 distinct vertices
    TooFewVertices,
    /// More than [`MAX_POLYGON_VERTICES`] vertices
    TooManyVertices,
}

/// Polygon vertex in sub-pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Point from raw sub-pixel coordinates
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Point at the top-left corner of pixel (`x`, `y`)
    ///
    /// Pixels beyond the sub-pixel range saturate to its ends.
    pub const fn from_pixels(x: i32, y: i32) -> Self {
        Self {
            x: x.saturating_mul(SUBPIXEL_SCALE),
            y: y.saturating_mul(SUBPIXEL_SCALE),
        }
    }
}

fn check_color(color: u8) -> Result<u8, ShapeError> {
    if color > MAX_COLOR {
        return Err(ShapeError::InvalidColor);
    }
    Ok(color)
}

/// Axis-aligned filled rectangle covering `[x, x+w) × [y, y+h)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
    color: u8,
}

impl Rect {
    /// Create a rectangle
    ///
    /// Zero width or height is allowed and draws nothing.
    pub fn new(x: u16, y: u16, w: u16, h: u16, color: u8) -> Result<Self, ShapeError> {
        Ok(Self {
            x,
            y,
            w,
            h,
            color: check_color(color)?,
        })
    }

    pub fn x(&self) -> u16 {
        self.x
    }

    pub fn y(&self) -> u16 {
        self.y
    }

    pub fn width(&self) -> u16 {
        self.w
    }

    pub fn height(&self) -> u16 {
        self.h
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    /// Whether the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Closed polygon
///
/// The last vertex connects back to the first. Filled polygons use the
/// even-odd rule and include their boundary pixels; unfilled polygons
/// draw only their outline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Polygon {
    vertices: Vec<Point, MAX_POLYGON_VERTICES>,
    filled: bool,
    color: u8,
}

impl Polygon {
    /// Create a filled polygon
    pub fn new(vertices: &[Point], color: u8) -> Result<Self, ShapeError> {
        Self::with_fill(vertices, true, color)
    }

    /// Create an outline-only polygon
    pub fn outline(vertices: &[Point], color: u8) -> Result<Self, ShapeError> {
        Self::with_fill(vertices, false, color)
    }

    /// Create a polygon with an explicit fill flag
    pub fn with_fill(vertices: &[Point], filled: bool, color: u8) -> Result<Self, ShapeError> {
        let color = check_color(color)?;
        let vertices = Vec::from_slice(vertices).map_err(|_| ShapeError::TooManyVertices)?;
        if distinct_vertices(&vertices) < 3 {
            return Err(ShapeError::TooFewVertices);
        }
        Ok(Self {
            vertices,
            filled,
            color,
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn color(&self) -> u8 {
        self.color
    }
}

/// Count distinct vertices, stopping at 3
fn distinct_vertices(vertices: &[Point]) -> usize {
    let mut seen: Vec<Point, 3> = Vec::new();
    for v in vertices {
        if !seen.contains(v) && seen.push(*v).is_err() {
            break;
        }
    }
    seen.len()
}

/// Anything [`generate`](crate::generate) can draw
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
}

impl Shape {
    pub fn color(&self) -> u8 {
        match self {
            Shape::Rect(r) => r.color(),
            Shape::Polygon(p) => p.color(),
        }
    }
}

impl From<Rect> for Shape {
    fn from(rect: Rect) -> Self {
        Shape::Rect(rect)
    }
}

impl From<Polygon> for Shape {
    fn from(polygon: Polygon) -> Self {
        Shape::Polygon(polygon)
    }
}
